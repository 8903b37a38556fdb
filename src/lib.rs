#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)] // TODO

pub use ping_error::{PingError, PingResult};
pub use pong::Pong;
pub use prober::{new_pinger, Pinger, Prober};
pub use resolve::lookup_host_v4;

pub use icmp::v4::socket::dgram_socket::DgramSocket;
pub use icmp::v4::socket::raw_socket::RawSocket;
pub use icmp::v4::socket::Socket;

mod icmp;
mod ping_error;
mod pong;
mod prober;
mod resolve;
