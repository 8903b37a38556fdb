use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

pub(crate) mod dgram_socket;
pub(crate) mod raw_socket;

/// One echo transport. Implementations bind a fresh handle per `bind` call;
/// the prober opens one handle per ping and drops it before the call returns.
///
/// `read_timeout` bounds a single blocking `recv_from`, it is the poll
/// interval that lets the receive loop notice it has been halted.
pub trait Socket: Send + Sync + Sized + 'static {
    fn bind(laddr: Ipv4Addr, read_timeout: Duration) -> io::Result<Self>;
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
}
