use std::{error::Error, fmt, io};

/// Everything that can go wrong while constructing a prober or running a
/// single ping. Nothing is retried internally, the error goes straight back
/// to the caller.
#[derive(Debug)]
pub enum PingError {
    /// A local or remote address string could not be resolved to IPv4.
    Resolve(String),
    /// The transport socket could not be created or bound.
    Open(io::Error),
    /// The echo request could not be serialized.
    Encode(String),
    /// Received bytes could not be parsed as an ICMP message.
    Decode(String),
    /// Writing the encoded request to the socket failed.
    Send(io::Error),
    /// A non-timeout read failure, e.g. the socket was closed underneath us.
    Receive(io::Error),
    /// No accepted echo reply arrived within the configured timeout.
    Timeout,
    /// `new_pinger` was given a network kind it does not know.
    UnknownNetwork(String),
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            PingError::Resolve(addr) => write!(f, "could not resolve address: {addr}"),
            PingError::Open(e) => write!(f, "could not open socket: {e}"),
            PingError::Encode(msg) => write!(f, "could not encode echo request: {msg}"),
            PingError::Decode(msg) => write!(f, "could not decode icmp message: {msg}"),
            PingError::Send(e) => write!(f, "could not send echo request: {e}"),
            PingError::Receive(e) => write!(f, "error receiving echo reply: {e}"),
            PingError::Timeout => write!(f, "timeout"),
            PingError::UnknownNetwork(network) => write!(f, "unknown network {network}"),
        }
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PingError::Open(e) | PingError::Send(e) | PingError::Receive(e) => Some(e),
            _ => None,
        }
    }
}

pub type PingResult<T> = std::result::Result<T, PingError>;
