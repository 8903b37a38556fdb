use std::net::IpAddr;
use std::time::Duration;

/// The result of one successful ping.
#[derive(Debug, Clone)]
pub struct Pong {
    /// Address of the host that replied.
    pub peer: IpAddr,
    /// Identifier echoed back by the peer.
    pub identifier: u16,
    /// Sequence number echoed back by the peer.
    pub sequence_number: u16,
    /// Content of the echo reply data field.
    pub data: Vec<u8>,
    /// Size of the received ICMP message in bytes.
    pub size: usize,
    /// Round-trip time, measured from just before the send.
    pub rtt: Duration,
}
