use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use pnet_packet::{ipv4::Ipv4Packet, Packet};
use socket2::{Domain, Protocol, Type};

use super::Socket;

const RECV_BUFFER_LEN: usize = 1024;

/// Privileged transport: a raw IPv4 socket restricted to the ICMP protocol.
/// Requires CAP_NET_RAW (or root) on most hosts.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl Socket for RawSocket {
    fn bind(laddr: Ipv4Addr, read_timeout: Duration) -> io::Result<Self> {
        tracing::trace!(%laddr, "creating raw icmpv4 socket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        socket.set_read_timeout(Some(read_timeout))?;
        socket.bind(&SocketAddrV4::new(laddr, 0).into())?;
        Ok(RawSocket { socket })
    }

    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        let mut recv_buf = [0u8; RECV_BUFFER_LEN];

        // Socket2 gives a safety guaranty which allows us to do an unsafe cast
        // from `&mut [u8]` to `&mut [std::mem::MaybeUninit<u8>]`:
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        let (n, socket_addr) = socket2::Socket::recv_from(&self.socket, unsafe {
            &mut *(std::ptr::addr_of_mut!(recv_buf) as *mut [u8]
                as *mut [std::mem::MaybeUninit<u8>])
        })?;

        // On a raw socket we get a whole IP packet; hand back only the ICMP
        // content.
        let ipv4_packet = Ipv4Packet::new(&recv_buf[..n])
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "short ipv4 packet"))?;
        let ip_payload = ipv4_packet.payload();
        if ip_payload.len() > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "receive buffer too small",
            ));
        }
        buf[..ip_payload.len()].copy_from_slice(ip_payload);

        let peer = socket_addr
            .as_socket_ipv4()
            .map(|a| IpAddr::V4(*a.ip()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "peer is not ipv4"))?;
        Ok((ip_payload.len(), peer))
    }
}
