use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, Type};

use super::Socket;

const RECV_BUFFER_LEN: usize = 1024;

/// Unprivileged transport: an ICMP datagram socket. The kernel builds the IP
/// header, delivers bare ICMP bytes on receive, and rewrites the echo
/// identifier on the wire (on Linux, to the socket's local "port"). Needs
/// `net.ipv4.ping_group_range` to cover the caller's group.
pub struct DgramSocket {
    socket: socket2::Socket,
}

impl Socket for DgramSocket {
    fn bind(laddr: Ipv4Addr, read_timeout: Duration) -> io::Result<Self> {
        tracing::trace!(%laddr, "creating dgram icmpv4 socket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))?;
        socket.set_read_timeout(Some(read_timeout))?;
        socket.bind(&SocketAddrV4::new(laddr, 0).into())?;
        Ok(DgramSocket { socket })
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

        // A dgram socket already strips the IP header.
        if n > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "receive buffer too small",
            ));
        }
        buf[..n].copy_from_slice(&recv_buf[..n]);

        let peer = socket_addr
            .as_socket_ipv4()
            .map(|a| IpAddr::V4(*a.ip()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "peer is not ipv4"))?;
        Ok((n, peer))
    }
}
