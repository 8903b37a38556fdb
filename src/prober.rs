use std::io;
use std::marker::PhantomData;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::icmp::v4;
use crate::icmp::v4::{DgramSocket, RawSocket, Socket};
use crate::ping_error::{PingError, PingResult};
use crate::pong::Pong;
use crate::resolve;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
// How often a blocked receive loop wakes up to check whether it was halted.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAYLOAD_SIZE: usize = 56;
const RECV_BUFFER_LEN: usize = 1024;

/// One echo probe per call. Implemented by [`Prober`] over both transports;
/// [`new_pinger`] picks the transport by name.
pub trait Pinger {
    /// Sends one echo request to `raddr` and waits for the first accepted
    /// reply, or until the configured timeout.
    fn ping(&mut self, raddr: &str) -> PingResult<Pong>;
    /// Sets the sequence counter back to 0.
    fn reset_counter(&mut self);
    /// Replaces the timeout for subsequent `ping` calls. Must be positive.
    /// An in-flight call is not affected.
    fn set_timeout(&mut self, timeout: Duration);
}

/// Returns a pinger for the given network kind. `"raw-echo"` probes over a
/// raw ICMP socket (privileged), `"udp-echo"` over an ICMP datagram socket
/// (unprivileged). Anything else is an unknown network.
pub fn new_pinger(network: &str, laddr: &str) -> PingResult<Box<dyn Pinger>> {
    match network {
        "raw-echo" => Ok(Box::new(Prober::<RawSocket>::new(laddr)?)),
        "udp-echo" => Ok(Box::new(Prober::<DgramSocket>::new(laddr)?)),
        _ => Err(PingError::UnknownNetwork(network.to_string())),
    }
}

/// The probe engine. Owns a random 16-bit identifier fixed for its lifetime
/// and a sequence counter that advances on every `ping` call, whether or not
/// the call succeeds.
///
/// One in-flight `ping` per prober; `&mut self` enforces that at compile
/// time. Each call binds a fresh transport handle and releases it on every
/// exit path.
pub struct Prober<S> {
    laddr: Ipv4Addr,
    identifier: u16,
    sequence_number: u16,
    timeout: Duration,
    strict_identifier: bool,
    payload: [u8; PAYLOAD_SIZE],
    _socket: PhantomData<S>,
}

impl<S> Prober<S>
where
    S: Socket,
{
    /// Creates a prober listening on `laddr` (an IP literal or hostname;
    /// `"0.0.0.0"` for all interfaces).
    pub fn new(laddr: &str) -> PingResult<Self> {
        let laddr = resolve::lookup_host_v4(laddr)?;
        let mut rng = rand::thread_rng();
        let mut payload = [0u8; PAYLOAD_SIZE];
        rng.fill(&mut payload[..]);
        Ok(Prober {
            laddr,
            identifier: rng.gen::<u16>(),
            sequence_number: 0,
            timeout: DEFAULT_TIMEOUT,
            strict_identifier: false,
            payload,
            _socket: PhantomData,
        })
    }

    /// The identifier embedded in every request this prober sends.
    #[must_use]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// The sequence number the next `ping` call will send.
    #[must_use]
    pub fn sequence_number(&self) -> u16 {
        self.sequence_number
    }

    /// When enabled, only replies carrying this prober's identifier are
    /// accepted. Off by default: the first echo-reply-typed datagram wins,
    /// whatever its identifier. That is a known limitation inherited from
    /// classic ping behavior, kept as the default because dgram sockets
    /// rewrite the identifier on the wire, which would make a strict match
    /// miss every reply. Enable this on raw sockets when stray replies on
    /// the shared socket are a concern.
    pub fn set_strict_identifier(&mut self, strict: bool) {
        self.strict_identifier = strict;
    }
}

impl<S> Pinger for Prober<S>
where
    S: Socket,
{
    fn ping(&mut self, raddr: &str) -> PingResult<Pong> {
        let peer = resolve::lookup_host_v4(raddr)?;

        let identifier = self.identifier;
        let sequence_number = self.sequence_number;
        // The counter advances as soon as the request exists, even when the
        // rest of the call fails.
        self.sequence_number = self.sequence_number.wrapping_add(1);

        let poll_interval = POLL_INTERVAL.min(self.timeout);
        let socket = Arc::new(S::bind(self.laddr, poll_interval).map_err(PingError::Open)?);

        let bytes = v4::encode_echo_request(identifier, sequence_number, &self.payload)?;

        let start = Instant::now();
        socket
            .send_to(&bytes, &SocketAddrV4::new(peer, 0).into())
            .map_err(PingError::Send)?;
        tracing::debug!(%peer, sequence_number, "echo request sent");

        let halt = Arc::new(AtomicBool::new(false));
        let (pong_tx, pong_rx) = mpsc::sync_channel::<PingResult<Pong>>(1);
        let receiver_thread = std::thread::spawn({
            let socket = Arc::clone(&socket);
            let halt = Arc::clone(&halt);
            let strict_identifier = self.strict_identifier;
            move || receive_loop(&*socket, start, identifier, strict_identifier, &halt, &pong_tx)
        });

        // First-completed-wins race between the receive loop and the timer.
        let outcome = match pong_rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(PingError::Timeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(PingError::Receive(io::Error::new(
                io::ErrorKind::Other,
                "receive loop ended unexpectedly",
            ))),
        };

        // Stop the losing branch and release the socket before returning.
        // The join is bounded by the poll interval.
        halt.store(true, Ordering::Relaxed);
        let _ = receiver_thread.join();
        outcome
    }

    fn reset_counter(&mut self) {
        self.sequence_number = 0;
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

/// Reads datagrams until one is accepted or the prober halts the loop.
/// Decode failures, non-reply types and (in strict mode) foreign identifiers
/// are skipped silently; the loop keeps listening.
fn receive_loop<S>(
    socket: &S,
    start: Instant,
    identifier: u16,
    strict_identifier: bool,
    halt: &AtomicBool,
    pong_tx: &mpsc::SyncSender<PingResult<Pong>>,
) where
    S: Socket,
{
    let mut buf = [0u8; RECV_BUFFER_LEN];
    loop {
        if halt.load(Ordering::Relaxed) {
            return;
        }
        let (n, peer) = match socket.recv_from(&mut buf) {
            Ok(ok) => ok,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(e) => {
                let _ = pong_tx.send(Err(PingError::Receive(e)));
                return;
            }
        };
        let rtt = start.elapsed();

        let reply = match v4::decode_echo_reply(&buf[..n]) {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                tracing::trace!(%peer, "skipping non-reply icmp message");
                continue;
            }
            Err(e) => {
                tracing::trace!(%peer, error = %e, "skipping undecodable datagram");
                continue;
            }
        };
        if strict_identifier && reply.identifier != identifier {
            tracing::trace!(%peer, reply.identifier, "skipping reply with foreign identifier");
            continue;
        }

        tracing::debug!(%peer, reply.sequence_number, ?rtt, "echo reply accepted");
        let _ = pong_tx.send(Ok(Pong {
            peer,
            identifier: reply.identifier,
            sequence_number: reply.sequence_number,
            data: reply.payload,
            size: n,
            rtt,
        }));
        return;
    }
}
