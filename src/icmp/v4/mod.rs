//! ICMPv4 echo codec: structured echo messages to and from wire bytes.
//! Pure data transformation, no sockets here.

use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{IcmpCode, IcmpPacket, IcmpTypes};
use pnet_packet::Packet;

use crate::ping_error::{PingError, PingResult};

pub(crate) mod socket;
pub(crate) use socket::dgram_socket::DgramSocket;
pub(crate) use socket::raw_socket::RawSocket;
pub(crate) use socket::Socket;

/// A decoded echo reply. Transient, built per received datagram.
#[derive(Debug)]
pub(crate) struct EchoReply {
    pub(crate) identifier: u16,
    pub(crate) sequence_number: u16,
    pub(crate) payload: Vec<u8>,
}

/// Serializes an echo request (type 8, code 0) with the given identifier,
/// sequence number and payload, checksum included.
pub(crate) fn encode_echo_request(
    identifier: u16,
    sequence_number: u16,
    payload: &[u8],
) -> PingResult<Vec<u8>> {
    let buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
    let mut packet = MutableEchoRequestPacket::owned(buf)
        .ok_or_else(|| PingError::Encode("could not allocate echo request packet".to_string()))?;
    packet.set_icmp_type(IcmpTypes::EchoRequest);
    packet.set_icmp_code(IcmpCode::new(0));
    packet.set_identifier(identifier);
    packet.set_sequence_number(sequence_number);
    packet.set_payload(payload);

    let checksum = pnet_packet::icmp::checksum(
        &IcmpPacket::new(packet.packet())
            .ok_or_else(|| PingError::Encode("could not compute checksum".to_string()))?,
    );
    packet.set_checksum(checksum);
    Ok(packet.packet().to_vec())
}

/// Parses received bytes as an ICMP message. Returns `Ok(None)` when the
/// message is well-formed but not an echo reply (the receive loop keeps
/// listening in that case), `Err` when the bytes are not ICMP at all.
pub(crate) fn decode_echo_reply(bytes: &[u8]) -> PingResult<Option<EchoReply>> {
    let icmp = IcmpPacket::new(bytes)
        .ok_or_else(|| PingError::Decode("truncated icmp message".to_string()))?;
    if icmp.get_icmp_type() != IcmpTypes::EchoReply {
        return Ok(None);
    }
    let reply = EchoReplyPacket::new(bytes)
        .ok_or_else(|| PingError::Decode("truncated echo reply".to_string()))?;
    Ok(Some(EchoReply {
        identifier: reply.get_identifier(),
        sequence_number: reply.get_sequence_number(),
        payload: reply.payload().to_vec(),
    }))
}
