use pnet::packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet::packet::icmp::{IcmpCode, IcmpPacket, IcmpType, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::Packet;

use crate::error::PingError;

const ICMPV6_ECHO_REQUEST: u8 = 128;
const ICMPV6_ECHO_REPLY: u8 = 129;

/// Address family of an echo exchange. ICMPv4 and ICMPv6 echo messages share
/// the same layout and differ only in type numbers and framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpFamily {
    V4,
    V6,
}

impl IcmpFamily {
    fn request_type(self) -> IcmpType {
        match self {
            IcmpFamily::V4 => IcmpTypes::EchoRequest,
            IcmpFamily::V6 => IcmpType::new(ICMPV6_ECHO_REQUEST),
        }
    }

    fn reply_type(self) -> IcmpType {
        match self {
            IcmpFamily::V4 => IcmpTypes::EchoReply,
            IcmpFamily::V6 => IcmpType::new(ICMPV6_ECHO_REPLY),
        }
    }
}

pub struct IcmpEchoRequest {
    pub family: IcmpFamily,
    pub identifier: u16,
    pub sequence: u16,
    pub payload_size: usize,
}

impl IcmpEchoRequest {
    pub fn new(family: IcmpFamily, identifier: u16, sequence: u16, payload_size: usize) -> Self {
        Self {
            family,
            identifier,
            sequence,
            payload_size,
        }
    }

    /// Serializes the request. The ICMPv6 checksum is left zero, the kernel
    /// fills it in for raw ICMPv6 sockets.
    pub fn encode(&self) -> Result<Vec<u8>, PingError> {
        let header = EchoRequestPacket::minimum_packet_size();
        let mut buffer = vec![0u8; header + self.payload_size];
        for (i, byte) in buffer[header..].iter_mut().enumerate() {
            *byte = (i % 256) as u8;
        }

        let mut packet =
            MutableEchoRequestPacket::new(&mut buffer).ok_or(PingError::PacketConstructionError)?;
        packet.set_icmp_type(self.family.request_type());
        packet.set_icmp_code(IcmpCode::new(0));
        packet.set_identifier(self.identifier);
        packet.set_sequence_number(self.sequence);

        if self.family == IcmpFamily::V4 {
            let checksum = IcmpPacket::new(packet.packet())
                .map(|p| pnet::packet::icmp::checksum(&p))
                .ok_or(PingError::PacketConstructionError)?;
            packet.set_checksum(checksum);
        }

        Ok(buffer)
    }
}

/// Returns true if `buffer` holds the echo reply matching `identifier` and
/// `sequence`. Raw ICMPv4 sockets deliver the IP header too, ICMPv6 ones don't.
pub fn is_matching_reply(family: IcmpFamily, buffer: &[u8], identifier: u16, sequence: u16) -> bool {
    let icmp = match family {
        IcmpFamily::V4 => match Ipv4Packet::new(buffer) {
            Some(ip) if ip.get_next_level_protocol() == IpNextHeaderProtocols::Icmp => {
                let offset = usize::from(ip.get_header_length()) * 4;
                match buffer.get(offset..) {
                    Some(icmp) => icmp,
                    None => return false,
                }
            }
            _ => return false,
        },
        IcmpFamily::V6 => buffer,
    };

    // Echo replies share the request layout, so the request view exposes id and seq.
    match EchoRequestPacket::new(icmp) {
        Some(reply) => {
            reply.get_icmp_type() == family.reply_type()
                && reply.get_identifier() == identifier
                && reply.get_sequence_number() == sequence
        }
        None => false,
    }
}
