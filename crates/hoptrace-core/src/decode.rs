use crate::error::{Error, Result};
use hoptrace_packet::icmpv4::time_exceeded::TimeExceededPacket;
use hoptrace_packet::icmpv4::{IcmpPacket, IcmpType};
use hoptrace_packet::ipv4::Ipv4Packet;
use hoptrace_packet::IpProtocol;
use std::net::Ipv4Addr;
use tracing::instrument;

/// A decoded ICMP response which carries hop information.
///
/// Only two ICMP outcomes are meaningful for path discovery: an intermediate hop signals via
/// `TimeExceeded` and the final destination signals via `EchoReply`. Every other type is rejected
/// as [`Error::UnexpectedIcmpType`] so the caller can tell a usable response from irrelevant ICMP
/// traffic.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IcmpResponse {
    /// An intermediate router dropped the probe when its time to live expired.
    ///
    /// Carries the header of the original probe datagram as returned by the router.
    TimeExceeded(Ipv4Header),
    /// The probe reached the destination itself.
    EchoReply,
}

/// The IPv4 header of the original probe embedded in a `TimeExceeded` message.
///
/// An owned copy of the header fields so the decoded value does not borrow the receive buffer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Ipv4Header {
    pub version: u8,
    pub header_length: u8,
    pub tos: u8,
    pub total_length: u16,
    pub identification: u16,
    pub flags_and_fragment_offset: u16,
    pub ttl: u8,
    pub protocol: IpProtocol,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

impl From<&Ipv4Packet<'_>> for Ipv4Header {
    fn from(packet: &Ipv4Packet<'_>) -> Self {
        Self {
            version: packet.get_version(),
            header_length: packet.get_header_length(),
            tos: packet.get_tos(),
            total_length: packet.get_total_length(),
            identification: packet.get_identification(),
            flags_and_fragment_offset: packet.get_flags_and_fragment_offset(),
            ttl: packet.get_ttl(),
            protocol: packet.get_protocol(),
            checksum: packet.get_checksum(),
            source: packet.get_source(),
            destination: packet.get_destination(),
        }
    }
}

/// Decode a raw ICMP message.
///
/// The bytes are expected to start at the ICMP envelope, with any enclosing IP header already
/// removed, as produced by
/// [`ResponseListener::read_with_timeout`](crate::ResponseListener::read_with_timeout).
#[instrument(skip(bytes), level = "trace")]
pub fn decode(bytes: &[u8]) -> Result<IcmpResponse> {
    let icmp = IcmpPacket::new_view(bytes).map_err(Error::ParsePacket)?;
    match icmp.get_icmp_type() {
        IcmpType::TimeExceeded => {
            let packet = TimeExceededPacket::new_view(bytes).map_err(Error::ParsePacket)?;
            let ipv4 =
                Ipv4Packet::new_view(packet.payload()).map_err(Error::ParseEmbeddedHeader)?;
            Ok(IcmpResponse::TimeExceeded(Ipv4Header::from(&ipv4)))
        }
        IcmpType::EchoReply => Ok(IcmpResponse::EchoReply),
        icmp_type => Err(Error::UnexpectedIcmpType(icmp_type)),
    }
}
