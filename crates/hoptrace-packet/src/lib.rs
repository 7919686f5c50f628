//! Packet wire format parsing and building.
//!
//! The following packets are supported:
//! - `ICMPv4` (the generic envelope, `TimeExceeded` and `EchoReply`)
//! - `IPv4`
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example parses an `IPv4` header and asserts its fields:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use hoptrace_packet::ipv4::Ipv4Packet;
//!
//! let buf = hex_literal::hex!(
//!     "45 00 00 1c 00 01 40 00 01 11 ab cd c0 a8 01 64 08 08 08 08"
//! );
//! let packet = Ipv4Packet::new_view(&buf)?;
//! assert_eq!(4, packet.get_version());
//! assert_eq!(1, packet.get_ttl());
//! assert_eq!(std::net::Ipv4Addr::new(8, 8, 8, 8), packet.get_destination());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// `ICMPv4` packets.
pub mod icmpv4;

/// `IPv4` packets.
pub mod ipv4;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Udp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Udp => 17,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            17 => Self::Udp,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_protocol_roundtrip() {
        assert_eq!(IpProtocol::Icmp, IpProtocol::from(1));
        assert_eq!(IpProtocol::Udp, IpProtocol::from(17));
        assert_eq!(IpProtocol::Other(6), IpProtocol::from(6));
        assert_eq!(1, IpProtocol::Icmp.id());
        assert_eq!(17, IpProtocol::Udp.id());
        assert_eq!(255, IpProtocol::Other(255).id());
    }

    #[test]
    fn test_fmt_payload() {
        assert_eq!("", fmt_payload(&[]));
        assert_eq!("0b 00 be ef", fmt_payload(&[0x0b, 0x00, 0xbe, 0xef]));
    }
}
