/// The maximum size of an inbound ICMP datagram we read.
///
/// Sized to cover a standard Ethernet MTU; anything larger is truncated by the OS read rather
/// than rejected.
pub const MAX_PACKET_SIZE: usize = 1500;

/// The maximum time-to-live value allowed.
///
/// The IP `ttl` field is a `u8` and the OS is the ultimate authority on the values it accepts.
pub const MAX_TTL: u8 = 255;
