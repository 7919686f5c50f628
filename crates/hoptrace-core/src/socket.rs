use crate::error::IoResult as Result;
use std::net::SocketAddr;
use std::time::Duration;

/// The narrow socket surface needed for sending probes and receiving responses.
#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a blocking UDP socket for sending probes.
    fn new_udp_send_socket() -> Result<Self>;
    /// Create a raw socket for receiving ICMP messages.
    fn new_icmp_recv_socket() -> Result<Self>;
    fn bind(&mut self, address: SocketAddr) -> Result<()>;
    /// Set the IP time to live for outgoing datagrams.
    ///
    /// Issues a fresh socket option syscall on every call, nothing is cached in user space.
    fn set_ttl(&mut self, ttl: u8) -> Result<()>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> Result<()>;
    /// Returns true if the socket becomes readable before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> Result<bool>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn local_addr(&mut self) -> Result<Option<SocketAddr>>;
}

#[cfg(test)]
pub mod tests {
    #[macro_export]
    macro_rules! mocket_read {
        ($packet: expr) => {
            move |buf: &mut [u8]| -> IoResult<usize> {
                buf[..$packet.len()].copy_from_slice(&$packet);
                Ok($packet.len())
            }
        };
    }
}
