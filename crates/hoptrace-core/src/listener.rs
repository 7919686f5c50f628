use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, Result};
use crate::platform::SocketImpl;
use crate::socket::Socket;
use hoptrace_packet::ipv4::Ipv4Packet;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::instrument;

/// A listener for inbound ICMP responses.
///
/// One listener is opened per path discovery session and read once per probe. Only one read
/// should be in flight at a time; which of two concurrent reads receives a given packet is
/// undefined, so callers must serialize access or open one listener per probe stream.
pub struct ResponseListener<S: Socket = SocketImpl> {
    socket: S,
}

impl ResponseListener<SocketImpl> {
    /// Open a raw ICMP listener bound to all interfaces.
    ///
    /// Raw ICMP sockets typically require elevated privileges (`CAP_NET_RAW` on Linux), so the
    /// common failure here is a permission error.
    #[instrument(level = "trace")]
    pub fn open() -> Result<Self> {
        Self::open_socket()
    }
}

impl<S: Socket> ResponseListener<S> {
    fn open_socket() -> Result<Self> {
        let mut socket = S::new_icmp_recv_socket()?;
        socket.bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))?;
        tracing::debug!("response listener open");
        Ok(Self { socket })
    }

    /// Read the next inbound ICMP message, waiting up to `timeout`.
    ///
    /// The deadline is re-armed on every call, it is never cumulative across calls. On success
    /// the source address and the ICMP message bytes are returned, with the enclosing IPv4 header
    /// the OS hands raw sockets already removed. Messages larger than [`MAX_PACKET_SIZE`] are
    /// truncated by the read.
    ///
    /// Expiry of the deadline is reported as [`Error::Timeout`], distinct from any other read
    /// failure, so a silent hop can be treated as a routine outcome.
    #[instrument(skip(self), level = "trace")]
    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<(Ipv4Addr, Vec<u8>)> {
        if !self.socket.is_readable(timeout)? {
            return Err(Error::Timeout);
        }
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let bytes_read = match self.socket.read(&mut buf) {
            Ok(bytes_read) => bytes_read,
            // the datagram was claimed by another reader between the
            // readiness check and the read
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Err(Error::Timeout),
            Err(err) => return Err(Error::IoError(err)),
        };
        let ipv4 = Ipv4Packet::new_view(&buf[..bytes_read]).map_err(Error::ParsePacket)?;
        Ok((ipv4.get_source(), ipv4.payload().to_vec()))
    }

    /// Close the listener and release the socket.
    ///
    /// Consuming the listener makes double close and use after close unrepresentable.
    pub fn close(self) {}

    #[cfg(test)]
    const fn from_socket(socket: S) -> Self {
        Self { socket }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IoError, IoOperation, IoResult};
    use crate::mocket_read;
    use crate::socket::MockSocket;
    use mockall::predicate;

    // A complete inbound datagram as handed to us by a raw ICMP socket: the
    // outer IPv4 header written by the responding router followed by a
    // TimeExceeded message embedding the original probe.
    const DATAGRAM: [u8; 56] = hex_literal::hex!(
        "
        45 00 00 38 1a 2b 00 00 3f 01 c0 de 0a 00 00 01
        c0 a8 01 64
        0b 00 be ef 00 00 00 00
        45 00 00 1c 00 01 40 00 01 11 ab cd c0 a8 01 64
        08 08 08 08
        10 4e 82 9b 00 08 00 00
        "
    );

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[test]
    fn test_read_with_timeout_strips_outer_header() -> anyhow::Result<()> {
        let mut mocket = MockSocket::new();
        mocket
            .expect_is_readable()
            .with(predicate::eq(TIMEOUT))
            .times(1)
            .returning(|_| Ok(true));
        mocket.expect_read().times(1).returning(mocket_read!(DATAGRAM));
        let mut listener = ResponseListener::from_socket(mocket);
        let (source, bytes) = listener.read_with_timeout(TIMEOUT)?;
        assert_eq!(Ipv4Addr::new(10, 0, 0, 1), source);
        assert_eq!(&DATAGRAM[20..], bytes.as_slice());
        Ok(())
    }

    #[test]
    fn test_read_with_timeout_times_out() {
        let mut mocket = MockSocket::new();
        mocket
            .expect_is_readable()
            .with(predicate::eq(TIMEOUT))
            .times(1)
            .returning(|_| Ok(false));
        let mut listener = ResponseListener::from_socket(mocket);
        let err = listener.read_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[test]
    fn test_read_with_timeout_would_block_is_timeout() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().returning(|_| Ok(true));
        mocket.expect_read().returning(|_| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::WouldBlock),
                IoOperation::Read,
            ))
        });
        let mut listener = ResponseListener::from_socket(mocket);
        let err = listener.read_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[test]
    fn test_read_with_timeout_propagates_read_error() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().returning(|_| Ok(true));
        mocket.expect_read().returning(|_| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::ConnectionReset),
                IoOperation::Read,
            ))
        });
        let mut listener = ResponseListener::from_socket(mocket);
        let err = listener.read_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            Error::IoError(IoError::Other(_, IoOperation::Read))
        ));
    }

    #[test]
    fn test_read_with_timeout_propagates_select_error() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().returning(|_| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::InvalidInput),
                IoOperation::Select,
            ))
        });
        let mut listener = ResponseListener::from_socket(mocket);
        let err = listener.read_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            Error::IoError(IoError::Other(_, IoOperation::Select))
        ));
    }

    #[test]
    fn test_read_with_timeout_rejects_short_datagram() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().returning(|_| Ok(true));
        mocket
            .expect_read()
            .returning(mocket_read!(hex_literal::hex!("45 00 00 38")));
        let mut listener = ResponseListener::from_socket(mocket);
        let err = listener.read_with_timeout(TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::ParsePacket(_)));
    }
}
