use crate::error::{IoError, IoOperation, IoResult};
use crate::socket::Socket;
use itertools::Itertools;
use nix::sys::select::FdSet;
use nix::sys::socket::{setsockopt, sockopt};
use nix::sys::time::{TimeVal, TimeValLike};
use nix::Error;
use socket2::{Domain, Protocol, SockAddr, Type};
use std::io;
use std::io::Read;
use std::net::SocketAddr;
use std::os::fd::{AsFd, BorrowedFd};
use std::time::Duration;
use tracing::instrument;

/// A network socket.
#[derive(Debug)]
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new(domain: Domain, ty: Type, protocol: Protocol) -> IoResult<Self> {
        Ok(Self {
            inner: socket2::Socket::new(domain, ty, Some(protocol))
                .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?,
        })
    }

    /// Run an operation against the underlying descriptor.
    ///
    /// The descriptor stays owned by this socket; the operation only ever sees a borrow scoped to
    /// the closure and so cannot outlive or close it.
    fn control<F, T>(&self, op: F) -> T
    where
        F: FnOnce(BorrowedFd<'_>) -> T,
    {
        op(self.inner.as_fd())
    }

    fn set_nonblocking(&self, nonblocking: bool) -> IoResult<()> {
        self.inner
            .set_nonblocking(nonblocking)
            .map_err(|err| IoError::Other(err, IoOperation::SetNonBlocking))
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_udp_send_socket() -> IoResult<Self> {
        Self::new(Domain::IPV4, Type::DGRAM, Protocol::UDP)
    }
    #[instrument(level = "trace")]
    fn new_icmp_recv_socket() -> IoResult<Self> {
        let socket = Self::new(Domain::IPV4, Type::RAW, Protocol::ICMPV4)?;
        socket.set_nonblocking(true)?;
        Ok(socket)
    }
    #[instrument(skip(self), level = "trace")]
    fn bind(&mut self, address: SocketAddr) -> IoResult<()> {
        self.inner
            .bind(&SockAddr::from(address))
            .map_err(|err| IoError::Bind(err, address))
    }
    #[instrument(skip(self), level = "trace")]
    fn set_ttl(&mut self, ttl: u8) -> IoResult<()> {
        self.control(|fd| setsockopt(&fd, sockopt::Ipv4Ttl, &i32::from(ttl)))
            .map_err(|err| IoError::Other(io::Error::from(err), IoOperation::SetTtl))
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
        tracing::trace!(buf = format!("{:02x?}", buf.iter().format(" ")), ?addr);
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))?;
        Ok(())
    }
    #[instrument(skip(self), level = "trace")]
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool> {
        let mut read = FdSet::new();
        read.insert(self.inner.as_fd());
        let readable = nix::sys::select::select(
            None,
            Some(&mut read),
            None,
            None,
            Some(&mut TimeVal::milliseconds(timeout.as_millis() as i64)),
        );
        match readable {
            Ok(readable) => Ok(readable == 1),
            Err(Error::EINTR) => Ok(false),
            Err(err) => Err(IoError::Other(io::Error::from(err), IoOperation::Select)),
        }
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        let bytes_read = self
            .inner
            .read(buf)
            .map_err(|err| IoError::Other(err, IoOperation::Read))?;
        tracing::trace!(
            buf = format!("{:02x?}", buf[..bytes_read].iter().format(" ")),
            bytes_read
        );
        Ok(bytes_read)
    }
    #[instrument(skip(self), level = "trace")]
    fn local_addr(&mut self) -> IoResult<Option<SocketAddr>> {
        Ok(self
            .inner
            .local_addr()
            .map_err(|err| IoError::Other(err, IoOperation::LocalAddr))?
            .as_socket())
    }
}
