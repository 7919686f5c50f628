use hoptrace_packet::icmpv4::IcmpType;
use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A probe error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A probe error.
#[derive(Error, Debug)]
pub enum Error {
    /// The local address string could not be resolved to an IPv4 socket address.
    #[error("failed to resolve local address: {0}")]
    ResolveAddress(String),
    /// The inbound bytes were not a well formed ICMP message.
    #[error("failed to parse ICMP message: {0}")]
    ParsePacket(hoptrace_packet::error::Error),
    /// The IP header embedded in a `TimeExceeded` message was malformed.
    #[error("failed to parse embedded IP header: {0}")]
    ParseEmbeddedHeader(hoptrace_packet::error::Error),
    /// A well formed ICMP message of a type which carries no hop information.
    #[error("unexpected ICMP message type: {0:?}")]
    UnexpectedIcmpType(IcmpType),
    /// No message arrived before the deadline.
    ///
    /// This is a routine outcome which callers are expected to recover from, it signals only that
    /// a given hop did not answer in time.
    #[error("read timed out")]
    Timeout,
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// Get the kind of the underlying IO error.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Bind(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetTtl,
    Select,
    Read,
    LocalAddr,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::Select => write!(f, "select"),
            Self::Read => write!(f, "read"),
            Self::LocalAddr => write!(f, "local addr"),
        }
    }
}
