use crate::error::{Error, Result};
use crate::platform::SocketImpl;
use crate::socket::Socket;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing::instrument;

/// A sender of TTL limited UDP probe datagrams.
///
/// The sender owns a single UDP socket bound to a local address. The caller sets the time to live
/// and then sends a probe, repeating for each hop; the resulting ICMP responses are received
/// separately by a [`ResponseListener`](crate::ResponseListener).
///
/// A sender must not be shared across threads without external serialization; the `&mut self`
/// receivers order a `set_ttl` before the `send_probe` which follows it.
#[derive(Debug)]
pub struct ProbeSender<S: Socket = SocketImpl> {
    socket: S,
}

impl ProbeSender<SocketImpl> {
    /// Open a probe sender bound to the given local address.
    ///
    /// The address must be of the form `"host:port"` where an empty host means the wildcard
    /// address and port `0` asks the OS for an ephemeral port, so `":0"` binds any interface on a
    /// free port. Hostnames are resolved and only IPv4 candidates are considered.
    #[instrument(level = "trace")]
    pub fn open(local_addr: &str) -> Result<Self> {
        Self::open_socket(local_addr)
    }
}

impl<S: Socket> ProbeSender<S> {
    fn open_socket(local_addr: &str) -> Result<Self> {
        let addr = resolve_local_addr(local_addr)?;
        let mut socket = S::new_udp_send_socket()?;
        socket.bind(addr)?;
        tracing::debug!(?addr, "probe sender open");
        Ok(Self { socket })
    }

    /// Set the IP time to live for subsequent probes.
    ///
    /// Values outside 1..=255 cannot be expressed; within that range the OS is the ultimate
    /// authority on validity. Each call issues a fresh socket option syscall and a failure to set
    /// the option is returned to the caller, since a probe sent with an unconfirmed TTL cannot be
    /// attributed to a hop.
    #[instrument(skip(self), level = "trace")]
    pub fn set_ttl(&mut self, ttl: u8) -> Result<()> {
        Ok(self.socket.set_ttl(ttl)?)
    }

    /// Send a zero length UDP datagram to the destination.
    ///
    /// The empty payload is intentional: the probe exists only to elicit an ICMP response from
    /// the path, not to deliver data. UDP is fire and forget, so a reachable but non-listening
    /// destination port is not an error here.
    #[instrument(skip(self), level = "trace")]
    pub fn send_probe(&mut self, dest: SocketAddr) -> Result<()> {
        Ok(self.socket.send_to(&[], dest)?)
    }

    /// The local address this sender is bound to.
    pub fn local_addr(&mut self) -> Result<Option<SocketAddr>> {
        Ok(self.socket.local_addr()?)
    }

    /// Close the sender and release the socket.
    ///
    /// Consuming the sender makes double close and use after close unrepresentable.
    pub fn close(self) {}

    #[cfg(test)]
    const fn from_socket(socket: S) -> Self {
        Self { socket }
    }
}

/// Resolve a `"host:port"` string to an IPv4 socket address.
fn resolve_local_addr(local_addr: &str) -> Result<SocketAddr> {
    let qualified = if local_addr.starts_with(':') {
        format!("0.0.0.0{local_addr}")
    } else {
        local_addr.to_string()
    };
    qualified
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.find(SocketAddr::is_ipv4))
        .ok_or_else(|| Error::ResolveAddress(String::from(local_addr)))
}
