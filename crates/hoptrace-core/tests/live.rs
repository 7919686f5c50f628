//! Integration tests against real sockets.
//!
//! Tests in the root module need only an unprivileged UDP socket. Tests in
//! the `privileged` module open a raw ICMP socket and so require
//! `CAP_NET_RAW` or root; they are enabled with the `privileged-tests`
//! feature.

use hoptrace_core::{Error, IoError, ProbeSender};
use std::net::UdpSocket;
use std::time::Duration;

#[test]
fn test_open_assigns_ephemeral_port() -> anyhow::Result<()> {
    let mut sender = ProbeSender::open(":0")?;
    let addr = sender.local_addr()?.expect("bound address");
    assert!(addr.ip().is_unspecified());
    assert_ne!(0, addr.port());
    sender.close();
    Ok(())
}

#[test]
fn test_open_rejects_malformed_address() {
    let err = ProbeSender::open("not an address").unwrap_err();
    assert!(matches!(err, Error::ResolveAddress(_)));
}

#[test]
fn test_open_rejects_address_in_use() -> anyhow::Result<()> {
    let mut first = ProbeSender::open("127.0.0.1:0")?;
    let port = first.local_addr()?.expect("bound address").port();
    let err = ProbeSender::open(&format!("127.0.0.1:{port}")).unwrap_err();
    assert!(matches!(err, Error::IoError(IoError::Bind(_, _))));
    first.close();
    Ok(())
}

#[test]
fn test_send_probe_to_non_listening_port_is_fire_and_forget() -> anyhow::Result<()> {
    let mut sender = ProbeSender::open(":0")?;
    sender.set_ttl(64)?;
    // Nothing listens on this port; UDP reports no error to the sender, the
    // failure would only surface later as ICMP at a listener.
    sender.send_probe("127.0.0.1:61337".parse()?)?;
    sender.close();
    Ok(())
}

#[test]
fn test_probe_payload_is_empty_for_all_ttls() -> anyhow::Result<()> {
    let receiver = UdpSocket::bind("127.0.0.1:0")?;
    receiver.set_read_timeout(Some(Duration::from_secs(1)))?;
    let dest = receiver.local_addr()?;
    let mut sender = ProbeSender::open("127.0.0.1:0")?;
    let local = sender.local_addr()?.expect("bound address");
    let mut buf = [0_u8; 64];
    for ttl in [1_u8, 8, 64, 255] {
        sender.set_ttl(ttl)?;
        sender.send_probe(dest)?;
        let (len, from) = receiver.recv_from(&mut buf)?;
        assert_eq!(0, len);
        assert_eq!(local, from);
    }
    sender.close();
    Ok(())
}

#[cfg(feature = "privileged-tests")]
mod privileged {
    use hoptrace_core::{decode, Error, IcmpResponse, ProbeSender, ResponseListener};
    use std::net::Ipv4Addr;
    use std::time::{Duration, Instant};

    #[test]
    fn test_read_with_timeout_is_bounded() -> anyhow::Result<()> {
        let mut listener = ResponseListener::open()?;
        let timeout = Duration::from_secs(1);
        let start = Instant::now();
        match listener.read_with_timeout(timeout) {
            Err(Error::Timeout) => {
                let elapsed = start.elapsed();
                assert!(elapsed >= Duration::from_millis(900), "returned early: {elapsed:?}");
                assert!(elapsed <= Duration::from_millis(1500), "returned late: {elapsed:?}");
            }
            // stray ICMP traffic arrived first, nothing to assert
            Ok(_) => {}
            Err(err) => return Err(err.into()),
        }
        listener.close();
        Ok(())
    }

    #[test]
    fn test_first_hop_reports_time_exceeded() -> anyhow::Result<()> {
        let target = Ipv4Addr::new(1, 1, 1, 1);
        let mut sender = ProbeSender::open(":0")?;
        let mut listener = ResponseListener::open()?;
        sender.set_ttl(1)?;
        sender.send_probe(std::net::SocketAddr::from((target, 33434)))?;
        let deadline = Instant::now() + Duration::from_secs(3);
        let header = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            anyhow::ensure!(!remaining.is_zero(), "no TimeExceeded before deadline");
            let (_, bytes) = match listener.read_with_timeout(remaining) {
                Ok(msg) => msg,
                Err(Error::Timeout) => continue,
                Err(err) => return Err(err.into()),
            };
            match decode(&bytes) {
                Ok(IcmpResponse::TimeExceeded(header)) => break header,
                // unrelated ICMP traffic, keep waiting
                _ => continue,
            }
        };
        assert!(header.ttl <= 1, "probe ttl budget not exhausted: {}", header.ttl);
        assert_eq!(target, header.destination);
        sender.close();
        listener.close();
        Ok(())
    }
}
