//! Hoptrace - network primitives for UDP/ICMP path discovery.
//!
//! This crate provides the protocol and OS interface layer of a
//! traceroute-style tool: a [`ProbeSender`] which sends TTL limited UDP
//! datagrams, a [`ResponseListener`] which performs timeout bounded reads of
//! raw ICMP traffic, and a [`decode`] function which classifies a raw ICMP
//! message and extracts the original probe header embedded in a
//! `TimeExceeded` response.
//!
//! The two sockets are independent, caller owned resources; a caller drives
//! the per hop iteration by setting the TTL, sending a probe and then reading
//! from the listener, hop by hop. Nothing here spawns threads or holds locks;
//! each instance must be used sequentially from one thread at a time.
//!
//! # Example
//!
//! The following example sends a single probe with a TTL of `1` and decodes
//! the response from the first hop:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use hoptrace_core::{decode, IcmpResponse, ProbeSender, ResponseListener};
//! use std::time::Duration;
//!
//! let mut sender = ProbeSender::open(":0")?;
//! let mut listener = ResponseListener::open()?;
//! sender.set_ttl(1)?;
//! sender.send_probe("203.0.113.1:33434".parse()?)?;
//! let (addr, bytes) = listener.read_with_timeout(Duration::from_secs(1))?;
//! match decode(&bytes)? {
//!     IcmpResponse::TimeExceeded(header) => {
//!         println!("hop at {addr}, probe ttl was {}", header.ttl);
//!     }
//!     IcmpResponse::EchoReply => println!("reached destination {addr}"),
//! }
//! sender.close();
//! listener.close();
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
#![deny(unsafe_code)]

mod constants;
mod decode;
mod error;
mod listener;
mod platform;
mod probe;
mod socket;

pub use constants::{MAX_PACKET_SIZE, MAX_TTL};
pub use decode::{decode, IcmpResponse, Ipv4Header};
pub use error::{Error, IoError, IoOperation, Result};
pub use listener::ResponseListener;
pub use platform::SocketImpl;
pub use probe::ProbeSender;
pub use socket::Socket;
