//! One-shot diagnostic probes
//!
//! Every probe produces exactly one [`CheckResult`](crate::report::CheckResult).
//! The I/O sits behind [`Transport`] and [`DatabaseClient`](crate::client::DatabaseClient),
//! the `evaluate` functions turning observations into results are pure.

pub mod connection;
pub mod driver;
pub mod net;
pub mod port;
pub mod reachability;

pub use net::SystemTransport;

use std::{future::Future, net::IpAddr, time::Duration};

/// What a single ping produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingObservation {
    Reply,
    /// ping ran and got no answer
    NoReply,
    /// ping could not be started (missing binary, no permission)
    Unavailable(String),
    /// ping started but failed for another reason or hung
    Failed(String),
}

/// What a single TCP connect produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortObservation {
    Open,
    Refused,
    TimedOut,
    /// resolution or routing error, OS message kept verbatim
    Unreachable(String),
}

/// Network side of the probes
pub trait Transport {
    fn resolve(&self, host: &str) -> impl Future<Output = Result<Vec<IpAddr>, String>>;

    fn ping(&self, host: &str, timeout: Duration) -> impl Future<Output = PingObservation>;

    fn connect_tcp(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = PortObservation>;
}
