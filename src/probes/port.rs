use super::{PortObservation, Transport};
use crate::report::{Check, CheckResult, FailureKind};
use std::time::{Duration, Instant};

/// One raw TCP connect to `host:port`
pub async fn probe<T: Transport>(
    transport: &T,
    host: &str,
    port: u16,
    timeout: Duration,
) -> CheckResult {
    let start = Instant::now();
    let observation = transport.connect_tcp(host, port, timeout).await;
    evaluate(host, port, timeout, observation).with_elapsed(start.elapsed())
}

#[must_use]
pub fn evaluate(host: &str, port: u16, timeout: Duration, observation: PortObservation) -> CheckResult {
    let check = Check::Port {
        host: host.to_string(),
        port,
    };

    match observation {
        PortObservation::Open => CheckResult::pass(check, "port accepted the connection"),
        PortObservation::Refused => CheckResult::fail(
            check,
            FailureKind::PortRefused,
            "connection refused: nothing is listening on this port",
        ),
        PortObservation::TimedOut => CheckResult::fail(
            check,
            FailureKind::PortTimedOut,
            format!(
                "timed out after {}s: packets are being dropped, likely by a firewall",
                timeout.as_secs()
            ),
        ),
        PortObservation::Unreachable(reason) => {
            CheckResult::fail(check, FailureKind::NetworkUnreachable, reason)
        }
    }
}
