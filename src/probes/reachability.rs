use super::{PingObservation, Transport};
use crate::{
    config::is_loopback,
    report::{Check, CheckResult, FailureKind},
};
use std::{
    net::IpAddr,
    time::{Duration, Instant},
};

/// Resolve the host and ping it once
pub async fn probe<T: Transport>(transport: &T, host: &str, timeout: Duration) -> CheckResult {
    let check = Check::Reachability {
        host: host.to_string(),
    };

    if is_loopback(host) {
        return CheckResult::pass(check, format!("{host} is the local machine, ping skipped"));
    }

    let start = Instant::now();
    let addrs = match transport.resolve(host).await {
        Ok(addrs) => addrs,
        Err(e) => {
            return CheckResult::fail(
                check,
                FailureKind::NetworkUnreachable,
                format!("could not resolve {host}: {e}"),
            )
            .with_elapsed(start.elapsed());
        }
    };

    let observation = transport.ping(host, timeout).await;
    evaluate(check, &addrs, timeout, observation).with_elapsed(start.elapsed())
}

#[must_use]
pub fn evaluate(
    check: Check,
    addrs: &[IpAddr],
    timeout: Duration,
    observation: PingObservation,
) -> CheckResult {
    let resolved = addrs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    match observation {
        PingObservation::Reply => CheckResult::pass(check, format!("resolved to {resolved}, ping answered")),
        PingObservation::NoReply => CheckResult::fail(
            check,
            FailureKind::NetworkUnreachable,
            format!(
                "resolved to {resolved}, no ping reply within {}s",
                timeout.as_secs()
            ),
        ),
        PingObservation::Unavailable(reason) | PingObservation::Failed(reason) => {
            CheckResult::indeterminate(
                check,
                format!("resolved to {resolved}, reachability unknown: {reason}"),
            )
        }
    }
}
