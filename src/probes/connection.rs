use crate::{
    client::{ClientError, ConnectRequest, ConnectionString, DatabaseClient, ServerInfo},
    config::{AuthMethod, TargetConfig, Variant},
    report::{Check, CheckResult},
};
use std::time::{Duration, Instant};
use tracing::debug;

/// One full protocol-level connection attempt, closed right after
pub async fn probe<C: DatabaseClient>(
    client: &C,
    target: &TargetConfig,
    auth: AuthMethod,
    timeout: Duration,
    variant: &Variant,
) -> CheckResult {
    let check = check_for(target, auth, timeout, variant);
    let request = ConnectRequest {
        connection_string: ConnectionString::build(target, auth, variant),
        timeout,
    };
    debug!(
        "connecting with timeout {}s: {}",
        timeout.as_secs(),
        request.connection_string.redacted()
    );

    let start = Instant::now();
    let result = client.connect(&request).await;
    evaluate(check, result, start.elapsed())
}

/// Recorded instead of an attempt when a prerequisite failed
#[must_use]
pub fn skipped(
    target: &TargetConfig,
    auth: AuthMethod,
    timeout: Duration,
    variant: &Variant,
    reason: &str,
) -> CheckResult {
    CheckResult::skip(check_for(target, auth, timeout, variant), reason)
}

#[must_use]
pub fn evaluate(
    check: Check,
    result: Result<ServerInfo, ClientError>,
    elapsed: Duration,
) -> CheckResult {
    let secs = elapsed.as_secs_f64();
    let result = match result {
        Ok(info) => {
            let detail = info.version.map_or_else(
                || format!("connected in {secs:.2}s"),
                |version| format!("connected in {secs:.2}s, server: {version}"),
            );
            CheckResult::pass(check, detail)
        }
        Err(e) => CheckResult::fail(
            check,
            e.classify(),
            format!("failed after {secs:.2}s: {e}"),
        ),
    };
    result.with_elapsed(elapsed)
}

fn check_for(target: &TargetConfig, auth: AuthMethod, timeout: Duration, variant: &Variant) -> Check {
    let database = match variant {
        Variant::SystemDatabase => TargetConfig::SYSTEM_DATABASE,
        _ => target.database.as_str(),
    };
    Check::connection(auth, timeout, variant.clone(), database)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::report::{FailureKind, Outcome};

    fn check() -> Check {
        Check::connection(
            AuthMethod::SqlLogin,
            Duration::from_secs(15),
            Variant::Standard,
            "sales",
        )
    }

    #[test]
    fn test_success_reports_version() {
        let result = evaluate(
            check(),
            Ok(ServerInfo {
                version: Some("Microsoft SQL Server 2019 (RTM) - 15.0.2000.5 (X64)".into()),
            }),
            Duration::from_millis(250),
        );
        assert_eq!(result.outcome, Outcome::Pass);
        assert!(result.detail.contains("15.0.2000.5"));
        assert_eq!(result.elapsed_ms, Some(250));
    }

    #[test]
    fn test_failure_keeps_error_verbatim() {
        let message = "[Microsoft][ODBC Driver 17 for SQL Server][SQL Server]Login failed for user 'app'.";
        let result = evaluate(
            check(),
            Err(ClientError::diagnostic("28000", 18456, message)),
            Duration::from_millis(80),
        );
        assert_eq!(
            result.outcome,
            Outcome::Fail(FailureKind::AuthenticationFailed)
        );
        assert!(result.detail.contains("[28000] (18456)"));
        assert!(result.detail.contains(message));
    }

    #[test]
    fn test_skipped() {
        let target = TargetConfig::default();
        let result = skipped(
            &target,
            AuthMethod::Trusted,
            Duration::from_secs(5),
            &Variant::Standard,
            "port closed",
        );
        assert_eq!(result.outcome, Outcome::Skip);
        assert_eq!(result.detail, "port closed");
        assert_eq!(result.elapsed_ms, None);
    }

    #[test]
    fn test_system_database_variant_targets_master() {
        let target = TargetConfig {
            database: "sales".into(),
            ..TargetConfig::default()
        };
        let result = skipped(
            &target,
            AuthMethod::SqlLogin,
            Duration::from_secs(30),
            &Variant::SystemDatabase,
            "port closed",
        );
        match result.check {
            Check::Connection { database, .. } => assert_eq!(database, "master"),
            _ => panic!("expected connection check"),
        }
    }
}
