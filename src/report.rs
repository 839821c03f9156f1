use crate::config::{AuthMethod, TargetSummary, Variant};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

/// Why a probe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NetworkUnreachable,
    PortRefused,
    PortTimedOut,
    DriverMissing,
    AuthenticationFailed,
    ConnectionTimedOut,
    /// Raw client library error that matched no other kind
    UnknownClientError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NetworkUnreachable => "network unreachable",
            Self::PortRefused => "port refused",
            Self::PortTimedOut => "port timed out",
            Self::DriverMissing => "driver missing",
            Self::AuthenticationFailed => "authentication failed",
            Self::ConnectionTimedOut => "connection timed out",
            Self::UnknownClientError => "client error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "kind")]
pub enum Outcome {
    Pass,
    Fail(FailureKind),
    Skip,
    /// The probe mechanism itself could not run
    Indeterminate,
}

impl Outcome {
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    #[must_use]
    pub const fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Fail(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Pass or fail, anything that actually exercised the target
    #[must_use]
    pub const fn was_attempted(&self) -> bool {
        matches!(self, Self::Pass | Self::Fail(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail(kind) => write!(f, "FAIL ({kind})"),
            Self::Skip => f.write_str("SKIP"),
            Self::Indeterminate => f.write_str("INDETERMINATE"),
        }
    }
}

/// What a probe looked at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "check")]
pub enum Check {
    Reachability {
        host: String,
    },
    Port {
        host: String,
        port: u16,
    },
    Driver {
        driver: String,
        /// Drivers registered with the driver manager, empty if it could not be queried
        available: Vec<String>,
    },
    Connection {
        auth: AuthMethod,
        timeout_secs: u64,
        variant: Variant,
        database: String,
    },
}

impl Check {
    #[must_use]
    pub fn connection(auth: AuthMethod, timeout: Duration, variant: Variant, database: &str) -> Self {
        Self::Connection {
            auth,
            timeout_secs: timeout.as_secs(),
            variant,
            database: database.to_string(),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachability { host } => write!(f, "reachability {host}"),
            Self::Port { host, port } => write!(f, "port {host}:{port}"),
            Self::Driver { driver, .. } => write!(f, "driver '{driver}'"),
            Self::Connection {
                auth,
                timeout_secs,
                variant: Variant::Standard,
                ..
            } => write!(f, "connection {auth} timeout={timeout_secs}s"),
            Self::Connection {
                auth,
                timeout_secs,
                variant,
                ..
            } => write!(f, "connection {variant} {auth} timeout={timeout_secs}s"),
        }
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub check: Check,
    pub outcome: Outcome,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl CheckResult {
    fn new(check: Check, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            check,
            outcome,
            detail: detail.into(),
            elapsed_ms: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn pass(check: Check, detail: impl Into<String>) -> Self {
        Self::new(check, Outcome::Pass, detail)
    }

    #[must_use]
    pub fn fail(check: Check, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::new(check, Outcome::Fail(kind), detail)
    }

    #[must_use]
    pub fn skip(check: Check, detail: impl Into<String>) -> Self {
        Self::new(check, Outcome::Skip, detail)
    }

    #[must_use]
    pub fn indeterminate(check: Check, detail: impl Into<String>) -> Self {
        Self::new(check, Outcome::Indeterminate, detail)
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.outcome, self.check, self.detail)?;
        if let Some(ms) = self.elapsed_ms {
            write!(f, " ({ms} ms)")?;
        }
        Ok(())
    }
}

/// Everything a run produced, in pipeline order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub target: TargetSummary,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
    pub recommendations: Vec<String>,
}

impl DiagnosticReport {
    /// Results of connection probes, matrix and variants alike
    pub fn connection_results(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.check, Check::Connection { .. }))
    }

    /// Human readable summary, one entry per line
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.results.len() + self.recommendations.len() + 4);
        lines.push(format!(
            "DIAGNOSIS SUMMARY for {}:{} database '{}' ({} -> {})",
            self.target.host,
            self.target.port,
            self.target.database,
            self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.finished_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
        for result in &self.results {
            lines.push(format!("  {:<14} {}", result.outcome.to_string(), result.check));
        }
        lines.push("RECOMMENDATIONS:".to_string());
        for (i, recommendation) in self.recommendations.iter().enumerate() {
            lines.push(format!("  {}. {recommendation}", i + 1));
        }
        lines
    }
}
