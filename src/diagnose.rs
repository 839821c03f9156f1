use crate::{
    client::SystemClient,
    config::{Plan, TargetConfig},
    probes::SystemTransport,
    report::DiagnosticReport,
    runner::Runner,
};
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use tracing::info;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Run the whole diagnostic once and present the report
///
/// Findings are never errors; this only fails if the report cannot be serialized.
///
/// # Errors
///
/// Returns an error if JSON output was requested and serialization fails
pub async fn start(
    target: &TargetConfig,
    plan: &Plan,
    log_file: &Path,
    json: bool,
) -> anyhow::Result<()> {
    info!("{RULE}");
    info!(
        "Starting SQL Server connection diagnostics at {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    info!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!(
        "target {}:{} database '{}' user '{}' driver '{}'",
        target.host, target.port, target.database, target.username, target.driver
    );
    info!("log file: {}", log_file.display());
    info!("{THIN_RULE}");

    let transport = SystemTransport;
    let client = SystemClient::new();
    let report = Runner::new(target, plan, &transport, &client).run().await;

    present(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Log the summary and the numbered recommendations
pub fn present(report: &DiagnosticReport) {
    info!("{RULE}");
    let mut lines = report.summary_lines().into_iter();
    if let Some(header) = lines.next() {
        info!("{header}");
    }
    info!("{THIN_RULE}");
    for line in lines {
        info!("{line}");
    }
    info!("{RULE}");
}
