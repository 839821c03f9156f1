use super::{commands, dispatch};
use crate::telemetry;
use anyhow::Result;

/// Main orchestrator - Pure orchestration with no business logic
///
/// Four-step data flow:
/// 1. Parse: Extract CLI arguments
/// 2. Dispatch: Convert `ArgMatches` into typed Action enum
/// 3. Initialize Telemetry: console and log file sinks
/// 4. Execute: Run the action's business logic
///
/// # Errors
///
/// Returns an error if any step in the flow fails
pub async fn start() -> Result<()> {
    // 1. Parse: Extract CLI arguments
    let matches = commands::new().get_matches();

    // 2. Dispatch: Convert ArgMatches into typed Action enum
    let action = dispatch::dispatch(&matches)?;

    // 3. Initialize Telemetry: the log file is the tool's product, fail if it cannot be written
    telemetry::init(action.log_file())?;

    // 4. Execute: Run the action's business logic
    action.execute().await?;

    Ok(())
}
