mod run;

use crate::config::{Plan, TargetConfig};
use std::path::{Path, PathBuf};

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Diagnose {
        target: TargetConfig,
        plan: Plan,
        log_file: PathBuf,
        json: bool,
    },
}

impl Action {
    /// Where the transcript of this action is logged
    #[must_use]
    pub fn log_file(&self) -> &Path {
        match self {
            Self::Diagnose { log_file, .. } => log_file,
        }
    }

    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
