use super::Action;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Diagnose {
            target,
            plan,
            log_file,
            json,
        } => crate::diagnose::start(&target, &plan, &log_file, json).await,
    }
}
