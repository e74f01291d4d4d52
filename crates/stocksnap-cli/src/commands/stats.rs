use stocksnap_core::{RefreshOutcome, StockService};

use crate::error::CliError;

use super::CommandResult;

pub async fn run(service: &StockService) -> Result<CommandResult, CliError> {
    let outcome = service
        .coordinator()
        .warm_up(&service.refresh_config().warmup)
        .await;

    let stats = service.cache_stats().await;
    let data = serde_json::to_value(&stats)?;

    let result = CommandResult::ok(data);
    match outcome {
        RefreshOutcome::Failed(error) => {
            Ok(result.with_warning(format!("warm-up failed ({}): {error}", error.code())))
        }
        RefreshOutcome::Installed { pages_failed, .. } if pages_failed > 0 => {
            Ok(result.with_warning(format!("{pages_failed} page(s) failed during warm-up")))
        }
        _ => Ok(result),
    }
}
