use std::future::Future;

use serde::Serialize;
use tracing::{info, warn};

use stocksnap_core::{CacheStats, StockService};

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct WatchResponseData {
    periods: u32,
    interrupted: bool,
    stats: CacheStats,
}

pub async fn run(args: &WatchArgs, service: &StockService) -> Result<CommandResult, CliError> {
    watch_until(args, service, ctrl_c()).await
}

async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
    }
}

/// Warm up, then report status every period until `shutdown` resolves or the
/// iteration limit is reached. `shutdown` also interrupts the warm-up.
async fn watch_until<F>(
    args: &WatchArgs,
    service: &StockService,
    shutdown: F,
) -> Result<CommandResult, CliError>
where
    F: Future<Output = ()>,
{
    if args.iterations == Some(0) {
        return Err(CliError::Command(String::from(
            "--iterations must be greater than zero",
        )));
    }

    tokio::pin!(shutdown);

    let started = tokio::select! {
        started = service.start() => Some(started),
        () = &mut shutdown => None,
    };

    let period = service.refresh_config().period;
    let mut periods = 0_u32;
    let mut interrupted = false;

    match started {
        None => {
            info!("interrupted during warm-up");
            interrupted = true;
        }
        Some((outcome, scheduler)) => {
            if !outcome.is_installed() {
                warn!(?outcome, "starting without a warm snapshot");
            }

            loop {
                tokio::select! {
                    () = &mut shutdown => {
                        interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(period) => {
                        periods += 1;
                        let stats = service.cache_stats().await;
                        info!(
                            period = periods,
                            records = stats.store.record_count,
                            fresh = stats.store.fresh,
                            age_seconds = stats.store.age_seconds,
                            refreshing = stats.refreshing,
                            succeeded = stats.refreshes.succeeded,
                            failed = stats.refreshes.failed,
                            "snapshot status"
                        );
                        if args.iterations.is_some_and(|limit| periods >= limit) {
                            break;
                        }
                    }
                }
            }

            scheduler.shutdown().await;
        }
    }

    service.coordinator().wait_idle().await;

    let stats = service.cache_stats().await;
    let data = serde_json::to_value(WatchResponseData {
        periods,
        interrupted,
        stats,
    })?;

    Ok(CommandResult::ok(data))
}
