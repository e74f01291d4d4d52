//! Periodic refresh timer.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::refresh::{RefreshCoordinator, RefreshTrigger, TriggerOutcome};

/// Spawns the background loop that fires a refresh trigger every period.
///
/// Ticks never queue up behind a slow fetch: a tick that lands while a
/// refresh is still running is coalesced by the coordinator, and missed ticks
/// are delayed rather than replayed.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// First tick fires one `period` after spawning; the startup refresh is
    /// the caller's job.
    pub fn spawn(coordinator: RefreshCoordinator, period: Duration) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "periodic refresh started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("periodic refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match coordinator.trigger(RefreshTrigger::Timer) {
                            TriggerOutcome::Started => debug!("timer refresh started"),
                            TriggerOutcome::Coalesced => debug!("timer refresh coalesced"),
                        }
                    }
                }
            }
        });

        SchedulerHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Owner of the timer task. Dropping the handle also stops the timer.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the timer and wait for its loop to exit. A refresh already
    /// spawned by the timer runs to completion on its own.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}
