//! Tick scheduler
//!
//! Runs the engine tick on a fixed interval until cancelled. The interval
//! skips missed ticks instead of bursting to catch up, so a slow tick never
//! queues a backlog behind itself.

use crate::ports::store::DiscussionStore;
use crate::use_cases::tick::EngineTick;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Drive `tick` every `period` until the token is cancelled
pub async fn run_scheduler<S: DiscussionStore + 'static>(
    tick: EngineTick<S>,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("scheduler shutting down");
                return;
            }
            _ = timer.tick() => {
                match tick.tick().await {
                    Ok(summary) => {
                        if summary.rounds_expired + summary.windows_closed + summary.archived > 0 {
                            debug!(?summary, "tick applied transitions");
                        }
                    }
                    Err(err) => error!(error = %err, "tick failed"),
                }
            }
        }
    }
}
