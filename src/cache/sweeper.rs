//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cache::result_cache::ResultCache;

/// Spawns the periodic sweep of a [`ResultCache`].
pub struct CacheSweeper;

impl CacheSweeper {
    /// Start sweeping `cache` every `interval` on the current tokio runtime.
    ///
    /// The first sweep happens one full interval after start.
    pub fn spawn(cache: Arc<ResultCache>, interval: Duration) -> SweeperHandle {
        let token = CancellationToken::new();
        let child = token.child_token();
        let period = interval.max(Duration::from_millis(1));

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {
                        cache.sweep();
                    }
                }
            }
            log::debug!("cache sweeper stopped");
        });

        log::debug!("cache sweeper started, interval {period:?}");
        SweeperHandle {
            token,
            join: Some(join),
        }
    }
}

/// Owner of a running sweeper. Dropping the handle stops the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Whether the sweeper task is still running.
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }

    /// Stop the sweeper and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                log::warn!("cache sweeper exited abnormally: {e}");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
