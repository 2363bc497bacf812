use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::engine::MatchEngine;

/// Spawn the periodic pending-match expiry sweep
///
/// Returns `None` when `interval_secs` is 0. Failures are logged and the
/// next tick retries.
pub fn spawn_expiry_sweep(engine: MatchEngine, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Match expiry sweep disabled");
        return None;
    }

    tracing::info!("Match expiry sweep every {}s", interval_secs);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = engine.expire_pending(Utc::now()).await {
                tracing::warn!("Match expiry sweep failed: {}", e);
            }
        }
    }))
}
