//! Drives engine timers and the periodic sweep from wall-clock time

use crate::state::AppState;
use chrono::Utc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Tick the engine every `period` until the runtime shuts down
pub fn spawn(state: AppState, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = state.engine.lock().await.tick(now_millis());
            if report.confirmation_timeouts + report.wait_timeouts + report.sweep_matches > 0 {
                debug!(
                    confirmation_timeouts = report.confirmation_timeouts,
                    wait_timeouts = report.wait_timeouts,
                    sweep_matches = report.sweep_matches,
                    "Engine tick"
                );
            }
        }
    })
}
