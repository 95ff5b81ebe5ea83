//! Daily cleanup scheduler.
//!
//! A background task that sleeps until the configured UTC hour, runs the
//! retention cleanup, and repeats. Cleanup errors are logged inside
//! `run_scheduled` and never terminate the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::application::CleanupService;

/// Spawns the daily cleanup task, running at `hour_utc` every day.
pub fn spawn_daily_cleanup(cleanup: Arc<CleanupService>, hour_utc: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(hour_utc, "daily cleanup scheduler started");
        loop {
            let wait = time_until_next_run(Utc::now(), hour_utc);
            tokio::time::sleep(wait).await;
            cleanup.run_scheduled().await;
        }
    })
}

/// Duration from `now` until the next occurrence of `hour_utc:00:00`.
fn time_until_next_run(now: DateTime<Utc>, hour_utc: u32) -> Duration {
    let today_run = now
        .date_naive()
        .and_hms_opt(hour_utc, 0, 0)
        .map(|naive| naive.and_utc());

    match today_run {
        Some(run) if run > now => (run - now).to_std().unwrap_or(Duration::from_secs(0)),
        Some(run) => {
            let next = run + chrono::Duration::days(1);
            (next - now).to_std().unwrap_or(Duration::from_secs(0))
        }
        // Unreachable for validated config (hour <= 23); fall back to a day.
        None => Duration::from_secs(24 * 60 * 60),
    }
}
