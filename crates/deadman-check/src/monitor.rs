//! The check loop: one cycle now and one on every tick after.
//!
//! Ticks are fixed-rate and not aligned to cycle completion. Every cycle
//! runs in its own task, so a cycle that overruns the interval overlaps
//! with the next one instead of delaying it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::checker::HealthCheck;

/// Run `check` immediately and then once per interval until `shutdown`
/// flips or its sender is dropped.
///
/// Cycles still in flight at shutdown are left to finish on their own.
pub async fn run_check_loop(check: Arc<HealthCheck>, mut shutdown: watch::Receiver<bool>) {
    let interval = check.config().interval;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let in_flight = Arc::new(AtomicUsize::new(0));
    let mut cycle: u64 = 0;

    info!(
        check_uuid = %check.config().check_uuid,
        prometheus = %check.config().prometheus_base_url,
        interval = ?interval,
        timeout = ?check.config().timeout,
        "check loop started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cycle += 1;
                let running = in_flight.fetch_add(1, Ordering::SeqCst);
                if running > 0 {
                    warn!(cycle, running, "previous cycle still running, cycles overlap");
                }

                let check = Arc::clone(&check);
                let in_flight = Arc::clone(&in_flight);
                tokio::spawn(async move {
                    let outcome = check.check().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    debug!(cycle, success = outcome.is_success(), "cycle finished");
                });
            }
            _ = shutdown.changed() => {
                info!("check loop shutting down");
                break;
            }
        }
    }
}
