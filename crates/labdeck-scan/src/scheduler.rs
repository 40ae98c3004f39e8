//! Recurring scan scheduling.
//!
//! Holds zero or one active scan job. Applying a new configuration
//! always replaces the previous job: the old job's cancellation token
//! is cancelled, which stops it before its next tick. A tick that is
//! already running its discovery completes normally; cancellation never
//! aborts in-flight work.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use labdeck_core::types::ScheduleState;
use labdeck_store::DiscoveryCache;

use crate::discovery::{run_discovery, DiscoveryEngine};

/// Singleton scheduler for recurring subnet scans.
pub struct ScanScheduler {
    engine: Arc<DiscoveryEngine>,
    cache: Arc<DiscoveryCache>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: ScheduleState,
    job: Option<ScheduledJob>,
}

struct ScheduledJob {
    cancel: CancellationToken,
}

impl ScanScheduler {
    pub fn new(engine: Arc<DiscoveryEngine>, cache: Arc<DiscoveryCache>) -> Self {
        Self {
            engine,
            cache,
            inner: Mutex::new(Inner {
                state: ScheduleState::default(),
                job: None,
            }),
        }
    }

    /// Replace the schedule with `cfg`.
    ///
    /// Cancels any existing job, then spawns a new one when the config
    /// enables scanning with a positive interval. The job captures a
    /// snapshot of the config; later `apply` calls never mutate a
    /// running job, they replace it.
    pub fn apply(&self, cfg: ScheduleState) {
        let mut inner = self.inner.lock().expect("Scheduler lock poisoned");

        if let Some(job) = inner.job.take() {
            job.cancel.cancel();
        }

        let spawn = cfg.enabled && cfg.interval_min > 0;
        tracing::info!(
            enabled = cfg.enabled,
            subnet = %cfg.subnet,
            interval_min = cfg.interval_min,
            top_ports = cfg.top_ports,
            active = spawn,
            "Schedule applied"
        );

        if spawn {
            let cancel = CancellationToken::new();
            tokio::spawn(run_scan_loop(
                self.engine.clone(),
                self.cache.clone(),
                cfg.clone(),
                cancel.clone(),
            ));
            inner.job = Some(ScheduledJob { cancel });
        }

        inner.state = cfg;
    }

    /// Snapshot of the current schedule configuration.
    pub fn schedule(&self) -> ScheduleState {
        self.inner.lock().expect("Scheduler lock poisoned").state.clone()
    }
}

/// Periodic scan loop. The first run fires one full interval after the
/// job starts; ticks missed while a scan is still running are skipped
/// rather than bursted.
async fn run_scan_loop(
    engine: Arc<DiscoveryEngine>,
    cache: Arc<DiscoveryCache>,
    cfg: ScheduleState,
    cancel: CancellationToken,
) {
    let period = tokio::time::Duration::from_secs(cfg.interval_min.saturating_mul(60));
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(subnet = %cfg.subnet, "Scheduled scan job stopped");
                break;
            }
            _ = ticker.tick() => {
                tracing::info!(subnet = %cfg.subnet, top_ports = cfg.top_ports, "Scheduled scan triggered");
                if let Err(e) = run_discovery(&engine, &cache, &cfg.subnet, cfg.top_ports).await {
                    tracing::error!(subnet = %cfg.subnet, error = %e, "Scheduled scan failed");
                }
            }
        }
    }
}
