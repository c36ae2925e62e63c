//! Background collector.
//!
//! Starts the polling controller and logs the outcome of each committed
//! cycle. Repeated upstream failures are logged as warnings, escalated to an
//! error once, then suppressed until the upstream recovers.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use remo_core::{DataSource, Snapshot};

use crate::state::AppState;

/// Failures logged as warnings before escalating.
const WARN_ATTEMPTS: u32 = 3;

/// Background collector driving the polling controller.
pub struct Collector {
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Start polling and spawn the outcome logger.
    ///
    /// Returns immediately; the first cycle runs in the background.
    pub async fn start(&self) -> JoinHandle<()> {
        let controller = &self.state.controller;
        let configured = self.state.config.credential().is_some();

        info!(
            "Starting collector (interval: {}s, live data: {})",
            controller.interval().as_secs(),
            if configured { "enabled" } else { "no API token" }
        );

        let rx = controller.subscribe();
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(log_outcomes(rx, cancel));

        controller.start().await;
        handle
    }

    /// Stop polling and the outcome logger.
    pub async fn stop(&self) {
        self.cancel.cancel();
        self.state.controller.dispose().await;
        info!("Collector stopped");
    }
}

async fn log_outcomes(mut rx: watch::Receiver<Snapshot>, cancel: CancellationToken) {
    let mut tracker = FailureTracker::default();
    let mut seen_cycles = rx.borrow().completed_cycles;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if snapshot.completed_cycles == seen_cycles {
                    continue;
                }
                seen_cycles = snapshot.completed_cycles;
                log_snapshot(&mut tracker, &snapshot);
            }
        }
    }
}

fn log_snapshot(tracker: &mut FailureTracker, snapshot: &Snapshot) {
    match tracker.record(snapshot.error.as_deref()) {
        Escalation::Healthy => match snapshot.source {
            DataSource::Live => debug!("Fetched {} live room(s)", snapshot.room_data.len()),
            _ => debug!("No API token configured, serving synthetic readings"),
        },
        Escalation::Recovered(failures) => {
            info!("Upstream recovered after {} failed cycle(s)", failures)
        }
        Escalation::Warn(attempt) => warn!(
            "Failed to fetch rooms: {} (attempt {})",
            snapshot.error.as_deref().unwrap_or_default(),
            attempt
        ),
        Escalation::Error(attempt) => error!(
            "Failed to fetch rooms after {} attempts, will continue trying silently",
            attempt
        ),
        Escalation::Silent => {}
    }
}

/// How loudly to report a cycle outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Succeeded, and the previous cycle did too.
    Healthy,
    /// Succeeded after the given number of failures.
    Recovered(u32),
    /// Failed; attempt number within the warning window.
    Warn(u32),
    /// Failed for the first time past the warning window.
    Error(u32),
    /// Failed again; already reported.
    Silent,
}

/// Counts consecutive failed cycles.
#[derive(Debug, Default)]
pub struct FailureTracker {
    consecutive_failures: u32,
}

impl FailureTracker {
    /// Record one cycle outcome. `error` is the cycle's advisory message.
    pub fn record(&mut self, error: Option<&str>) -> Escalation {
        if error.is_none() {
            let failures = std::mem::take(&mut self.consecutive_failures);
            return if failures == 0 {
                Escalation::Healthy
            } else {
                Escalation::Recovered(failures)
            };
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        match self.consecutive_failures {
            n if n <= WARN_ATTEMPTS => Escalation::Warn(n),
            n if n == WARN_ATTEMPTS + 1 => Escalation::Error(n),
            _ => Escalation::Silent,
        }
    }

    /// Current run of failed cycles.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
