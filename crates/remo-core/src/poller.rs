//! Polling controller: fetch on a fixed timer, fall back to synthetic data.
//!
//! # State Machine
//!
//! Every cycle goes `Loading → Success | Degraded`. A degraded cycle still
//! publishes displayable synthetic rooms; it only differs in the advisory
//! `error` (set when the live attempt failed, absent when no credential is
//! configured).
//!
//! # Observability
//!
//! State lives in a [`tokio::sync::watch`] channel. The controller is the only
//! writer; any number of readers can [`subscribe`](PollingController::subscribe).
//! The result of a cycle is committed in a single `send_modify`, so readers
//! never see half of an update.
//!
//! # Concurrency
//!
//! Timer cycles are spawned on every tick, so a slow acquisition never delays
//! the next one. A manual [`refresh`](PollingController::refresh) may overlap
//! them too. Overlapping cycles all run to completion and the later commit
//! wins. `is_loading` stays set while any cycle is in flight, and clears once
//! the last one commits or is abandoned.
//!
//! # Shutdown
//!
//! [`dispose`](PollingController::dispose) cancels the timer task and waits for
//! it and its cycles to exit. A cycle that is still waiting on the network when the
//! controller is disposed is dropped without touching state, and no cycle
//! starts afterwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use remo_types::RoomData;

use crate::feed::{Fetch, RoomFeed};
use crate::synthetic::SyntheticGenerator;

/// Default polling period (5 minutes).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No cycle has run yet.
    #[default]
    Idle,
    /// A cycle is in flight.
    Loading,
    /// The last cycle returned live data.
    Success,
    /// The last cycle fell back to synthetic data.
    Degraded,
}

/// Origin of the rooms currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Nothing fetched yet.
    #[default]
    None,
    /// From the provider.
    Live,
    /// From [`SyntheticGenerator`].
    Synthetic,
}

/// Observable controller state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Rooms to display.
    pub room_data: Vec<RoomData>,
    /// Whether any cycle is in flight.
    pub is_loading: bool,
    /// Advisory message from the last failed cycle.
    pub error: Option<String>,
    /// Completion time of the last cycle that did not fail.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_fetched: Option<OffsetDateTime>,
    /// Completion time of the last cycle, whatever its outcome.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Current phase.
    pub phase: Phase,
    /// Origin of `room_data`.
    pub source: DataSource,
    /// Number of cycles committed so far.
    pub completed_cycles: u64,
}

/// Options for [`PollingController`].
#[derive(Debug, Clone)]
pub struct PollerOptions {
    interval: Duration,
    generator: SyntheticGenerator,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            generator: SyntheticGenerator::default(),
        }
    }
}

impl PollerOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timer period. Zero is replaced by the default.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Set the fallback generator.
    #[must_use]
    pub fn generator(mut self, generator: SyntheticGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Timer period. Never zero.
    pub fn period(&self) -> Duration {
        self.interval
    }
}

struct Inner {
    feed: Arc<dyn RoomFeed>,
    generator: SyntheticGenerator,
    period: Duration,
    state_tx: watch::Sender<Snapshot>,
    in_flight: AtomicUsize,
    cancel_token: CancellationToken,
}

/// Tracks one running cycle in the in-flight count.
///
/// A cycle dropped before committing (timed out, or its caller went away)
/// leaves through `Drop`. If it was the last one running, the loading state
/// is cleared so readers are not stuck waiting for the next tick.
struct InFlight<'a> {
    inner: &'a Inner,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn enter(inner: &'a Inner) -> Self {
        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        inner.state_tx.send_modify(|state| {
            state.is_loading = true;
            state.phase = Phase::Loading;
        });
        Self {
            inner,
            finished: false,
        }
    }

    /// Leave and return how many other cycles are still running.
    fn finish(mut self) -> usize {
        self.finished = true;
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) - 1
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.inner.cancel_token.is_cancelled() {
            return;
        }

        // Re-checked under the channel lock so a cycle entering concurrently
        // keeps its loading flag.
        let in_flight = &self.inner.in_flight;
        let cleared = self.inner.state_tx.send_if_modified(|state| {
            if in_flight.load(Ordering::SeqCst) > 0 || !state.is_loading {
                return false;
            }
            state.is_loading = false;
            state.phase = settled_phase(state);
            true
        });
        if cleared {
            debug!("Cycle abandoned before completion, leaving loading state");
        }
    }
}

/// Phase implied by the last committed cycle.
fn settled_phase(state: &Snapshot) -> Phase {
    match state.source {
        _ if state.completed_cycles == 0 => Phase::Idle,
        DataSource::Live => Phase::Success,
        DataSource::Synthetic | DataSource::None => Phase::Degraded,
    }
}

impl Inner {
    async fn run_cycle(&self) {
        if self.cancel_token.is_cancelled() {
            return;
        }

        let in_flight = InFlight::enter(self);

        let fetch = self.feed.fetch().await;
        let now = OffsetDateTime::now_utc();

        let (rooms, error, phase, source) = match fetch {
            Fetch::Live(rooms) => {
                debug!("Fetched {} room(s) from the API", rooms.len());
                (rooms, None, Phase::Success, DataSource::Live)
            }
            Fetch::Unconfigured => {
                debug!("Using synthetic data (API token not configured)");
                (
                    self.generator.current_readings(),
                    None,
                    Phase::Degraded,
                    DataSource::Synthetic,
                )
            }
            Fetch::Failed(message) => {
                debug!("Live fetch failed, using synthetic data: {}", message);
                (
                    self.generator.current_readings(),
                    Some(message),
                    Phase::Degraded,
                    DataSource::Synthetic,
                )
            }
        };

        if self.cancel_token.is_cancelled() {
            debug!("Controller disposed during fetch, discarding result");
            return;
        }

        let still_running = in_flight.finish();
        let stamp_fetched = error.is_none();
        self.state_tx.send_modify(|state| {
            state.room_data = rooms;
            state.error = error;
            state.source = source;
            if stamp_fetched {
                state.last_fetched = Some(now);
            }
            state.completed_at = Some(now);
            state.completed_cycles += 1;
            state.is_loading = still_running > 0;
            state.phase = if still_running > 0 {
                Phase::Loading
            } else {
                phase
            };
        });
    }
}

/// Runs acquisition cycles on a timer and on demand.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use remo_core::{Credential, DirectFeed, PollerOptions, PollingController, SensorClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Arc::new(SensorClient::new(remo_core::client::DEFAULT_BASE_URL)?);
/// let feed = Arc::new(DirectFeed::new(client, Credential::from_env()));
///
/// let controller = PollingController::new(feed, PollerOptions::default());
/// controller.start().await;
///
/// let snapshot = controller.refresh().await;
/// println!("{} rooms", snapshot.room_data.len());
///
/// controller.dispose().await;
/// # Ok(())
/// # }
/// ```
pub struct PollingController {
    inner: Arc<Inner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for PollingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingController")
            .field("period", &self.inner.period)
            .field("in_flight", &self.inner.in_flight.load(Ordering::SeqCst))
            .field("disposed", &self.inner.cancel_token.is_cancelled())
            .finish()
    }
}

impl PollingController {
    /// Create an idle controller. Call [`start`](Self::start) to begin polling.
    pub fn new(feed: Arc<dyn RoomFeed>, options: PollerOptions) -> Self {
        let period = if options.interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            options.interval
        };
        let (state_tx, _) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                feed,
                generator: options.generator,
                period,
                state_tx,
                in_flight: AtomicUsize::new(0),
                cancel_token: CancellationToken::new(),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Timer period.
    pub fn interval(&self) -> Duration {
        self.inner.period
    }

    /// Start the timer. The first cycle runs immediately.
    ///
    /// Calling this again while running, or after disposal, does nothing.
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if handle.is_some() || self.inner.cancel_token.is_cancelled() {
            return;
        }

        info!(
            "Starting polling controller (interval: {}s)",
            self.inner.period.as_secs()
        );

        let inner = Arc::clone(&self.inner);
        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval(inner.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let token = inner.cancel_token.clone();
            let cycles = TaskTracker::new();

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Polling timer cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let inner = Arc::clone(&inner);
                        let token = token.clone();
                        cycles.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {}
                                _ = inner.run_cycle() => {}
                            }
                        });
                    }
                }
            }

            cycles.close();
            cycles.wait().await;
        }));
    }

    /// Run one cycle now and return the resulting state.
    ///
    /// Works whether or not the timer is running and whether or not another
    /// cycle is in flight. After disposal it returns the last state unchanged.
    pub async fn refresh(&self) -> Snapshot {
        self.inner.run_cycle().await;
        self.snapshot()
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.state_tx.subscribe()
    }

    /// Whether the timer task is alive.
    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.cancel_token.is_cancelled()
    }

    /// Stop the timer and wait for it and its cycles to exit. No state changes
    /// afterwards.
    pub async fn dispose(&self) {
        self.inner.cancel_token.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("Polling controller disposed");
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.inner.cancel_token.cancel();
    }
}
