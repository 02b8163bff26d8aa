//! Live departure feed for the selected station.
//!
//! Selecting a station starts a poll loop that fetches immediately and then
//! on a fixed interval. Each selection gets a new generation; a response is
//! applied only if its generation is still current, so a slow reply for a
//! station the user has left never reaches the board.
//!
//! State per station:
//!
//! ```text
//! Idle -> Loading -> Ready | Failed -> Loading (next tick / refresh) -> ...
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::domain::{Departure, DepartureSnapshot, PinnedStation, TransportType};
use crate::mvg::{
    DEFAULT_DEPARTURE_LIMIT, DEFAULT_OFFSET_MINUTES, DepartureQuery, ErrorKind, MvgError,
    TransitApi,
};
use crate::notify::{Notification, Notifier};

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for the departure feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Time between polls, measured from selection.
    pub poll_interval: Duration,

    /// Maximum departures requested.
    pub limit: u32,

    /// Minutes to look ahead of now.
    pub offset_minutes: u32,

    /// Modes requested.
    pub transport_types: Vec<TransportType>,
}

impl FeedConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The request for a station.
    pub fn query(&self, station: &PinnedStation) -> DepartureQuery {
        DepartureQuery {
            global_id: station.global_id.clone(),
            limit: self.limit,
            transport_types: self.transport_types.clone(),
            offset_minutes: self.offset_minutes,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            limit: DEFAULT_DEPARTURE_LIMIT,
            offset_minutes: DEFAULT_OFFSET_MINUTES,
            transport_types: TransportType::REQUESTED.to_vec(),
        }
    }
}

/// Where the feed is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FeedState {
    Idle,
    Loading,
    Ready,
    Failed { error: ErrorKind },
}

/// Published state of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    /// Id of the current selection.
    pub generation: u64,
    /// Selected station, if any.
    pub station: Option<PinnedStation>,
    pub state: FeedState,
    /// Latest snapshot for `station`. `None` until the first poll for it
    /// completes; empty after a failed poll.
    pub snapshot: Option<Arc<DepartureSnapshot>>,
}

impl FeedView {
    fn idle() -> Self {
        Self {
            generation: 0,
            station: None,
            state: FeedState::Idle,
            snapshot: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == FeedState::Loading
    }

    /// Departures to display, empty when there is no snapshot.
    pub fn departures(&self) -> &[Departure] {
        self.snapshot
            .as_deref()
            .map(|s| &s.departures[..])
            .unwrap_or(&[])
    }
}

struct PollTask {
    handle: JoinHandle<()>,
    refresh: Arc<Notify>,
}

/// Polls departures for the selected station.
pub struct DepartureFeed<A> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    config: FeedConfig,
    state: Arc<watch::Sender<FeedView>>,
    task: Mutex<Option<PollTask>>,
}

impl<A: TransitApi> DepartureFeed<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, config: FeedConfig) -> Self {
        let (state, _) = watch::channel(FeedView::idle());
        Self {
            api,
            notifier,
            config,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    /// Observe feed changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.state.subscribe()
    }

    pub fn current(&self) -> FeedView {
        self.state.borrow().clone()
    }

    /// Make `station` the active one.
    ///
    /// Cancels the previous station's poll loop, clears the board and
    /// starts polling immediately. The interval's phase restarts from now.
    /// Must be called from within a Tokio runtime.
    pub fn select(&self, station: PinnedStation) {
        self.cancel();

        let mut generation = 0;
        self.state.send_modify(|v| {
            v.generation += 1;
            generation = v.generation;
            v.station = Some(station.clone());
            v.state = FeedState::Loading;
            v.snapshot = None;
        });
        info!(station = %station.global_id, name = %station.name, generation, "station selected");

        let refresh = Arc::new(Notify::new());
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.api),
            Arc::clone(&self.notifier),
            Arc::clone(&self.state),
            self.config.clone(),
            Arc::clone(&refresh),
            station,
            generation,
        ));

        if let Ok(mut task) = self.task.lock() {
            *task = Some(PollTask { handle, refresh });
        }
    }

    /// Poll now, in addition to the regular interval. No-op when idle.
    pub fn refresh(&self) {
        if let Ok(task) = self.task.lock()
            && let Some(task) = task.as_ref()
        {
            task.refresh.notify_one();
        }
    }

    /// Stop polling and return to idle with nothing selected.
    pub fn stop(&self) {
        self.cancel();
        self.state.send_modify(|v| {
            v.generation += 1;
            v.station = None;
            v.state = FeedState::Idle;
            v.snapshot = None;
        });
    }

    fn cancel(&self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(task) = task.take()
        {
            task.handle.abort();
        }
    }
}

impl<A> Drop for DepartureFeed<A> {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(task) = task.take()
        {
            task.handle.abort();
        }
    }
}

async fn poll_loop<A: TransitApi>(
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<FeedView>>,
    config: FeedConfig,
    refresh: Arc<Notify>,
    station: PinnedStation,
    generation: u64,
) {
    let query = config.query(&station);
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = refresh.notified() => debug!(generation, "manual refresh"),
        }

        if !mark_loading(&state, generation) {
            return;
        }

        let result = api.departures(&query).await;
        let failure = match &result {
            Err(e) => Some(failure_notification(e)),
            Ok(_) => None,
        };

        if !apply_result(&state, generation, &station, result) {
            debug!(generation, station = %station.global_id, "discarding superseded departures");
            return;
        }

        if let Some(notification) = failure {
            notifier.notify(notification);
        }
    }
}

fn failure_notification(err: &MvgError) -> Notification {
    Notification::failure("Failed to load departures", err.to_string())
}

/// Enter `Loading` if `generation` is current. Keeps the visible snapshot.
fn mark_loading(state: &watch::Sender<FeedView>, generation: u64) -> bool {
    let mut current = false;
    state.send_if_modified(|v| {
        current = v.generation == generation;
        if current && v.state != FeedState::Loading {
            v.state = FeedState::Loading;
            return true;
        }
        false
    });
    current
}

/// Publish a poll result if `generation` is current.
///
/// Success replaces the snapshot wholesale; failure clears it. Returns
/// whether the result was applied.
fn apply_result(
    state: &watch::Sender<FeedView>,
    generation: u64,
    station: &PinnedStation,
    result: Result<Vec<Departure>, MvgError>,
) -> bool {
    state.send_if_modified(|v| {
        if v.generation != generation {
            return false;
        }

        let now = Utc::now();
        match result {
            Ok(departures) => {
                debug!(count = departures.len(), "departures updated");
                v.state = FeedState::Ready;
                v.snapshot = Some(Arc::new(DepartureSnapshot::new(
                    station.global_id.clone(),
                    now,
                    departures,
                )));
            }
            Err(e) => {
                debug!(error = %e, "departure poll failed");
                v.state = FeedState::Failed { error: e.kind() };
                v.snapshot = Some(Arc::new(DepartureSnapshot::empty(
                    station.global_id.clone(),
                    now,
                )));
            }
        }
        true
    })
}
