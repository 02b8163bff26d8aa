//! Debounced station search.
//!
//! Keystrokes are submitted to a [`StationSearch`] session. A request is
//! only sent once the query has been stable for the debounce period, and a
//! response is only applied if no newer query was submitted in the meantime
//! (last query wins, not first response).
//!
//! Every submitted query bumps a generation counter stored alongside the
//! published results. Pending timers and in-flight requests compare their
//! generation against it before touching state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::Station;
use crate::mvg::{MvgError, TransitApi};
use crate::notify::{Notification, Notifier};

/// Default quiet period before a query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where the results are shown, which decides cap and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Pin picker: every location kind, at most 10.
    Panel,
    /// Station dropdown: stations only, at most 20.
    Dropdown,
}

impl SearchScope {
    pub fn limit(self) -> usize {
        match self {
            SearchScope::Panel => 10,
            SearchScope::Dropdown => 20,
        }
    }

    pub fn accepts(self, station: &Station) -> bool {
        match self {
            SearchScope::Panel => true,
            SearchScope::Dropdown => station.is_station(),
        }
    }

    fn failure(self, err: &MvgError) -> Notification {
        match self {
            SearchScope::Panel => {
                Notification::failure("Search failed", "Unable to search for stations")
            }
            SearchScope::Dropdown => {
                Notification::failure("Failed to search stations", err.to_string())
            }
        }
    }
}

/// Configuration for search sessions.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period before a query is sent.
    pub debounce: Duration,
}

impl SearchConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Fetch, filter and cap results for one query. No debounce, no reporting.
///
/// Blank queries return an empty list without a request. Sessions call
/// this once the query has settled.
pub async fn fetch<A: TransitApi>(
    api: &A,
    scope: SearchScope,
    query: &str,
) -> Result<Vec<Station>, MvgError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let stations = api.locations(query).await?;
    Ok(stations
        .into_iter()
        .filter(|s| scope.accepts(s))
        .take(scope.limit())
        .collect())
}

/// Published state of a search session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    /// Id of the latest submitted query.
    pub generation: u64,
    /// Text of the latest submitted query.
    pub query: String,
    /// Results for `query` once applied; the previous results while loading.
    pub stations: Vec<Station>,
    /// A request for `query` is pending or in flight.
    pub loading: bool,
}

impl SearchResults {
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// A debounced search session with last-query-wins semantics.
pub struct StationSearch<A> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    scope: SearchScope,
    config: SearchConfig,
    state: Arc<watch::Sender<SearchResults>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<A: TransitApi> StationSearch<A> {
    pub fn new(
        api: Arc<A>,
        notifier: Arc<dyn Notifier>,
        scope: SearchScope,
        config: SearchConfig,
    ) -> Self {
        let (state, _) = watch::channel(SearchResults::default());
        Self {
            api,
            notifier,
            scope,
            config,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Observe result changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.state.subscribe()
    }

    /// Latest published results.
    pub fn current(&self) -> SearchResults {
        self.state.borrow().clone()
    }

    /// Submit the latest text of the search box.
    ///
    /// Supersedes any pending or in-flight query. Must be called from
    /// within a Tokio runtime.
    pub fn submit(&self, query: &str) {
        self.cancel_pending();

        let blank = query.trim().is_empty();
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.query = query.to_string();
            s.loading = !blank;
            if blank {
                s.stations.clear();
            }
        });

        if blank {
            trace!(generation, "blank query; cleared results");
            return;
        }

        let api = Arc::clone(&self.api);
        let notifier = Arc::clone(&self.notifier);
        let state = Arc::clone(&self.state);
        let scope = self.scope;
        let debounce = self.config.debounce;
        let query = query.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if state.borrow().generation != generation {
                return;
            }

            let result = fetch(api.as_ref(), scope, &query).await;

            let mut failure = None;
            let applied = state.send_if_modified(|s| {
                if s.generation != generation {
                    return false;
                }
                s.loading = false;
                match result {
                    Ok(stations) => s.stations = stations,
                    Err(e) => {
                        s.stations.clear();
                        failure = Some(e);
                    }
                }
                true
            });

            if !applied {
                debug!(generation, %query, "discarding superseded search response");
                return;
            }

            if let Some(e) = failure {
                debug!(%query, error = %e, "station search failed");
                notifier.notify(scope.failure(&e));
            }
        });

        if let Ok(mut task) = self.task.lock() {
            *task = Some(handle);
        }
    }

    /// Cancel any pending timer and in-flight request. Nothing further is
    /// published for earlier queries.
    ///
    /// Settled results stay as they are. If a query was still pending, its
    /// text is dropped together with the stale results shown under it.
    pub fn close(&self) {
        self.cancel_pending();
        self.state.send_modify(|s| {
            s.generation += 1;
            if s.loading {
                s.query.clear();
                s.stations.clear();
            }
            s.loading = false;
        });
    }

    fn cancel_pending(&self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
        }
    }
}

impl<A> Drop for StationSearch<A> {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
        }
    }
}
