//! Controller wiring search, resolution, pins and the departure feed.
//!
//! User actions arrive as [`Intent`]s. The app owns the resolver state and
//! publishes the station catalog on a watch channel; the departure board is
//! read from the feed on demand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use chrono_tz::Europe::Berlin;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::board::BoardView;
use crate::domain::{GlobalId, PinnedStation};
use crate::feed::{DepartureFeed, FeedConfig, FeedView};
use crate::mvg::{MvgError, TransitApi};
use crate::notify::{Notification, Notifier};
use crate::pins::{PinError, PinSlot, PinStore};
use crate::resolver::{Catalog, StationResolver};
use crate::search::{SearchConfig, SearchResults, SearchScope, StationSearch};

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Pick a station from the catalog.
    SelectStation(GlobalId),
    SetPin(PinSlot, PinnedStation),
    /// Poll the selected station now.
    Refresh,
    /// New text in the station dropdown.
    DropdownQuery(String),
    /// New text in the pin picker's search box.
    PanelQuery(String),
    /// The search view was closed; drop pending and in-flight searches.
    CloseSearch,
}

/// Tunables for the app's components.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub feed: FeedConfig,
    pub search: SearchConfig,
}

pub struct App<A> {
    pins: Arc<dyn PinStore>,
    notifier: Arc<dyn Notifier>,
    resolver: Arc<Mutex<StationResolver>>,
    catalog: Arc<watch::Sender<Catalog>>,
    dropdown: StationSearch<A>,
    panel: StationSearch<A>,
    feed: DepartureFeed<A>,
    sync: Mutex<Option<JoinHandle<()>>>,
}

impl<A: TransitApi> App<A> {
    pub fn new(
        api: Arc<A>,
        pins: Arc<dyn PinStore>,
        notifier: Arc<dyn Notifier>,
        settings: AppSettings,
    ) -> Self {
        let resolver = StationResolver::new(
            Some(pins.get(PinSlot::Home)),
            Some(pins.get(PinSlot::Work)),
        );
        let (catalog, _) = watch::channel(resolver.catalog());

        let dropdown = StationSearch::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            SearchScope::Dropdown,
            settings.search.clone(),
        );
        let panel = StationSearch::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            SearchScope::Panel,
            settings.search,
        );
        let feed = DepartureFeed::new(api, Arc::clone(&notifier), settings.feed);

        Self {
            pins,
            notifier,
            resolver: Arc::new(Mutex::new(resolver)),
            catalog: Arc::new(catalog),
            dropdown,
            panel,
            feed,
            sync: Mutex::new(None),
        }
    }

    /// Begin following dropdown results and select the home station.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut results = self.dropdown.subscribe();
        let resolver = Arc::clone(&self.resolver);
        let catalog = Arc::clone(&self.catalog);

        let handle = tokio::spawn(async move {
            while results.changed().await.is_ok() {
                let current = results.borrow_and_update().clone();
                apply_search_results(&resolver, &catalog, current);
            }
        });
        if let Ok(mut sync) = self.sync.lock()
            && let Some(old) = sync.replace(handle)
        {
            old.abort();
        }

        let home = self.pins.get(PinSlot::Home);
        info!(station = %home.global_id, name = %home.name, "starting at home station");
        self.feed.select(home);
    }

    /// Apply a user action.
    ///
    /// Only persisting a pin can fail; every other failure is reported
    /// through the notifier.
    pub fn handle(&self, intent: Intent) -> Result<(), PinError> {
        match intent {
            Intent::SelectStation(id) => {
                if let Err(e) = self.select_station(&id) {
                    debug!(error = %e, "ignoring selection");
                }
                Ok(())
            }
            Intent::SetPin(slot, station) => self.set_pin(slot, station),
            Intent::Refresh => {
                self.feed.refresh();
                Ok(())
            }
            Intent::DropdownQuery(query) => {
                self.dropdown.submit(&query);
                Ok(())
            }
            Intent::PanelQuery(query) => {
                self.panel.submit(&query);
                Ok(())
            }
            Intent::CloseSearch => {
                self.panel.close();
                self.dropdown.close();
                Ok(())
            }
        }
    }

    /// Select `id` if the resolver knows it.
    ///
    /// An id in neither the search results nor the pins is `NotFound` and
    /// leaves the current station in place.
    pub fn select_station(&self, id: &GlobalId) -> Result<PinnedStation, MvgError> {
        let resolved = lock(&self.resolver).resolve(id);
        let station = resolved
            .ok_or_else(|| MvgError::NotFound(id.clone()))?
            .to_pinned();
        self.feed.select(station.clone());
        Ok(station)
    }

    /// Persist a pin, then update the catalog and confirm.
    pub fn set_pin(&self, slot: PinSlot, station: PinnedStation) -> Result<(), PinError> {
        if let Err(e) = self.pins.set(slot, station.clone()) {
            warn!(slot = slot.as_str(), error = %e, "failed to save pin");
            self.notifier
                .notify(Notification::failure("Failed to save station", e.to_string()));
            return Err(e);
        }

        {
            let mut resolver = lock(&self.resolver);
            match slot {
                PinSlot::Home => resolver.set_home(Some(station.clone())),
                PinSlot::Work => resolver.set_work(Some(station.clone())),
            }
            self.catalog.send_replace(resolver.catalog());
        }

        info!(slot = slot.as_str(), station = %station.global_id, "pin updated");
        self.notifier.notify(slot.confirmation(&station));
        Ok(())
    }

    pub fn pin(&self, slot: PinSlot) -> PinnedStation {
        self.pins.get(slot)
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog.borrow().clone()
    }

    pub fn subscribe_catalog(&self) -> watch::Receiver<Catalog> {
        self.catalog.subscribe()
    }

    pub fn dropdown(&self) -> SearchResults {
        self.dropdown.current()
    }

    /// Latest pin picker search results.
    pub fn panel(&self) -> SearchResults {
        self.panel.current()
    }

    pub fn subscribe_panel(&self) -> watch::Receiver<SearchResults> {
        self.panel.subscribe()
    }

    pub fn feed(&self) -> FeedView {
        self.feed.current()
    }

    /// The board as of `now`, clock times in Munich local time.
    pub fn board(&self, now: DateTime<Utc>) -> BoardView {
        BoardView::build(&self.feed.current(), now, &Berlin)
    }

    /// Stop polling and searching.
    pub fn shutdown(&self) {
        self.feed.stop();
        self.dropdown.close();
        self.panel.close();
        if let Ok(mut sync) = self.sync.lock()
            && let Some(handle) = sync.take()
        {
            handle.abort();
        }
    }
}

impl<A> Drop for App<A> {
    fn drop(&mut self) {
        if let Ok(mut sync) = self.sync.lock()
            && let Some(handle) = sync.take()
        {
            handle.abort();
        }
    }
}

fn lock(resolver: &Mutex<StationResolver>) -> MutexGuard<'_, StationResolver> {
    resolver.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fold settled dropdown results into the resolver and republish.
fn apply_search_results(
    resolver: &Mutex<StationResolver>,
    catalog: &watch::Sender<Catalog>,
    results: SearchResults,
) {
    // Results still loading belong to the previous query
    if results.loading {
        return;
    }

    let mut resolver = lock(resolver);
    resolver.set_results(results.query, results.stations);
    let next = resolver.catalog();
    catalog.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}
