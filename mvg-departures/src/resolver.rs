//! Station catalog for the station picker.
//!
//! Merges the two pins with the latest dropdown search results into one
//! ordered list, and maps a picked identifier back to a station.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{GlobalId, PinnedStation, Station};
use crate::format::{IconCategory, station_icon};

/// Section of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    QuickAccess,
    AllStations,
    SearchResults,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::QuickAccess => "Quick Access",
            SectionKind::AllStations => "All Stations",
            SectionKind::SearchResults => "Search Results",
        }
    }
}

/// Icon of a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryIcon {
    Home,
    Work,
    Station(IconCategory),
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub global_id: GlobalId,
    pub title: String,
    pub icon: EntryIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub kind: SectionKind,
    pub title: &'static str,
    pub entries: Vec<CatalogEntry>,
}

/// Ordered, selectable station list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub sections: Vec<CatalogSection>,
}

impl Catalog {
    /// All entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn section(&self, kind: SectionKind) -> Option<&CatalogSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Result of resolving an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Station(Station),
    Pinned(PinnedStation),
}

impl Resolved {
    pub fn global_id(&self) -> &GlobalId {
        match self {
            Resolved::Station(s) => &s.global_id,
            Resolved::Pinned(p) => &p.global_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resolved::Station(s) => &s.name,
            Resolved::Pinned(p) => &p.name,
        }
    }

    pub fn to_pinned(&self) -> PinnedStation {
        match self {
            Resolved::Station(s) => PinnedStation::from(s),
            Resolved::Pinned(p) => p.clone(),
        }
    }
}

/// Holds the pins and the latest search results.
#[derive(Debug, Clone, Default)]
pub struct StationResolver {
    home: Option<PinnedStation>,
    work: Option<PinnedStation>,
    query: String,
    results: Vec<Station>,
}

impl StationResolver {
    pub fn new(home: Option<PinnedStation>, work: Option<PinnedStation>) -> Self {
        Self {
            home,
            work,
            ..Self::default()
        }
    }

    pub fn set_home(&mut self, home: Option<PinnedStation>) {
        self.home = home;
    }

    pub fn set_work(&mut self, work: Option<PinnedStation>) {
        self.work = work;
    }

    /// Replace the search results and the query they belong to.
    pub fn set_results(&mut self, query: impl Into<String>, results: Vec<Station>) {
        self.query = query.into();
        self.results = results;
    }

    pub fn home(&self) -> Option<&PinnedStation> {
        self.home.as_ref()
    }

    pub fn work(&self) -> Option<&PinnedStation> {
        self.work.as_ref()
    }

    fn query_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Build the catalog.
    ///
    /// With a blank query the pins come first ("Quick Access") and are left
    /// out of the results below them. With an active query only results are
    /// listed. Results are deduplicated by id, first occurrence wins. Empty
    /// sections are omitted.
    pub fn catalog(&self) -> Catalog {
        let mut sections = Vec::with_capacity(2);
        let mut seen: HashSet<&GlobalId> = HashSet::new();

        if !self.query_active() {
            let pinned: Vec<CatalogEntry> = [
                self.home.as_ref().map(|p| (p, EntryIcon::Home)),
                self.work.as_ref().map(|p| (p, EntryIcon::Work)),
            ]
            .into_iter()
            .flatten()
            .filter(|(p, _)| seen.insert(&p.global_id))
            .map(|(p, icon)| CatalogEntry {
                global_id: p.global_id.clone(),
                title: p.name.clone(),
                icon,
            })
            .collect();

            if !pinned.is_empty() {
                sections.push(CatalogSection {
                    kind: SectionKind::QuickAccess,
                    title: SectionKind::QuickAccess.title(),
                    entries: pinned,
                });
            }
        }

        let results: Vec<CatalogEntry> = self
            .results
            .iter()
            .filter(|s| seen.insert(&s.global_id))
            .map(|s| CatalogEntry {
                global_id: s.global_id.clone(),
                title: s.name.clone(),
                icon: EntryIcon::Station(station_icon(s)),
            })
            .collect();

        if !results.is_empty() {
            let kind = if self.query_active() {
                SectionKind::SearchResults
            } else {
                SectionKind::AllStations
            };
            sections.push(CatalogSection {
                kind,
                title: kind.title(),
                entries: results,
            });
        }

        Catalog { sections }
    }

    /// Look up `id` in the search results, then home, then work.
    ///
    /// `None` when the id is in none of them; callers treat that as a
    /// no-op.
    pub fn resolve(&self, id: &GlobalId) -> Option<Resolved> {
        if let Some(station) = self.results.iter().find(|s| &s.global_id == id) {
            return Some(Resolved::Station(station.clone()));
        }

        [self.home.as_ref(), self.work.as_ref()]
            .into_iter()
            .flatten()
            .find(|p| &p.global_id == id)
            .map(|p| Resolved::Pinned(p.clone()))
    }
}
