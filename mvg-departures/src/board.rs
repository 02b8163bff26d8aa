//! Render-ready departure board.
//!
//! Turns the feed's latest [`FeedView`] into sections and rows of strings,
//! evaluated against a caller-supplied `now`. Building is pure: the same
//! view and instant always give the same board.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::domain::{Departure, PinnedStation};
use crate::feed::{FeedState, FeedView};
use crate::format::{
    IconCategory, Tint, clock_time_in, departure_subtitle, departure_tint, departure_title,
    departure_tooltip, icon_category, occupancy_tooltip, relative_eta, transport_display_name,
};
use crate::group::{DepartureGroup, group_departures};
use crate::mvg::ErrorKind;

/// One departure row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    pub title: String,
    pub subtitle: String,
    pub tint: Tint,
    pub icon: IconCategory,
    /// Relative time, e.g. "4 min"
    pub eta: String,
    /// Expected local clock time
    pub clock: String,
    pub tooltip: String,
    pub occupancy: String,
    pub occupancy_tooltip: String,
    pub cancelled: bool,
}

impl BoardRow {
    fn build<Tz: TimeZone>(departure: &Departure, now: DateTime<Utc>, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            title: departure_title(departure),
            subtitle: departure_subtitle(departure, tz),
            tint: departure_tint(departure),
            icon: icon_category(&departure.transport_type),
            eta: relative_eta(departure.realtime_departure, now),
            clock: clock_time_in(departure.realtime_departure, tz),
            tooltip: departure_tooltip(departure, tz),
            occupancy: departure.occupancy.to_string(),
            occupancy_tooltip: occupancy_tooltip(&departure.occupancy),
            cancelled: departure.cancelled,
        }
    }
}

/// Departures of one mode under a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSection {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<BoardRow>,
}

/// Shown in place of sections when there is nothing to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub description: &'static str,
}

impl EmptyState {
    pub const NO_DEPARTURES: EmptyState = EmptyState {
        title: "No departures found",
        description: "No upcoming departures available at this station",
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub station: Option<PinnedStation>,
    pub loading: bool,
    /// Classification of the last poll failure, if the last poll failed.
    pub error: Option<ErrorKind>,
    pub sections: Vec<BoardSection>,
    pub empty: Option<EmptyState>,
}

impl BoardView {
    /// Build the board for `view` as seen at `now`, with clock times in `tz`.
    pub fn build<Tz: TimeZone>(view: &FeedView, now: DateTime<Utc>, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let sections: Vec<BoardSection> = group_departures(view.departures())
            .iter()
            .map(|g| section(g, now, tz))
            .collect();

        let loading = view.is_loading();
        let empty = (!loading && sections.is_empty()).then_some(EmptyState::NO_DEPARTURES);
        let error = match view.state {
            FeedState::Failed { error } => Some(error),
            _ => None,
        };

        Self {
            station: view.station.clone(),
            loading,
            error,
            sections,
            empty,
        }
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

fn section<Tz: TimeZone>(group: &DepartureGroup, now: DateTime<Utc>, tz: &Tz) -> BoardSection
where
    Tz::Offset: std::fmt::Display,
{
    BoardSection {
        title: transport_display_name(&group.transport_type).to_string(),
        subtitle: group.summary(),
        rows: group
            .departures
            .iter()
            .map(|d| BoardRow::build(d, now, tz))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{DepartureSnapshot, TransportType};
    use crate::testing::{departure, gid, t0};
    use chrono_tz::Europe::Berlin;

    fn ready(departures: Vec<Departure>) -> FeedView {
        let id = gid("de:09162:2");
        FeedView {
            generation: 1,
            station: Some(PinnedStation::new(id.clone(), "Marienplatz")),
            state: FeedState::Ready,
            snapshot: Some(Arc::new(DepartureSnapshot::new(id, t0(), departures))),
        }
    }

    #[test]
    fn sections_in_display_order() {
        let view = ready(vec![
            departure("100", TransportType::Bus, 3),
            departure("U3", TransportType::Ubahn, 5),
            departure("U6", TransportType::Ubahn, 7),
            departure("S1", TransportType::Sbahn, 1),
        ]);

        let board = BoardView::build(&view, t0(), &Berlin);
        let titles: Vec<&str> = board.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["U-Bahn", "S-Bahn", "Bus"]);
        assert_eq!(board.sections[0].subtitle, "2 departures");
        assert_eq!(board.sections[1].subtitle, "1 departure");
        assert_eq!(board.row_count(), 4);
        assert!(board.empty.is_none());
        assert!(!board.loading);
    }

    #[test]
    fn row_contents() {
        let mut d = departure("U3", TransportType::Ubahn, 4);
        d.delay_minutes = 2;
        d.realtime_departure = d.planned_departure + chrono::Duration::minutes(2);
        let board = BoardView::build(&ready(vec![d]), t0(), &Berlin);
        let row = &board.sections[0].rows[0];

        assert_eq!(row.title, "U3 → U3 terminus");
        assert_eq!(row.subtitle, "Platform 1 • 23:19 • +2 min delay");
        assert_eq!(row.tint, Tint::Delayed);
        assert_eq!(row.icon, IconCategory::Rail);
        assert_eq!(row.eta, "6 min");
        assert_eq!(row.clock, "23:19");
        assert_eq!(row.tooltip, "Departure: 23:19 (+2 min)");
        assert_eq!(row.occupancy, "LOW");
        assert_eq!(row.occupancy_tooltip, "Occupancy: LOW");
    }

    #[test]
    fn cancelled_row() {
        let mut d = departure("N40", TransportType::Bus, 10);
        d.cancelled = true;
        let board = BoardView::build(&ready(vec![d]), t0(), &Berlin);
        let row = &board.sections[0].rows[0];

        assert_eq!(row.subtitle, "CANCELLED");
        assert_eq!(row.tint, Tint::Cancelled);
        assert_eq!(row.icon, IconCategory::Road);
        assert!(row.cancelled);
    }

    #[test]
    fn empty_when_ready_without_departures() {
        let board = BoardView::build(&ready(Vec::new()), t0(), &Berlin);
        assert_eq!(board.empty, Some(EmptyState::NO_DEPARTURES));
        assert_eq!(board.empty.unwrap().title, "No departures found");
    }

    #[test]
    fn no_empty_state_while_loading() {
        let mut view = ready(Vec::new());
        view.state = FeedState::Loading;
        view.snapshot = None;

        let board = BoardView::build(&view, t0(), &Berlin);
        assert!(board.loading);
        assert!(board.empty.is_none());
        assert!(board.sections.is_empty());
    }

    #[test]
    fn failure_is_empty_and_tagged() {
        let mut view = ready(Vec::new());
        view.state = FeedState::Failed {
            error: ErrorKind::Http { status: 503 },
        };

        let board = BoardView::build(&view, t0(), &Berlin);
        assert_eq!(board.error, Some(ErrorKind::Http { status: 503 }));
        assert!(board.empty.is_some());
    }

    #[test]
    fn eta_moves_with_now() {
        let view = ready(vec![departure("U6", TransportType::Ubahn, 3)]);

        let early = BoardView::build(&view, t0(), &Berlin);
        let late = BoardView::build(&view, t0() + chrono::Duration::minutes(3), &Berlin);
        assert_eq!(early.sections[0].rows[0].eta, "3 min");
        assert_eq!(late.sections[0].rows[0].eta, "Now");
    }

    #[test]
    fn repeated_builds_are_identical() {
        let view = ready(vec![
            departure("U3", TransportType::Ubahn, 5),
            departure("19", TransportType::Tram, 2),
        ]);
        assert_eq!(
            BoardView::build(&view, t0(), &Berlin),
            BoardView::build(&view, t0(), &Berlin)
        );
    }
}
