//! Partitioning of a departure snapshot into display sections.

use serde::Serialize;

use crate::domain::{Departure, DepartureSnapshot, TransportType};
use crate::format::count_summary;

/// Departures of one mode, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureGroup {
    pub transport_type: TransportType,
    pub departures: Vec<Departure>,
}

impl DepartureGroup {
    pub fn count(&self) -> usize {
        self.departures.len()
    }

    /// Subtitle such as "3 departures".
    pub fn summary(&self) -> String {
        count_summary(self.count())
    }
}

/// Group a snapshot by mode in display order (U-Bahn, S-Bahn, tram, bus).
///
/// Modes without departures are omitted, never emitted empty. Order within
/// a group is the order the service returned. Departures of modes outside
/// the display order are not shown.
pub fn group(snapshot: &DepartureSnapshot) -> Vec<DepartureGroup> {
    group_departures(&snapshot.departures)
}

pub fn group_departures(departures: &[Departure]) -> Vec<DepartureGroup> {
    TransportType::DISPLAY_ORDER
        .iter()
        .filter_map(|mode| {
            let matching: Vec<Departure> = departures
                .iter()
                .filter(|d| &d.transport_type == mode)
                .cloned()
                .collect();

            (!matching.is_empty()).then(|| DepartureGroup {
                transport_type: mode.clone(),
                departures: matching,
            })
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::testing::departure;
    use proptest::prelude::*;

    fn mode() -> impl Strategy<Value = TransportType> {
        prop_oneof![
            Just(TransportType::Ubahn),
            Just(TransportType::Sbahn),
            Just(TransportType::Tram),
            Just(TransportType::Bus),
        ]
    }

    proptest! {
        /// Every known-mode departure lands in exactly one non-empty group
        #[test]
        fn partition_is_complete(modes in proptest::collection::vec(mode(), 0..40)) {
            let departures: Vec<Departure> = modes
                .iter()
                .enumerate()
                .map(|(i, m)| departure(&format!("L{i}"), m.clone(), i as i64))
                .collect();

            let groups = group_departures(&departures);
            let total: usize = groups.iter().map(|g| g.count()).sum();
            prop_assert_eq!(total, departures.len());
            prop_assert!(groups.iter().all(|g| g.count() > 0));
        }

        /// Within a group, labels appear in input order
        #[test]
        fn stable_within_group(modes in proptest::collection::vec(mode(), 0..40)) {
            let departures: Vec<Departure> = modes
                .iter()
                .enumerate()
                .map(|(i, m)| departure(&format!("{i}"), m.clone(), 0))
                .collect();

            for g in group_departures(&departures) {
                let idx: Vec<usize> = g.departures.iter().map(|d| d.label.parse().unwrap()).collect();
                let mut sorted = idx.clone();
                sorted.sort_unstable();
                prop_assert_eq!(idx, sorted);
            }
        }
    }
}
