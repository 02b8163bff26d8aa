//! Departure records and snapshots.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::{GlobalId, TransportType};

/// How full a vehicle is expected to be.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Low,
    Medium,
    High,
    Unknown,
    /// A value not known to this client, shown verbatim.
    Other(String),
}

impl Occupancy {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "LOW" => Occupancy::Low,
            "MEDIUM" => Occupancy::Medium,
            "HIGH" => Occupancy::High,
            "UNKNOWN" | "" => Occupancy::Unknown,
            other => Occupancy::Other(other.to_string()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            Occupancy::Low => "LOW",
            Occupancy::Medium => "MEDIUM",
            Occupancy::High => "HIGH",
            Occupancy::Unknown => "UNKNOWN",
            Occupancy::Other(s) => s,
        }
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for Occupancy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

/// A single upcoming departure.
///
/// `realtime_departure >= planned_departure` whenever `delay_minutes > 0`,
/// otherwise the two are equal. Conversion from the wire format enforces
/// this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub planned_departure: DateTime<Utc>,
    pub realtime_departure: DateTime<Utc>,
    pub delay_minutes: u32,
    pub realtime: bool,
    pub transport_type: TransportType,
    pub label: String,
    pub destination: String,
    pub cancelled: bool,
    pub platform: Option<u32>,
    pub platform_changed: bool,
    pub occupancy: Occupancy,
}

impl Departure {
    pub fn is_delayed(&self) -> bool {
        self.delay_minutes > 0
    }
}

/// The departures returned by one poll, in service order.
///
/// Replaced wholesale by the next successful poll; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureSnapshot {
    pub station: GlobalId,
    pub fetched_at: DateTime<Utc>,
    pub departures: Arc<[Departure]>,
}

impl DepartureSnapshot {
    pub fn new(station: GlobalId, fetched_at: DateTime<Utc>, departures: Vec<Departure>) -> Self {
        Self {
            station,
            fetched_at,
            departures: departures.into(),
        }
    }

    /// A snapshot with no departures.
    pub fn empty(station: GlobalId, fetched_at: DateTime<Utc>) -> Self {
        Self::new(station, fetched_at, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }
}
