//! MVG API response DTOs.
//!
//! These types map directly to the JSON the service returns. Fields are
//! `Option` because the service omits rather than nulls many of them, and
//! unknown fields are ignored.

use serde::Deserialize;

/// One entry of the `/departures` response array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureDto {
    /// Scheduled departure (epoch milliseconds).
    pub planned_departure_time: Option<i64>,

    /// Whether real-time data is available for this trip.
    pub realtime: Option<bool>,

    /// Delay in whole minutes. Omitted when there is no real-time data.
    pub delay_in_minutes: Option<i64>,

    /// Expected departure (epoch milliseconds).
    pub realtime_departure_time: Option<i64>,

    /// Mode, e.g. "UBAHN" or "BUS".
    pub transport_type: Option<String>,

    /// Line label, e.g. "U3" or "S8".
    pub label: Option<String>,

    /// Headsign.
    pub destination: Option<String>,

    pub cancelled: Option<bool>,

    pub platform: Option<u32>,

    pub platform_changed: Option<bool>,

    /// "LOW", "MEDIUM", "HIGH" or "UNKNOWN".
    pub occupancy: Option<String>,
}

/// One entry of the `/locations` response array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    /// Missing for addresses, present for stations.
    pub global_id: Option<String>,

    pub name: Option<String>,

    /// Town or district.
    pub place: Option<String>,

    /// Modes serving this location.
    pub transport_types: Option<Vec<String>>,

    /// "STATION", "POI", "ADDRESS", ...
    #[serde(rename = "type")]
    pub location_type: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub diva_id: Option<i64>,
}
