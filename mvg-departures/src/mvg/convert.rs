//! Conversion from MVG DTOs to domain types.
//!
//! Timestamps arrive as epoch milliseconds and are turned into UTC
//! datetimes. The delay invariant on [`Departure`] is established here.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::domain::{
    Departure, GlobalId, LocationType, Occupancy, Station, TransportType,
};

use super::types::{DepartureDto, LocationDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Timestamp outside the representable range
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Failed to parse a global id
    #[error("invalid global id: {0:?}")]
    InvalidGlobalId(String),
}

/// Convert a departures response, skipping records that cannot be converted.
///
/// Order is preserved exactly as received.
pub fn convert_departures(dtos: &[DepartureDto]) -> Vec<Departure> {
    let mut results = Vec::with_capacity(dtos.len());

    for (idx, dto) in dtos.iter().enumerate() {
        match convert_departure(dto) {
            Ok(departure) => results.push(departure),
            Err(e) => warn!(index = idx, error = %e, "skipping departure record"),
        }
    }

    results
}

/// Convert a single departure record.
pub fn convert_departure(dto: &DepartureDto) -> Result<Departure, ConversionError> {
    let planned_ms = dto
        .planned_departure_time
        .ok_or(ConversionError::MissingField("plannedDepartureTime"))?;
    let planned = millis(planned_ms)?;

    let realtime_reported = match dto.realtime_departure_time {
        Some(ms) => millis(ms)?,
        None => planned,
    };

    let transport_type = dto
        .transport_type
        .as_deref()
        .map(TransportType::from_wire)
        .ok_or(ConversionError::MissingField("transportType"))?;
    let label = dto
        .label
        .clone()
        .ok_or(ConversionError::MissingField("label"))?;
    let destination = dto
        .destination
        .clone()
        .ok_or(ConversionError::MissingField("destination"))?;

    let delay_minutes = match dto.delay_in_minutes {
        Some(d) => u32::try_from(d.max(0)).unwrap_or(u32::MAX),
        None => whole_minutes_late(planned, realtime_reported),
    };

    let realtime_departure = normalize_realtime(planned, realtime_reported, delay_minutes);
    if realtime_departure != realtime_reported {
        debug!(
            %label,
            delay_minutes,
            "realtime departure inconsistent with delay; normalised"
        );
    }

    Ok(Departure {
        planned_departure: planned,
        realtime_departure,
        delay_minutes,
        realtime: dto.realtime.unwrap_or(false),
        transport_type,
        label,
        destination,
        cancelled: dto.cancelled.unwrap_or(false),
        platform: dto.platform,
        platform_changed: dto.platform_changed.unwrap_or(false),
        occupancy: dto
            .occupancy
            .as_deref()
            .map(Occupancy::from_wire)
            .unwrap_or(Occupancy::Unknown),
    })
}

/// Convert a locations response, skipping entries without a usable id.
///
/// Addresses carry no global id and cannot be selected, so they are
/// dropped here.
pub fn convert_locations(dtos: &[LocationDto]) -> Vec<Station> {
    dtos.iter()
        .filter_map(|dto| match convert_location(dto) {
            Ok(station) => Some(station),
            Err(e) => {
                debug!(error = %e, name = ?dto.name, "skipping location");
                None
            }
        })
        .collect()
}

/// Convert a single location.
pub fn convert_location(dto: &LocationDto) -> Result<Station, ConversionError> {
    let raw_id = dto
        .global_id
        .as_deref()
        .ok_or(ConversionError::MissingField("globalId"))?;
    let global_id =
        GlobalId::parse(raw_id).map_err(|_| ConversionError::InvalidGlobalId(raw_id.to_string()))?;

    let name = dto.name.clone().ok_or(ConversionError::MissingField("name"))?;

    Ok(Station {
        global_id,
        name,
        place: dto.place.clone().unwrap_or_default(),
        transport_types: dto
            .transport_types
            .iter()
            .flatten()
            .map(|t| TransportType::from_wire(t))
            .collect(),
        location_type: dto
            .location_type
            .as_deref()
            .map(LocationType::from_wire)
            // Untyped entries are never treated as stations
            .unwrap_or_else(|| LocationType::Other(String::new())),
    })
}

fn millis(ms: i64) -> Result<DateTime<Utc>, ConversionError> {
    DateTime::from_timestamp_millis(ms).ok_or(ConversionError::InvalidTimestamp(ms))
}

fn whole_minutes_late(planned: DateTime<Utc>, realtime: DateTime<Utc>) -> u32 {
    let mins = (realtime - planned).num_minutes();
    u32::try_from(mins.max(0)).unwrap_or(u32::MAX)
}

/// Establish `realtime >= planned` when delayed and `realtime == planned`
/// otherwise.
fn normalize_realtime(
    planned: DateTime<Utc>,
    realtime: DateTime<Utc>,
    delay_minutes: u32,
) -> DateTime<Utc> {
    if delay_minutes == 0 {
        planned
    } else if realtime < planned {
        planned + Duration::minutes(i64::from(delay_minutes))
    } else {
        realtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    fn make_dto(label: &str, transport: &str) -> DepartureDto {
        DepartureDto {
            planned_departure_time: Some(T0),
            realtime: Some(true),
            delay_in_minutes: Some(0),
            realtime_departure_time: Some(T0),
            transport_type: Some(transport.to_string()),
            label: Some(label.to_string()),
            destination: Some("Messestadt Ost".to_string()),
            cancelled: Some(false),
            platform: Some(2),
            platform_changed: Some(false),
            occupancy: Some("MEDIUM".to_string()),
        }
    }

    fn make_location(id: Option<&str>, kind: &str) -> LocationDto {
        LocationDto {
            global_id: id.map(str::to_string),
            name: Some("Odeonsplatz".to_string()),
            place: Some("München".to_string()),
            transport_types: Some(vec!["UBAHN".to_string(), "BUS".to_string()]),
            location_type: Some(kind.to_string()),
            latitude: Some(48.14),
            longitude: Some(11.57),
            diva_id: Some(1),
        }
    }

    #[test]
    fn convert_on_time_departure() {
        let dep = convert_departure(&make_dto("U2", "UBAHN")).unwrap();
        assert_eq!(dep.label, "U2");
        assert_eq!(dep.transport_type, TransportType::Ubahn);
        assert_eq!(dep.delay_minutes, 0);
        assert_eq!(dep.planned_departure, dep.realtime_departure);
        assert_eq!(dep.platform, Some(2));
        assert_eq!(dep.occupancy, Occupancy::Medium);
        assert!(!dep.cancelled);
    }

    #[test]
    fn convert_delayed_departure() {
        let mut dto = make_dto("S8", "SBAHN");
        dto.delay_in_minutes = Some(3);
        dto.realtime_departure_time = Some(T0 + 3 * 60_000);

        let dep = convert_departure(&dto).unwrap();
        assert_eq!(dep.delay_minutes, 3);
        assert_eq!((dep.realtime_departure - dep.planned_departure).num_minutes(), 3);
    }

    #[test]
    fn delay_derived_when_missing() {
        let mut dto = make_dto("S8", "SBAHN");
        dto.delay_in_minutes = None;
        dto.realtime_departure_time = Some(T0 + 150_000);

        let dep = convert_departure(&dto).unwrap();
        assert_eq!(dep.delay_minutes, 2);
        assert_eq!(dep.realtime_departure.timestamp_millis(), T0 + 150_000);
    }

    #[test]
    fn early_realtime_without_delay_snaps_to_planned() {
        let mut dto = make_dto("54", "BUS");
        dto.realtime_departure_time = Some(T0 - 30_000);

        let dep = convert_departure(&dto).unwrap();
        assert_eq!(dep.realtime_departure, dep.planned_departure);
    }

    #[test]
    fn delayed_but_realtime_before_planned_is_pushed_back() {
        let mut dto = make_dto("19", "TRAM");
        dto.delay_in_minutes = Some(4);
        dto.realtime_departure_time = Some(T0 - 60_000);

        let dep = convert_departure(&dto).unwrap();
        assert_eq!((dep.realtime_departure - dep.planned_departure).num_minutes(), 4);
    }

    #[test]
    fn negative_delay_clamped() {
        let mut dto = make_dto("19", "TRAM");
        dto.delay_in_minutes = Some(-1);
        let dep = convert_departure(&dto).unwrap();
        assert_eq!(dep.delay_minutes, 0);
    }

    #[test]
    fn missing_planned_time_rejected() {
        let mut dto = make_dto("U6", "UBAHN");
        dto.planned_departure_time = None;
        assert_eq!(
            convert_departure(&dto),
            Err(ConversionError::MissingField("plannedDepartureTime"))
        );
    }

    #[test]
    fn defaults_for_optional_fields() {
        let mut dto = make_dto("U6", "UBAHN");
        dto.realtime = None;
        dto.cancelled = None;
        dto.platform = None;
        dto.occupancy = None;

        let dep = convert_departure(&dto).unwrap();
        assert!(!dep.realtime);
        assert!(!dep.cancelled);
        assert_eq!(dep.platform, None);
        assert_eq!(dep.occupancy, Occupancy::Unknown);
    }

    #[test]
    fn invalid_records_skipped_order_kept() {
        let mut broken = make_dto("X", "BUS");
        broken.label = None;

        let dtos = vec![
            make_dto("U3", "UBAHN"),
            broken,
            make_dto("S1", "SBAHN"),
        ];
        let labels: Vec<String> = convert_departures(&dtos)
            .into_iter()
            .map(|d| d.label)
            .collect();
        assert_eq!(labels, vec!["U3", "S1"]);
    }

    #[test]
    fn convert_station_location() {
        let station = convert_location(&make_location(Some("de:09162:3"), "STATION")).unwrap();
        assert_eq!(station.global_id.as_str(), "de:09162:3");
        assert_eq!(station.name, "Odeonsplatz");
        assert!(station.is_station());
        assert!(station.transport_types.contains(&TransportType::Ubahn));
        assert!(station.transport_types.contains(&TransportType::Bus));
    }

    #[test]
    fn addresses_without_id_dropped() {
        let dtos = vec![
            make_location(Some("de:09162:3"), "STATION"),
            make_location(None, "ADDRESS"),
            make_location(Some("poi:123"), "POI"),
        ];
        let stations = convert_locations(&dtos);
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].location_type, LocationType::Poi);
    }

    #[test]
    fn untyped_location_is_not_a_station() {
        let mut dto = make_location(Some("de:09162:3"), "STATION");
        dto.location_type = None;

        let location = convert_location(&dto).unwrap();
        assert_eq!(location.location_type, LocationType::Other(String::new()));
        assert!(!location.is_station());
    }
}
