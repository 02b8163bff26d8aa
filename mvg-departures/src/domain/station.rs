//! Station identifiers and records.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TransportType;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid global id: {reason}")]
pub struct InvalidGlobalId {
    reason: &'static str,
}

/// A stable, unique station key as issued by the transit service.
///
/// Identifiers look like `de:09162:2`. The only guarantees are that the
/// value is non-empty and contains no whitespace, so that it can be placed
/// in a query string verbatim.
///
/// # Examples
///
/// ```
/// use mvg_departures::domain::GlobalId;
///
/// let marienplatz = GlobalId::parse("de:09162:2").unwrap();
/// assert_eq!(marienplatz.as_str(), "de:09162:2");
///
/// // Surrounding whitespace is trimmed
/// assert_eq!(GlobalId::parse(" de:09162:1 ").unwrap().as_str(), "de:09162:1");
///
/// assert!(GlobalId::parse("").is_err());
/// assert!(GlobalId::parse("de 09162").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlobalId(String);

impl GlobalId {
    /// Parse an identifier, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidGlobalId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidGlobalId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidGlobalId {
                reason: "must not contain whitespace",
            });
        }

        Ok(GlobalId(trimmed.to_string()))
    }

    /// Wrap a compile-time constant known to be valid.
    pub(crate) fn from_static(s: &'static str) -> Self {
        debug_assert!(GlobalId::parse(s).is_ok(), "invalid constant id {s:?}");
        GlobalId(s.to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GlobalId {
    type Error = InvalidGlobalId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GlobalId::parse(&value)
    }
}

impl From<GlobalId> for String {
    fn from(id: GlobalId) -> Self {
        id.0
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalId({})", self.0)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of location returned by the location search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationType {
    Station,
    Poi,
    Address,
    /// Anything the service adds later; kept verbatim.
    Other(String),
}

impl LocationType {
    /// Parse the wire value. Unknown values are preserved.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "STATION" => LocationType::Station,
            "POI" => LocationType::Poi,
            "ADDRESS" => LocationType::Address,
            other => LocationType::Other(other.to_string()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            LocationType::Station => "STATION",
            LocationType::Poi => "POI",
            LocationType::Address => "ADDRESS",
            LocationType::Other(s) => s,
        }
    }
}

impl Serialize for LocationType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

/// A station or other location as returned by the location search.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub global_id: GlobalId,
    pub name: String,
    pub place: String,
    pub transport_types: BTreeSet<TransportType>,
    #[serde(rename = "type")]
    pub location_type: LocationType,
}

impl Station {
    pub fn is_station(&self) -> bool {
        self.location_type == LocationType::Station
    }

    /// Whether any rail-bound mode (U-Bahn, S-Bahn, tram) stops here.
    pub fn serves_rail(&self) -> bool {
        self.transport_types
            .iter()
            .any(|t| matches!(t, TransportType::Ubahn | TransportType::Sbahn | TransportType::Tram))
    }
}

/// The persisted projection of a [`Station`] used for the home/work pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedStation {
    pub global_id: GlobalId,
    pub name: String,
}

impl PinnedStation {
    pub fn new(global_id: GlobalId, name: impl Into<String>) -> Self {
        Self {
            global_id,
            name: name.into(),
        }
    }
}

impl From<&Station> for PinnedStation {
    fn from(station: &Station) -> Self {
        Self {
            global_id: station.global_id.clone(),
            name: station.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, types: &[TransportType]) -> Station {
        Station {
            global_id: GlobalId::parse(id).unwrap(),
            name: "Test".to_string(),
            place: "München".to_string(),
            transport_types: types.iter().cloned().collect(),
            location_type: LocationType::Station,
        }
    }

    #[test]
    fn parse_valid_ids() {
        assert!(GlobalId::parse("de:09162:2").is_ok());
        assert!(GlobalId::parse("de:09162:1").is_ok());
        assert!(GlobalId::parse("x").is_ok());
    }

    #[test]
    fn reject_blank_and_inner_whitespace() {
        assert!(GlobalId::parse("").is_err());
        assert!(GlobalId::parse("   ").is_err());
        assert!(GlobalId::parse("de:09162 2").is_err());
        assert!(GlobalId::parse("de:\t1").is_err());
    }

    #[test]
    fn display_and_debug() {
        let id = GlobalId::parse("de:09162:2").unwrap();
        assert_eq!(format!("{}", id), "de:09162:2");
        assert_eq!(format!("{:?}", id), "GlobalId(de:09162:2)");
    }

    #[test]
    fn serde_as_plain_string() {
        let id = GlobalId::parse("de:09162:2").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"de:09162:2\"");

        let back: GlobalId = serde_json::from_str("\"de:09162:2\"").unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<GlobalId>("\"\"").is_err());
    }

    #[test]
    fn location_type_preserves_unknown() {
        assert_eq!(LocationType::from_wire("STATION"), LocationType::Station);
        assert_eq!(LocationType::from_wire("POI"), LocationType::Poi);
        let other = LocationType::from_wire("FERRY_PIER");
        assert_eq!(other, LocationType::Other("FERRY_PIER".to_string()));
        assert_eq!(other.wire_name(), "FERRY_PIER");
    }

    #[test]
    fn serves_rail() {
        assert!(station("a", &[TransportType::Ubahn]).serves_rail());
        assert!(station("a", &[TransportType::Bus, TransportType::Tram]).serves_rail());
        assert!(!station("a", &[TransportType::Bus]).serves_rail());
        assert!(!station("a", &[]).serves_rail());
    }

    #[test]
    fn pinned_projection() {
        let s = station("de:09162:6", &[TransportType::Ubahn]);
        let pin = PinnedStation::from(&s);
        assert_eq!(pin.global_id.as_str(), "de:09162:6");
        assert_eq!(pin.name, "Test");
    }

    #[test]
    fn pinned_serde_uses_camel_case() {
        let pin = PinnedStation::new(GlobalId::parse("de:09162:2").unwrap(), "Marienplatz");
        let json = serde_json::to_value(&pin).unwrap();
        assert_eq!(json["globalId"], "de:09162:2");
        assert_eq!(json["name"], "Marienplatz");
    }
}
