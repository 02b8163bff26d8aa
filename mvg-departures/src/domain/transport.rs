//! Transport modes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A mode of public transport.
///
/// Values the service introduces later are kept in [`TransportType::Other`]
/// so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportType {
    Ubahn,
    Sbahn,
    Tram,
    Bus,
    Other(String),
}

impl TransportType {
    /// Fixed order in which departure categories are displayed.
    pub const DISPLAY_ORDER: [TransportType; 4] = [
        TransportType::Ubahn,
        TransportType::Sbahn,
        TransportType::Tram,
        TransportType::Bus,
    ];

    /// Modes requested from the departures endpoint, in wire order.
    pub const REQUESTED: [TransportType; 4] = [
        TransportType::Ubahn,
        TransportType::Sbahn,
        TransportType::Bus,
        TransportType::Tram,
    ];

    /// Parse a wire value, case-insensitively for the known modes.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "UBAHN" => TransportType::Ubahn,
            "SBAHN" => TransportType::Sbahn,
            "TRAM" => TransportType::Tram,
            "BUS" => TransportType::Bus,
            _ => TransportType::Other(s.to_string()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            TransportType::Ubahn => "UBAHN",
            TransportType::Sbahn => "SBAHN",
            TransportType::Tram => "TRAM",
            TransportType::Bus => "BUS",
            TransportType::Other(s) => s,
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for TransportType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for TransportType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TransportType::from_wire(&s))
    }
}
