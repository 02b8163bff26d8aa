//! Home and work station pins.
//!
//! Exactly two pins exist. Each falls back to a documented default when
//! nothing has been stored. Pins are not validated against the live
//! station list when set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

use crate::domain::{GlobalId, PinnedStation};
use crate::notify::Notification;

/// Errors from persisting pins.
#[derive(Debug, thiserror::Error)]
pub enum PinError {
    #[error("failed to write pin file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize pins: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("pin store lock poisoned")]
    Poisoned,
}

/// Which of the two pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PinSlot {
    Home,
    Work,
}

impl PinSlot {
    pub const ALL: [PinSlot; 2] = [PinSlot::Home, PinSlot::Work];

    /// Key under which the pin is stored.
    pub fn storage_key(self) -> &'static str {
        match self {
            PinSlot::Home => "mvg-home-station",
            PinSlot::Work => "mvg-work-station",
        }
    }

    /// Pin used when nothing has been stored.
    pub fn default_station(self) -> PinnedStation {
        let (id, name) = match self {
            PinSlot::Home => ("de:09162:2", "Marienplatz"),
            PinSlot::Work => ("de:09162:1", "Hauptbahnhof"),
        };
        PinnedStation::new(GlobalId::from_static(id), name)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Some(PinSlot::Home),
            "work" => Some(PinSlot::Work),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinSlot::Home => "home",
            PinSlot::Work => "work",
        }
    }

    /// Notification confirming that the pin was changed.
    pub fn confirmation(self, station: &PinnedStation) -> Notification {
        let title = match self {
            PinSlot::Home => "Home Station Set",
            PinSlot::Work => "Work Station Set",
        };
        Notification::success(
            title,
            format!("Set {} as your {} station", station.name, self.as_str()),
        )
    }
}

/// Key-value persistence for the two pins.
pub trait PinStore: Send + Sync + 'static {
    /// The stored pin, or the slot's default.
    fn get(&self, slot: PinSlot) -> PinnedStation;

    fn set(&self, slot: PinSlot, station: PinnedStation) -> Result<(), PinError>;
}

/// Pins held in memory only.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    pins: Mutex<BTreeMap<PinSlot, PinnedStation>>,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinStore for MemoryPinStore {
    fn get(&self, slot: PinSlot) -> PinnedStation {
        self.pins
            .lock()
            .ok()
            .and_then(|pins| pins.get(&slot).cloned())
            .unwrap_or_else(|| slot.default_station())
    }

    fn set(&self, slot: PinSlot, station: PinnedStation) -> Result<(), PinError> {
        let mut pins = self.pins.lock().map_err(|_| PinError::Poisoned)?;
        pins.insert(slot, station);
        Ok(())
    }
}

/// Pins persisted to a JSON file, keyed by [`PinSlot::storage_key`].
///
/// The file is read once when opened and rewritten on every change.
#[derive(Debug)]
pub struct JsonPinStore {
    path: PathBuf,
    pins: Mutex<BTreeMap<String, PinnedStation>>,
}

impl JsonPinStore {
    /// Open the store at `path`.
    ///
    /// A missing file means no pins are set. An unreadable or corrupt file
    /// is logged and treated the same way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pins = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt pin file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable pin file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            pins: Mutex::new(pins),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, pins: &BTreeMap<String, PinnedStation>) -> Result<(), PinError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| PinError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(pins)?;
        std::fs::write(&self.path, json).map_err(|source| PinError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PinStore for JsonPinStore {
    fn get(&self, slot: PinSlot) -> PinnedStation {
        self.pins
            .lock()
            .ok()
            .and_then(|pins| pins.get(slot.storage_key()).cloned())
            .unwrap_or_else(|| slot.default_station())
    }

    fn set(&self, slot: PinSlot, station: PinnedStation) -> Result<(), PinError> {
        let mut pins = self.pins.lock().map_err(|_| PinError::Poisoned)?;
        let previous = pins.insert(slot.storage_key().to_string(), station);

        if let Err(e) = self.write(&pins) {
            // Keep memory consistent with disk
            match previous {
                Some(p) => pins.insert(slot.storage_key().to_string(), p),
                None => pins.remove(slot.storage_key()),
            };
            return Err(e);
        }

        Ok(())
    }
}
