//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{GlobalId, PinnedStation};
use crate::notify::Notification;

/// Latest text of a search box (dropdown or pin picker).
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub global_id: String,
}

/// Outcome of a selection.
///
/// Selecting an id the catalog does not know is not an error; it leaves
/// the current station in place and reports `selected: false`.
#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub selected: bool,
    pub station: Option<PinnedStation>,
}

/// Body of `PUT /pins/:slot`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPinRequest {
    pub global_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PinsResponse {
    pub home: PinnedStation,
    pub work: PinnedStation,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl SetPinRequest {
    /// Validate into a pin. The station is not checked against the live
    /// station list.
    pub fn into_pinned(self) -> Result<PinnedStation, String> {
        let global_id = GlobalId::parse(&self.global_id)
            .map_err(|e| format!("Invalid station id {:?}: {e}", self.global_id))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err("Station name must not be empty".to_string());
        }

        Ok(PinnedStation::new(global_id, name))
    }
}
