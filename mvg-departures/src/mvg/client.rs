//! MVG HTTP client.
//!
//! Provides async methods for the departures and locations endpoints and
//! maps transport, status and body failures onto [`MvgError`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::domain::{Departure, GlobalId, Station, TransportType};

use super::convert::{convert_departures, convert_locations};
use super::error::MvgError;
use super::types::{DepartureDto, LocationDto};

/// Default base URL for the MVG API.
const DEFAULT_BASE_URL: &str = "https://www.mvg.de/api/bgw-pt/v3";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of departures requested per poll.
pub const DEFAULT_DEPARTURE_LIMIT: u32 = 20;

/// Default forward offset so that departures hidden by clock skew still show.
pub const DEFAULT_OFFSET_MINUTES: u32 = 5;

/// Configuration for the MVG client.
#[derive(Debug, Clone)]
pub struct MvgConfig {
    /// Base URL for the API (defaults to production MVG)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl MvgConfig {
    /// Create a config pointing at the production service.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("mvg-departures/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for MvgConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of a departures request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureQuery {
    pub global_id: GlobalId,
    pub limit: u32,
    pub transport_types: Vec<TransportType>,
    pub offset_minutes: u32,
}

impl DepartureQuery {
    /// Query with the standard limit, mode set and offset.
    pub fn new(global_id: GlobalId) -> Self {
        Self {
            global_id,
            limit: DEFAULT_DEPARTURE_LIMIT,
            transport_types: TransportType::REQUESTED.to_vec(),
            offset_minutes: DEFAULT_OFFSET_MINUTES,
        }
    }

    /// Query string pairs in the order the service documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let modes = self
            .transport_types
            .iter()
            .map(|t| t.wire_name())
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("globalId", self.global_id.to_string()),
            ("limit", self.limit.to_string()),
            ("transportTypes", modes),
            ("offsetInMinutes", self.offset_minutes.to_string()),
        ]
    }
}

/// The remote operations the departure board depends on.
///
/// Implemented by [`MvgClient`], the caching wrapper, and test doubles.
pub trait TransitApi: Send + Sync + 'static {
    /// Upcoming departures, in service order.
    fn departures(
        &self,
        query: &DepartureQuery,
    ) -> impl Future<Output = Result<Vec<Departure>, MvgError>> + Send;

    /// Locations matching free text, in service ranking order.
    fn locations(&self, query: &str) -> impl Future<Output = Result<Vec<Station>, MvgError>> + Send;
}

/// MVG API client.
#[derive(Debug, Clone)]
pub struct MvgClient {
    http: reqwest::Client,
    base_url: String,
}

impl MvgClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MvgConfig) -> Result<Self, MvgError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| MvgError::Config("invalid user agent".to_string()))?;
        headers.insert(USER_AGENT, agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch departures for a station.
    #[instrument(skip(self), fields(station = %query.global_id))]
    pub async fn get_departures(&self, query: &DepartureQuery) -> Result<Vec<Departure>, MvgError> {
        let url = format!("{}/departures", self.base_url);
        let dtos: Vec<DepartureDto> = self.get_json(&url, &query.query_pairs()).await?;
        let departures = convert_departures(&dtos);

        debug!(received = dtos.len(), kept = departures.len(), "fetched departures");
        Ok(departures)
    }

    /// Search locations by free text.
    #[instrument(skip(self))]
    pub async fn get_locations(&self, query: &str) -> Result<Vec<Station>, MvgError> {
        let url = format!("{}/locations", self.base_url);
        let dtos: Vec<LocationDto> = self.get_json(&url, &[("query", query.to_string())]).await?;
        let stations = convert_locations(&dtos);

        debug!(received = dtos.len(), kept = stations.len(), "fetched locations");
        Ok(stations)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, MvgError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(MvgError::from_status(status));
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MvgError::Parse {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl TransitApi for MvgClient {
    async fn departures(&self, query: &DepartureQuery) -> Result<Vec<Departure>, MvgError> {
        self.get_departures(query).await
    }

    async fn locations(&self, query: &str) -> Result<Vec<Station>, MvgError> {
        self.get_locations(query).await
    }
}
