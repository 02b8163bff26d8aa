//! MVG (Munich public transport) API client.
//!
//! Two endpoints are used:
//! - `GET /departures` for the upcoming departures at a station
//! - `GET /locations` for free-text station search
//!
//! Timestamps are epoch milliseconds. Every failure is mapped onto
//! [`MvgError`] so callers can degrade to an empty result.

mod client;
mod convert;
mod error;
mod types;

pub use client::{
    DEFAULT_DEPARTURE_LIMIT, DEFAULT_OFFSET_MINUTES, DepartureQuery, MvgClient, MvgConfig,
    TransitApi,
};
pub use convert::{ConversionError, convert_departure, convert_location};
pub use error::{ErrorKind, MvgError};
pub use types::{DepartureDto, LocationDto};
