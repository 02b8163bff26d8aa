//! Live departure board for Munich public transport.
//!
//! Resolves a selected station to an auto-refreshing list of departures
//! from the MVG service, with debounced station search and two pinned
//! quick-access stations (home and work).

pub mod app;
pub mod board;
pub mod cache;
pub mod config;
pub mod domain;
pub mod feed;
pub mod format;
pub mod group;
pub mod mvg;
pub mod notify;
pub mod pins;
pub mod resolver;
pub mod search;
pub mod web;

#[cfg(test)]
mod testing;
