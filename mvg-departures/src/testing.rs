//! Test doubles shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{
    Departure, GlobalId, LocationType, Occupancy, Station, TransportType,
};
use crate::mvg::{DepartureQuery, MvgError, TransitApi};

/// Fixed reference instant used by tests: 2023-11-14 22:13:20 UTC.
pub const T0_MS: i64 = 1_700_000_000_000;

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(T0_MS).unwrap()
}

pub fn gid(s: &str) -> GlobalId {
    GlobalId::parse(s).unwrap()
}

pub fn departure(label: &str, transport: TransportType, minutes_after_t0: i64) -> Departure {
    let at = t0() + chrono::Duration::minutes(minutes_after_t0);
    Departure {
        planned_departure: at,
        realtime_departure: at,
        delay_minutes: 0,
        realtime: true,
        transport_type: transport,
        label: label.to_string(),
        destination: format!("{label} terminus"),
        cancelled: false,
        platform: Some(1),
        platform_changed: false,
        occupancy: Occupancy::Low,
    }
}

pub fn station(id: &str, name: &str, kind: LocationType) -> Station {
    Station {
        global_id: gid(id),
        name: name.to_string(),
        place: "München".to_string(),
        transport_types: [TransportType::Ubahn].into_iter().collect(),
        location_type: kind,
    }
}

/// What a scripted call answers with.
#[derive(Clone)]
pub enum Outcome {
    Departures(Vec<Departure>),
    Stations(Vec<Station>),
    Status(u16),
    Malformed,
}

#[derive(Clone)]
struct Reply {
    delay: Duration,
    outcome: Outcome,
}

/// A [`TransitApi`] whose replies are scripted per station id or query.
///
/// Each key holds a queue of replies; the last one is repeated once the
/// queue is down to a single entry. Unscripted keys answer with an empty
/// list immediately. Delays use `tokio::time`, so paused-clock tests are
/// deterministic.
#[derive(Default)]
pub struct ScriptedApi {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for departures of `station` or locations for `query`.
    pub fn script(&self, key: &str, delay_ms: u64, outcome: Outcome) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Reply {
                delay: Duration::from_millis(delay_ms),
                outcome,
            });
        self
    }

    /// Every call so far, as `departures:<id>` or `locations:<query>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    async fn answer(&self, call: String, key: &str) -> Result<Outcome, MvgError> {
        self.calls.lock().unwrap().push(call);
        let Some(reply) = self.next_reply(key) else {
            return Ok(Outcome::Departures(Vec::new()));
        };

        tokio::time::sleep(reply.delay).await;

        match reply.outcome {
            Outcome::Status(code) => Err(MvgError::from_status(
                reqwest::StatusCode::from_u16(code).unwrap(),
            )),
            Outcome::Malformed => Err(MvgError::Parse {
                message: "expected value at line 1 column 1".to_string(),
                body: Some("<html>".to_string()),
            }),
            other => Ok(other),
        }
    }
}

impl TransitApi for ScriptedApi {
    async fn departures(&self, query: &DepartureQuery) -> Result<Vec<Departure>, MvgError> {
        let key = query.global_id.to_string();
        match self.answer(format!("departures:{key}"), &key).await? {
            Outcome::Departures(d) => Ok(d),
            _ => Ok(Vec::new()),
        }
    }

    async fn locations(&self, query: &str) -> Result<Vec<Station>, MvgError> {
        match self.answer(format!("locations:{query}"), query).await? {
            Outcome::Stations(s) => Ok(s),
            _ => Ok(Vec::new()),
        }
    }
}
