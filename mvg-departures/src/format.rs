//! Display formatting for departures.
//!
//! Pure functions turning timestamps and enums into the strings and icon
//! categories shown on the board. Clock times are rendered in Munich local
//! time.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use serde::Serialize;

use crate::domain::{Departure, Occupancy, Station, TransportType};

/// Icon family for a line or station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IconCategory {
    /// Train-like icon (U-Bahn, S-Bahn, tram, anything unknown)
    Rail,
    /// Road vehicle icon (bus)
    Road,
}

/// Colour applied to a departure's icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tint {
    /// Red
    Cancelled,
    /// Orange
    Delayed,
    /// Blue
    OnTime,
}

/// Minutes until departure, as shown in the accessory column.
///
/// Whole minutes are floored, so anything less than a minute away (or
/// already past) reads "Now".
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Duration};
/// use mvg_departures::format::relative_eta;
///
/// let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// assert_eq!(relative_eta(now - Duration::minutes(2), now), "Now");
/// assert_eq!(relative_eta(now + Duration::seconds(90), now), "1 min");
/// assert_eq!(relative_eta(now + Duration::minutes(12), now), "12 min");
/// ```
pub fn relative_eta(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match minutes_until(timestamp, now) {
        m if m <= 0 => "Now".to_string(),
        1 => "1 min".to_string(),
        m => format!("{m} min"),
    }
}

/// Floored whole minutes from `now` until `timestamp` (negative if past).
pub fn minutes_until(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (timestamp - now).num_milliseconds().div_euclid(60_000)
}

/// `HH:MM` in Munich local time.
pub fn clock_time(timestamp: DateTime<Utc>) -> String {
    clock_time_in(timestamp, &Berlin)
}

/// `HH:MM` (24-hour) in the given time zone.
pub fn clock_time_in<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format("%H:%M").to_string()
}

/// Section heading for a mode. Unknown modes are shown as received.
pub fn transport_display_name(transport: &TransportType) -> &str {
    match transport {
        TransportType::Ubahn => "U-Bahn",
        TransportType::Sbahn => "S-Bahn",
        TransportType::Tram => "Tram",
        TransportType::Bus => "Bus",
        TransportType::Other(raw) => raw,
    }
}

/// Icon for a line. Unrecognised modes default to rail.
pub fn icon_category(transport: &TransportType) -> IconCategory {
    match transport {
        TransportType::Bus => IconCategory::Road,
        _ => IconCategory::Rail,
    }
}

/// Icon for a station in search results and the station picker.
pub fn station_icon(station: &Station) -> IconCategory {
    if station.serves_rail() {
        IconCategory::Rail
    } else {
        IconCategory::Road
    }
}

pub fn departure_title(departure: &Departure) -> String {
    format!("{} → {}", departure.label, departure.destination)
}

/// Second line of a departure row.
pub fn departure_subtitle<Tz: TimeZone>(departure: &Departure, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if departure.cancelled {
        return "CANCELLED".to_string();
    }

    let clock = clock_time_in(departure.realtime_departure, tz);
    let mut subtitle = match departure.platform {
        Some(platform) => format!("Platform {platform} • {clock}"),
        None => clock,
    };

    if departure.is_delayed() {
        subtitle.push_str(&format!(" • +{} min delay", departure.delay_minutes));
    }

    subtitle
}

pub fn departure_tint(departure: &Departure) -> Tint {
    if departure.cancelled {
        Tint::Cancelled
    } else if departure.is_delayed() {
        Tint::Delayed
    } else {
        Tint::OnTime
    }
}

pub fn departure_tooltip<Tz: TimeZone>(departure: &Departure, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let clock = clock_time_in(departure.realtime_departure, tz);
    if departure.is_delayed() {
        format!("Departure: {clock} (+{} min)", departure.delay_minutes)
    } else {
        format!("Departure: {clock}")
    }
}

pub fn occupancy_tooltip(occupancy: &Occupancy) -> String {
    format!("Occupancy: {occupancy}")
}

/// "1 departure" / "N departures".
pub fn count_summary(count: usize) -> String {
    if count == 1 {
        "1 departure".to_string()
    } else {
        format!("{count} departures")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn eta_minutes(s: &str) -> i64 {
        if s == "Now" {
            0
        } else {
            s.trim_end_matches(" min").parse().unwrap()
        }
    }

    proptest! {
        /// Anything at or before now reads "Now"
        #[test]
        fn past_is_now(now_ms in 0i64..4_000_000_000_000, back in 0i64..100_000_000) {
            let now = DateTime::from_timestamp_millis(now_ms).unwrap();
            let ts = now - Duration::milliseconds(back);
            prop_assert_eq!(relative_eta(ts, now), "Now");
        }

        /// The second minute window always reads "1 min"
        #[test]
        fn one_minute_window(now_ms in 0i64..4_000_000_000_000, ahead in 60_000i64..120_000) {
            let now = DateTime::from_timestamp_millis(now_ms).unwrap();
            let ts = now + Duration::milliseconds(ahead);
            prop_assert_eq!(relative_eta(ts, now), "1 min");
        }

        /// Later departures never show a smaller ETA
        #[test]
        fn monotonic(now_ms in 0i64..4_000_000_000_000, a in -10_000_000i64..10_000_000, b in -10_000_000i64..10_000_000) {
            let now = DateTime::from_timestamp_millis(now_ms).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let eta_lo = eta_minutes(&relative_eta(now + Duration::milliseconds(lo), now));
            let eta_hi = eta_minutes(&relative_eta(now + Duration::milliseconds(hi), now));
            prop_assert!(eta_lo <= eta_hi);
        }

        /// Clock output is always HH:MM
        #[test]
        fn clock_shape(ms in 0i64..4_000_000_000_000) {
            let s = clock_time(DateTime::from_timestamp_millis(ms).unwrap());
            prop_assert_eq!(s.len(), 5);
            prop_assert_eq!(&s[2..3], ":");
        }
    }
}
