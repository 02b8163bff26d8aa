//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::mvg::MvgConfig;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

pub const BASE_URL_VAR: &str = "MVG_BASE_URL";
pub const PIN_FILE_VAR: &str = "MVG_PIN_FILE";
pub const LISTEN_ADDR_VAR: &str = "MVG_LISTEN_ADDR";
pub const POLL_SECS_VAR: &str = "MVG_POLL_SECS";
pub const TIMEOUT_SECS_VAR: &str = "MVG_TIMEOUT_SECS";

/// Everything `main` needs to wire the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mvg: MvgConfig,

    /// JSON file holding the home and work pins.
    pub pin_file: PathBuf,

    pub listen_addr: SocketAddr,

    /// Time between departure polls.
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let mut mvg = defaults.mvg;
        if let Some(url) = get(BASE_URL_VAR) {
            mvg = mvg.with_base_url(url.trim());
        }
        if let Some(raw) = get(TIMEOUT_SECS_VAR) {
            mvg = mvg.with_timeout(parse_secs(TIMEOUT_SECS_VAR, &raw)?);
        }

        let pin_file = get(PIN_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.pin_file);

        let listen_addr = match get(LISTEN_ADDR_VAR) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidAddr {
                var: LISTEN_ADDR_VAR,
                value: raw,
            })?,
            None => defaults.listen_addr,
        };

        let poll_interval = match get(POLL_SECS_VAR) {
            Some(raw) => Duration::from_secs(parse_secs(POLL_SECS_VAR, &raw)?),
            None => defaults.poll_interval,
        };

        Ok(Self {
            mvg,
            pin_file,
            listen_addr,
            poll_interval,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mvg: MvgConfig::default(),
            pin_file: PathBuf::from("mvg_pins.json"),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            poll_interval: crate::feed::DEFAULT_POLL_INTERVAL,
        }
    }
}

fn parse_secs(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: raw.to_string(),
        }),
    }
}
