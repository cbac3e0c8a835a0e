//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on malformed values. Every variable
//! is optional; CLI flags override what is loaded here.

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENT: usize = 4;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on concurrently running workers.
    pub max_concurrent: usize,
    /// Per-request timeout handed to the HTTP transport.
    pub probe_timeout: Duration,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let max_concurrent = positive_var("FANOUT_MAX_CONCURRENT")?
            .unwrap_or(DEFAULT_MAX_CONCURRENT as u64) as usize;
        let probe_timeout = match positive_var("FANOUT_PROBE_TIMEOUT_SECS")? {
            Some(secs) => probe_timeout_secs(secs)?,
            None => Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        };

        Ok(Self {
            max_concurrent,
            probe_timeout,
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok().filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Probe timeout from a whole number of seconds. Zero would fail every
/// request, so it is rejected.
pub fn probe_timeout_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("probe timeout must be at least 1 second".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

fn positive_var(name: &str) -> Result<Option<u64>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::Config(format!("{name} must be at least 1"))),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(Error::Config(format!("{name}={raw:?} is not a number: {e}"))),
    }
}
