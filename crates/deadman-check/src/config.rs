//! Check configuration.
//!
//! Built once at startup and shared read-only by every cycle.

use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Public healthchecks.io ping endpoint.
pub const DEFAULT_HEALTHCHECKS_BASE_URL: &str = "https://hc-ping.com";

/// Default budget for a single outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time between check cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Configuration of the check loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Identifier of the check on the notification service.
    pub check_uuid: String,
    /// Base URL of the notification (healthchecks) service.
    pub healthchecks_base_url: Url,
    /// Base URL of the Prometheus server.
    pub prometheus_base_url: Url,
    /// Budget for each individual request.
    pub timeout: Duration,
    /// Time between cycles; also the budget of one cycle.
    pub interval: Duration,
}

impl CheckConfig {
    /// Create a config with the default timeout and interval.
    pub fn new(
        check_uuid: impl Into<String>,
        healthchecks_base_url: Url,
        prometheus_base_url: Url,
    ) -> Self {
        Self {
            check_uuid: check_uuid.into(),
            healthchecks_base_url,
            prometheus_base_url,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Reject configurations the loop cannot run with.
    ///
    /// A timeout longer than the interval is allowed but logged: cycles
    /// will overlap or run out of budget before their outcome ping.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.check_uuid.trim().is_empty() {
            return Err(ConfigError::EmptyCheckUuid);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        for url in [&self.healthchecks_base_url, &self.prometheus_base_url] {
            if url.cannot_be_a_base() {
                return Err(ConfigError::CannotBeABase(url.to_string()));
            }
        }
        if self.timeout > self.interval {
            warn!(
                timeout = ?self.timeout,
                interval = ?self.interval,
                "timeout exceeds check interval"
            );
        }
        Ok(())
    }
}

/// Append path segments to a base URL, keeping the base's own path.
///
/// `http://prom:9090/prefix/` joined with `["api", "v1", "alerts"]` gives
/// `http://prom:9090/prefix/api/v1/alerts`. Segments are percent-encoded.
pub fn join_path(base: &Url, segments: &[&str]) -> ConfigResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ConfigError::CannotBeABase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Parse a duration string like "30s", "500ms", "5m", "1h" or "1m30s".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> ConfigResult<Duration> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    if s.is_empty() {
        return Err(invalid());
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total_ms: u64 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit_ms: u64 = match &rest[..unit_len] {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total_ms = value
            .checked_mul(unit_ms)
            .and_then(|ms| total_ms.checked_add(ms))
            .ok_or_else(invalid)?;
    }

    Ok(Duration::from_millis(total_ms))
}
