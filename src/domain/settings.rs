//! Service settings, validated from configuration before anything starts.

use crate::domain::error::PositionError;
use crate::ports::config_port::ConfigPort;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".";
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::London;
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How the delay grows between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Constant,
    Linear,
    Exponential,
}

impl Backoff {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "constant" => Some(Self::Constant),
            "linear" => Some(Self::Linear),
            "exponential" => Some(Self::Exponential),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_retry_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            backoff: Backoff::Exponential,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub interval: Duration,
    pub output_directory: PathBuf,
    pub trades_directory: Option<PathBuf>,
    pub retry: RetrySettings,
    pub local_zone: Tz,
    pub market_zone: Tz,
    pub log_level: String,
}

impl ServiceSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PositionError> {
        Ok(Self {
            interval: parse_interval(config)?,
            output_directory: config
                .get_string("export", "output_directory")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
            trades_directory: config
                .get_string("trades", "directory")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            retry: parse_retry(config)?,
            local_zone: parse_zone(config, "local_zone")?,
            market_zone: parse_zone(config, "market_zone")?,
            log_level: config
                .get_string("logging", "level")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Directory the file-backed trade source reads from.
    pub fn require_trades_directory(&self) -> Result<&PathBuf, PositionError> {
        self.trades_directory
            .as_ref()
            .ok_or_else(|| PositionError::ConfigMissing {
                section: "trades".to_string(),
                key: "directory".to_string(),
            })
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PositionError {
    PositionError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_interval(config: &dyn ConfigPort) -> Result<Duration, PositionError> {
    let raw = config
        .get_string("trigger", "interval_minutes")
        .ok_or_else(|| PositionError::ConfigMissing {
            section: "trigger".to_string(),
            key: "interval_minutes".to_string(),
        })?;
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("trigger", "interval_minutes", "must be an integer"))?;
    if minutes <= 0 {
        return Err(invalid(
            "trigger",
            "interval_minutes",
            "interval_minutes must be positive",
        ));
    }
    let seconds = u64::try_from(minutes)
        .ok()
        .and_then(|m| m.checked_mul(60))
        .ok_or_else(|| invalid("trigger", "interval_minutes", "interval_minutes is too large"))?;
    Ok(Duration::from_secs(seconds))
}

fn parse_non_negative(
    config: &dyn ConfigPort,
    key: &str,
    default: u64,
) -> Result<u64, PositionError> {
    let value = config.get_int("retry", key, default as i64);
    u64::try_from(value).map_err(|_| invalid("retry", key, format!("{key} must be non-negative")))
}

fn parse_retry(config: &dyn ConfigPort) -> Result<RetrySettings, PositionError> {
    let attempts = parse_non_negative(
        config,
        "max_retry_attempts",
        DEFAULT_MAX_RETRY_ATTEMPTS as u64,
    )?;
    let max_retry_attempts = u32::try_from(attempts)
        .map_err(|_| invalid("retry", "max_retry_attempts", "max_retry_attempts is too large"))?;
    let initial_ms = parse_non_negative(config, "initial_delay_ms", DEFAULT_INITIAL_DELAY_MS)?;
    let max_ms = parse_non_negative(config, "max_delay_ms", DEFAULT_MAX_DELAY_MS)?;
    if max_ms < initial_ms {
        return Err(invalid(
            "retry",
            "max_delay_ms",
            "max_delay_ms must not be less than initial_delay_ms",
        ));
    }
    let backoff = match config.get_string("retry", "backoff") {
        None => Backoff::Exponential,
        Some(s) => Backoff::parse(&s).ok_or_else(|| {
            invalid(
                "retry",
                "backoff",
                format!("unknown backoff '{s}', expected constant, linear or exponential"),
            )
        })?,
    };
    Ok(RetrySettings {
        max_retry_attempts,
        initial_delay: Duration::from_millis(initial_ms),
        max_delay: Duration::from_millis(max_ms),
        backoff,
    })
}

fn parse_zone(config: &dyn ConfigPort, key: &str) -> Result<Tz, PositionError> {
    match config.get_string("time", key) {
        None => Ok(DEFAULT_ZONE),
        Some(name) => name
            .trim()
            .parse::<Tz>()
            .map_err(|_| invalid("time", key, format!("unknown time zone '{name}'"))),
    }
}
