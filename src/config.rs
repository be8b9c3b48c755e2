//! Configuration for the render visualizer.
//!
//! Defaults match the fixed behavior: 500 ms sync interval and 20 log
//! entries per record. Both can be overridden through the environment
//! while debugging:
//!
//! - `RENDER_VISUALIZER_INTERVAL_MS` - synchronization interval
//! - `RENDER_VISUALIZER_MAX_LOG` - log entries kept per record

use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

use crate::record::MAX_LOG_LENGTH;
use crate::sync::SYNC_INTERVAL;

pub const INTERVAL_VAR: &str = "RENDER_VISUALIZER_INTERVAL_MS";
pub const MAX_LOG_VAR: &str = "RENDER_VISUALIZER_MAX_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid number: {source}")]
    InvalidNumber {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerConfig {
    /// Time between position synchronization ticks.
    pub sync_interval: Duration,
    /// Log entries kept per record.
    pub max_log_len: usize,
    /// Max delay between two clicks of a double click.
    pub double_click: Duration,
    /// Widest a badge may get, as a fraction of the viewport width.
    pub max_badge_width_ratio: f32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            sync_interval: SYNC_INTERVAL,
            max_log_len: MAX_LOG_LENGTH,
            double_click: Duration::from_millis(400),
            max_badge_width_ratio: 0.7,
        }
    }
}

impl VisualizerConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults with overrides from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse_positive(INTERVAL_VAR, lookup(INTERVAL_VAR))? {
            config.sync_interval = Duration::from_millis(ms);
        }
        if let Some(len) = parse_positive(MAX_LOG_VAR, lookup(MAX_LOG_VAR))? {
            config.max_log_len = len as usize;
        }

        Ok(config)
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_max_log_len(mut self, len: usize) -> Self {
        self.max_log_len = len;
        self
    }

    pub fn with_double_click(mut self, window: Duration) -> Self {
        self.double_click = window;
        self
    }
}

fn parse_positive(var: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|source| ConfigError::InvalidNumber {
            var,
            value: value.clone(),
            source,
        })?;
    if parsed == 0 {
        return Err(ConfigError::Zero { var });
    }
    Ok(Some(parsed))
}
