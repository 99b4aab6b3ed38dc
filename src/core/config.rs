//! Logger configuration
//!
//! Programmatic configuration shared by [`LoggerBuilder`](super::LoggerBuilder)
//! and [`LoggerRegistry`](super::LoggerRegistry). The type derives serde so an
//! application can load it from whatever format it already uses.

use super::backoff::BackoffConfig;
use super::error::{LoggerError, Result};
use super::formatter::DEFAULT_PATTERN;
use super::full_policy::FullPolicy;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 32 * 1024;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// How records reach the sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoggerKind {
    /// Written on the calling thread
    #[default]
    Sync,
    /// Queued for a dedicated worker thread
    Async,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    /// Records at or above this level force an immediate flush
    pub auto_flush_level: LogLevel,
    pub full_policy: FullPolicy,
    /// Sinks are flushed at least this often while records arrive
    #[serde(with = "millis")]
    pub flush_interval: Duration,
    pub pattern: String,
    /// Async queue size; must be a power of two
    pub queue_capacity: usize,
    pub backoff: BackoffConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Trace,
            auto_flush_level: LogLevel::Fatal,
            full_policy: FullPolicy::Retry,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            pattern: DEFAULT_PATTERN.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backoff: BackoffConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Check values that would otherwise fail when a logger is built
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity < 2 || !self.queue_capacity.is_power_of_two() {
            return Err(LoggerError::invalid_capacity(self.queue_capacity));
        }
        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
