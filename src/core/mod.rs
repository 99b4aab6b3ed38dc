//! Core logger types and traits

pub mod backoff;
pub mod config;
pub mod error;
pub mod formatter;
pub mod full_policy;
pub mod identity;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod sink;

pub use backoff::BackoffConfig;
pub use config::{LoggerConfig, LoggerKind, DEFAULT_FLUSH_INTERVAL, DEFAULT_QUEUE_CAPACITY};
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, FormatterTimeZone, DEFAULT_LINE_ENDING, DEFAULT_PATTERN};
pub use full_policy::{AtomicFullPolicy, FullPolicy};
pub use log_level::{AtomicLogLevel, LogLevel};
pub use log_record::{Calendar, LogRecord, RecordStatus};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use queue::BoundedQueue;
pub use registry::LoggerRegistry;
pub use sink::{BaseSink, Sink, SinkBackend};
