//! Sink trait for log output destinations
//!
//! Sinks are shared between loggers as `Arc<dyn Sink>`, so every method takes
//! `&self`. Most sinks are written as a [`SinkBackend`] holding mutable state
//! and wrapped in a [`BaseSink`], which supplies the level filter and the lock.

use super::error::Result;
use super::log_level::{AtomicLogLevel, LogLevel};
use super::log_record::LogRecord;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

pub trait Sink: Send + Sync {
    /// Deliver one formatted record; level filtering is the caller's job
    fn write(&self, record: &LogRecord) -> Result<()>;

    fn flush(&self) -> Result<()>;

    fn level(&self) -> LogLevel;

    fn set_level(&self, level: LogLevel);

    /// True when a record at `level` passes this sink's threshold
    #[inline]
    fn check_level(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    fn name(&self) -> &str;
}

/// Mutable half of a sink, always accessed under the owning [`BaseSink`] lock
pub trait SinkBackend: Send {
    const NAME: &'static str;

    fn write_record(&mut self, record: &LogRecord) -> Result<()>;

    fn flush_backend(&mut self) -> Result<()>;

    /// Wrap the backend into a shareable sink
    fn into_sink(self) -> Arc<BaseSink<Self>>
    where
        Self: Sized + 'static,
    {
        Arc::new(BaseSink::new(self))
    }
}

pub struct BaseSink<B> {
    level: AtomicLogLevel,
    backend: Mutex<B>,
}

impl<B: SinkBackend> BaseSink<B> {
    pub fn new(backend: B) -> Self {
        Self {
            level: AtomicLogLevel::default(),
            backend: Mutex::new(backend),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.level.store(level);
        self
    }

    /// Exclusive access to the backend, e.g. for backend-specific setters
    pub fn lock(&self) -> MutexGuard<'_, B> {
        self.backend.lock()
    }

    pub fn into_inner(self) -> B {
        self.backend.into_inner()
    }
}

impl<B: SinkBackend> Sink for BaseSink<B> {
    fn write(&self, record: &LogRecord) -> Result<()> {
        self.backend.lock().write_record(record)
    }

    fn flush(&self) -> Result<()> {
        self.backend.lock().flush_backend()
    }

    fn level(&self) -> LogLevel {
        self.level.load()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    fn name(&self) -> &str {
        B::NAME
    }
}

impl<B: SinkBackend> fmt::Debug for BaseSink<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseSink")
            .field("name", &B::NAME)
            .field("level", &self.level.load())
            .finish()
    }
}
