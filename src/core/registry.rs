//! Named logger lookup and creation
//!
//! A [`LoggerRegistry`] maps fully qualified names (`app` or `app.name`) to
//! shared [`Logger`] instances. It is an ordinary value owned by the
//! application; nothing here is global.

use super::{
    config::{LoggerConfig, LoggerKind},
    error::{LoggerError, Result},
    formatter::Formatter,
    full_policy::FullPolicy,
    identity,
    log_level::LogLevel,
    logger::Logger,
    sink::{Sink, SinkBackend},
};
use crate::sinks::{DailyFileSink, FileSink, NullSink, OStreamSink, RotatingFileSink, SinkList};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub struct LoggerRegistry {
    app_name: String,
    config: LoggerConfig,
    loggers: Mutex<BTreeMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Registry whose loggers are named after `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        Self::from_parts(app_name.into(), LoggerConfig::default())
    }

    /// Registry named after the running executable
    pub fn for_current_process() -> Self {
        Self::new(identity::application_name())
    }

    /// Registry creating every logger from `config`
    ///
    /// Fails with [`LoggerError::InvalidCapacity`] when `config` could not
    /// build an async logger.
    pub fn with_config(app_name: impl Into<String>, config: LoggerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(app_name.into(), config))
    }

    fn from_parts(app_name: String, config: LoggerConfig) -> Self {
        Self {
            app_name,
            config,
            loggers: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// `app` for an empty name, `app.name` otherwise
    pub fn full_name(&self, name: &str) -> String {
        if name.is_empty() {
            self.app_name.clone()
        } else {
            format!("{}.{}", self.app_name, name)
        }
    }

    /// Get the logger called `name`, creating it with `kind` on first use
    ///
    /// An existing logger is returned as is, whatever its kind.
    ///
    /// # Example
    /// ```
    /// use tiny_logger::prelude::*;
    ///
    /// let registry = LoggerRegistry::new("shop");
    /// let db = registry.get(LoggerKind::Async, "db").unwrap();
    /// let again = registry.get(LoggerKind::Sync, "db").unwrap();
    ///
    /// assert_eq!(db.name(), "shop.db");
    /// assert_eq!(again.kind(), LoggerKind::Async);
    /// ```
    pub fn get(&self, kind: LoggerKind, name: &str) -> Result<Arc<Logger>> {
        self.resolve(kind, self.full_name(name))
    }

    pub fn get_sync(&self, name: &str) -> Result<Arc<Logger>> {
        self.get(LoggerKind::Sync, name)
    }

    pub fn get_async(&self, name: &str) -> Result<Arc<Logger>> {
        self.get(LoggerKind::Async, name)
    }

    /// Look up a logger by its fully qualified name without creating it
    pub fn find(&self, full_name: &str) -> Option<Arc<Logger>> {
        self.loggers.lock().get(full_name).cloned()
    }

    /// Get `parent.suffix`, creating it with the parent's kind
    pub fn get_child(&self, parent: &Logger, suffix: &str) -> Result<Arc<Logger>> {
        if suffix.is_empty() {
            return Err(LoggerError::config(
                "registry",
                format!("empty child name for logger '{}'", parent.name()),
            ));
        }
        self.resolve(parent.kind(), format!("{}.{}", parent.name(), suffix))
    }

    fn resolve(&self, kind: LoggerKind, full_name: String) -> Result<Arc<Logger>> {
        let mut loggers = self.loggers.lock();
        if let Some(logger) = loggers.get(&full_name) {
            return Ok(Arc::clone(logger));
        }

        let logger = Arc::new(
            Logger::builder(full_name.clone())
                .config(self.config.clone())
                .build(kind)?,
        );
        loggers.insert(full_name, Arc::clone(&logger));
        Ok(logger)
    }

    /// Get or create `name` and attach `sink` to it
    pub fn register(
        &self,
        kind: LoggerKind,
        name: &str,
        sink: Arc<dyn Sink>,
    ) -> Result<Arc<Logger>> {
        let logger = self.get(kind, name)?;
        logger.add_sink(sink);
        Ok(logger)
    }

    /// Get or create `parent.suffix` and attach `sink` to it
    pub fn register_child(
        &self,
        parent: &Logger,
        suffix: &str,
        sink: Arc<dyn Sink>,
    ) -> Result<Arc<Logger>> {
        let logger = self.get_child(parent, suffix)?;
        logger.add_sink(sink);
        Ok(logger)
    }

    pub fn null_logger(&self, kind: LoggerKind, name: &str) -> Result<Arc<Logger>> {
        self.register(kind, name, NullSink.into_sink())
    }

    /// Logger appending to the file at `path`
    pub fn file_logger(
        &self,
        kind: LoggerKind,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<Arc<Logger>> {
        self.file_logger_with(kind, name, path, false)
    }

    /// Logger writing to the file at `path`, emptying it first when `truncate` is set
    pub fn file_logger_with(
        &self,
        kind: LoggerKind,
        name: &str,
        path: impl Into<PathBuf>,
        truncate: bool,
    ) -> Result<Arc<Logger>> {
        self.register(kind, name, FileSink::open(path, truncate)?.into_sink())
    }

    /// Logger appending to `<exe dir>/log/<app>.log`
    pub fn default_file_logger(&self, kind: LoggerKind, name: &str) -> Result<Arc<Logger>> {
        self.file_logger(kind, name, identity::default_log_path())
    }

    /// Logger writing to a new dated file every day at `hour:minute:second`
    pub fn daily_file_logger(
        &self,
        kind: LoggerKind,
        name: &str,
        path: impl Into<PathBuf>,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Arc<Logger>> {
        let sink = DailyFileSink::new(path, hour, minute, second)?;
        self.register(kind, name, sink.into_sink())
    }

    pub fn rotating_file_logger(
        &self,
        kind: LoggerKind,
        name: &str,
        path: impl Into<PathBuf>,
        max_size: u64,
        max_files: usize,
    ) -> Result<Arc<Logger>> {
        let sink = RotatingFileSink::with_limits(path, max_size, max_files)?;
        self.register(kind, name, sink.into_sink())
    }

    pub fn ostream_logger<W>(&self, kind: LoggerKind, name: &str, writer: W) -> Result<Arc<Logger>>
    where
        W: Write + Send + 'static,
    {
        self.register(kind, name, OStreamSink::new(writer).into_sink())
    }

    #[cfg(feature = "console")]
    pub fn console_logger(
        &self,
        kind: LoggerKind,
        name: &str,
        target: crate::sinks::ConsoleTarget,
    ) -> Result<Arc<Logger>> {
        let sink = crate::sinks::ConsoleSink::new(target, true);
        self.register(kind, name, sink.into_sink())
    }

    #[cfg(all(unix, feature = "syslog"))]
    pub fn syslog_logger(&self, kind: LoggerKind, name: &str) -> Result<Arc<Logger>> {
        let sink = crate::sinks::SyslogSink::new()?.with_ident(self.app_name.clone());
        self.register(kind, name, sink.into_sink())
    }

    /// Run `f` on every registered logger while holding the registry lock
    pub fn apply<F>(&self, mut f: F)
    where
        F: FnMut(&Logger),
    {
        for logger in self.loggers.lock().values() {
            f(logger);
        }
    }

    pub fn set_level(&self, level: LogLevel) {
        self.apply(|logger| logger.set_level(level));
    }

    pub fn set_auto_flush_level(&self, level: LogLevel) {
        self.apply(|logger| logger.set_auto_flush_level(level));
    }

    pub fn set_full_policy(&self, policy: FullPolicy) {
        self.apply(|logger| logger.set_full_policy(policy));
    }

    pub fn set_flush_interval(&self, interval: Duration) {
        self.apply(|logger| logger.set_flush_interval(interval));
    }

    /// Install one formatter shared by every registered logger
    pub fn set_formatter(&self, formatter: Formatter) {
        let formatter = Arc::new(formatter);
        self.apply(|logger| logger.set_shared_formatter(Arc::clone(&formatter)));
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Formatter::compile(pattern));
    }

    /// Flush every registered logger, reporting the first failure
    pub fn flush_all(&self) -> Result<()> {
        let mut first_error = None;
        self.apply(|logger| {
            if let Err(e) = logger.flush() {
                first_error.get_or_insert(e);
            }
        });
        first_error.map_or(Ok(()), Err)
    }

    /// Unregister a logger by fully qualified name
    ///
    /// The logger shuts down once the last outstanding handle is dropped.
    pub fn remove(&self, full_name: &str) -> Option<Arc<Logger>> {
        self.loggers.lock().remove(full_name)
    }

    pub fn remove_all(&self) {
        // Drop outside the lock; async loggers join their workers on drop
        let removed = std::mem::take(&mut *self.loggers.lock());
        drop(removed);
    }

    pub fn names(&self) -> Vec<String> {
        self.loggers.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    /// Sinks of a registered logger, if present
    pub fn sinks_of(&self, full_name: &str) -> Option<Arc<SinkList>> {
        self.find(full_name).map(|logger| logger.sinks().snapshot())
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("app_name", &self.app_name)
            .field("loggers", &self.names())
            .finish()
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::for_current_process()
    }
}
