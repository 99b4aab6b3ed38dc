//! Main logger implementation
//!
//! A [`Logger`] formats records on the calling thread and hands them to its
//! [`ManagerSink`]. A synchronous logger writes immediately; an asynchronous
//! logger pushes the formatted record onto a [`BoundedQueue`] drained by one
//! worker thread, which also handles `Flush` and `Terminate` control records
//! in order with the writes.

use super::{
    backoff::BackoffConfig,
    config::{LoggerConfig, LoggerKind},
    error::{LoggerError, Result},
    formatter::Formatter,
    full_policy::{AtomicFullPolicy, FullPolicy},
    log_level::{AtomicLogLevel, LogLevel},
    log_record::{LogRecord, RecordStatus},
    metrics::LoggerMetrics,
    queue::BoundedQueue,
    sink::Sink,
};
use crate::sinks::manager::{panic_message, ManagerSink};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// State shared between a logger and its worker thread
struct LoggerShared {
    name: Arc<str>,
    kind: LoggerKind,
    level: AtomicLogLevel,
    auto_flush_level: AtomicLogLevel,
    full_policy: AtomicFullPolicy,
    flush_interval_ms: AtomicU64,
    formatter: ArcSwap<Formatter>,
    sinks: ManagerSink,
    metrics: LoggerMetrics,
    message_id: AtomicU64,
    backoff: BackoffConfig,
    /// Records fully handled by the worker, control records included
    completed: AtomicU64,
    worker_alive: AtomicBool,
}

impl LoggerShared {
    fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.load(Ordering::Relaxed))
    }

    fn should_flush(&self, level: LogLevel, last_flush: Instant) -> bool {
        level >= self.auto_flush_level.load() || last_flush.elapsed() >= self.flush_interval()
    }

    /// Write one record through the fan-out and account for the outcome
    fn deliver(&self, record: &LogRecord) -> Result<()> {
        match self.sinks.write(record) {
            Ok(()) => {
                self.metrics.record_logged();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_sink_failure();
                Err(e)
            }
        }
    }

    fn report(&self, what: &str, error: &LoggerError) {
        eprintln!("[LOGGER ERROR] Logger '{}' {}: {}", self.name, what, error);
    }

    fn record_discard(&self) {
        self.metrics.record_queue_full();
        let dropped_count = self.metrics.record_dropped();

        // Alert on first drop and periodically thereafter
        if dropped_count == 0 || (dropped_count + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' queue full, {} records discarded. \
                 Consider a larger queue or the Retry policy.",
                self.name,
                dropped_count + 1
            );
        }
    }
}

enum Transport {
    Sync {
        last_flush: Mutex<Instant>,
    },
    Async {
        queue: Arc<BoundedQueue<LogRecord>>,
        submitted: AtomicU64,
        worker: Option<JoinHandle<()>>,
    },
}

pub struct Logger {
    shared: Arc<LoggerShared>,
    transport: Transport,
}

impl Logger {
    /// Create a builder for a logger called `name`
    ///
    /// # Example
    /// ```
    /// use tiny_logger::prelude::*;
    ///
    /// let logger = Logger::builder("app")
    ///     .level(LogLevel::Debug)
    ///     .pattern("%T [%L] %v")
    ///     .sink(NullSink.into_sink())
    ///     .build_async()
    ///     .unwrap();
    ///
    /// logger.info("started");
    /// logger.wait();
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    /// Synchronous logger with the given configuration
    pub fn new_sync(name: impl Into<String>, config: LoggerConfig) -> Logger {
        let formatter = Formatter::compile(config.pattern.as_str());
        Self::sync_with(Self::shared(name.into(), LoggerKind::Sync, &config, formatter))
    }

    /// Asynchronous logger with the given configuration
    ///
    /// Fails if the queue capacity is invalid or the worker cannot be spawned.
    pub fn new_async(name: impl Into<String>, config: LoggerConfig) -> Result<Logger> {
        let formatter = Formatter::compile(config.pattern.as_str());
        Self::async_with(
            Self::shared(name.into(), LoggerKind::Async, &config, formatter),
            config.queue_capacity,
        )
    }

    fn shared(
        name: String,
        kind: LoggerKind,
        config: &LoggerConfig,
        formatter: Formatter,
    ) -> LoggerShared {
        LoggerShared {
            name: Arc::from(name),
            kind,
            level: AtomicLogLevel::new(config.level),
            auto_flush_level: AtomicLogLevel::new(config.auto_flush_level),
            full_policy: AtomicFullPolicy::new(config.full_policy),
            flush_interval_ms: AtomicU64::new(config.flush_interval.as_millis() as u64),
            formatter: ArcSwap::from_pointee(formatter),
            sinks: ManagerSink::new(),
            metrics: LoggerMetrics::new(),
            message_id: AtomicU64::new(1),
            backoff: config.backoff,
            completed: AtomicU64::new(0),
            worker_alive: AtomicBool::new(false),
        }
    }

    fn sync_with(shared: LoggerShared) -> Logger {
        Logger {
            shared: Arc::new(shared),
            transport: Transport::Sync {
                last_flush: Mutex::new(Instant::now()),
            },
        }
    }

    fn async_with(shared: LoggerShared, capacity: usize) -> Result<Logger> {
        let queue = Arc::new(BoundedQueue::new(capacity)?);
        shared.worker_alive.store(true, Ordering::Release);
        let shared = Arc::new(shared);

        let worker_shared = Arc::clone(&shared);
        let worker_queue = Arc::clone(&queue);
        let worker = thread::Builder::new()
            .name(format!("logger-{}", shared.name))
            .spawn(move || run_worker(worker_shared, worker_queue))
            .map_err(|source| LoggerError::WorkerSpawn {
                logger: shared.name.to_string(),
                source,
            })?;

        Ok(Logger {
            shared,
            transport: Transport::Async {
                queue,
                submitted: AtomicU64::new(0),
                worker: Some(worker),
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn kind(&self) -> LoggerKind {
        self.shared.kind
    }

    pub fn level(&self) -> LogLevel {
        self.shared.level.load()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.shared.level.store(level);
    }

    pub fn auto_flush_level(&self) -> LogLevel {
        self.shared.auto_flush_level.load()
    }

    pub fn set_auto_flush_level(&self, level: LogLevel) {
        self.shared.auto_flush_level.store(level);
    }

    /// Policy applied when the async queue is full; ignored by sync loggers
    pub fn full_policy(&self) -> FullPolicy {
        self.shared.full_policy.load()
    }

    pub fn set_full_policy(&self, policy: FullPolicy) {
        self.shared.full_policy.store(policy);
    }

    pub fn flush_interval(&self) -> Duration {
        self.shared.flush_interval()
    }

    pub fn set_flush_interval(&self, interval: Duration) {
        self.shared
            .flush_interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn formatter(&self) -> Arc<Formatter> {
        self.shared.formatter.load_full()
    }

    pub fn set_formatter(&self, formatter: Formatter) {
        self.shared.formatter.store(Arc::new(formatter));
    }

    /// Install a formatter shared with other loggers
    pub fn set_shared_formatter(&self, formatter: Arc<Formatter>) {
        self.shared.formatter.store(formatter);
    }

    /// Compile `pattern`, keeping the current time zone and line ending
    pub fn set_pattern(&self, pattern: &str) {
        let current = self.shared.formatter.load();
        let formatter = Formatter::compile(pattern)
            .with_time_zone(current.time_zone())
            .with_line_ending(current.line_ending());
        self.set_formatter(formatter);
    }

    pub fn sinks(&self) -> &ManagerSink {
        &self.shared.sinks
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.shared.sinks.add(sink);
    }

    pub fn remove_sink(&self, sink: &Arc<dyn Sink>) -> bool {
        self.shared.sinks.remove(sink)
    }

    pub fn clear_sinks(&self) {
        self.shared.sinks.clear();
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use tiny_logger::prelude::*;
    ///
    /// let logger = Logger::builder("metrics").build_sync();
    /// logger.info("hello");
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.total_logged(), 1);
    /// assert_eq!(metrics.dropped_count(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// True if a record at `level` would be emitted
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.shared.level.load()
    }

    /// Records currently waiting in the async queue
    pub fn queue_len(&self) -> usize {
        match &self.transport {
            Transport::Sync { .. } => 0,
            Transport::Async { queue, .. } => queue.len(),
        }
    }

    pub fn queue_capacity(&self) -> Option<usize> {
        match &self.transport {
            Transport::Sync { .. } => None,
            Transport::Async { queue, .. } => Some(queue.capacity()),
        }
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        if let Err(e) = self.submit(level, message.into()) {
            self.shared.report("failed to write record", &e);
        }
    }

    /// Log pre-captured format arguments; formatting is skipped for disabled levels
    pub fn log_args(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let payload = match args.as_str() {
            Some(text) => text.to_string(),
            None => fmt::format(args),
        };
        if let Err(e) = self.submit(level, payload) {
            self.shared.report("failed to write record", &e);
        }
    }

    /// Like [`Logger::log`], but returns sink failures instead of reporting them
    ///
    /// Async loggers write on the worker thread, so only queueing is checked.
    pub fn try_log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.submit(level, message.into())
    }

    fn submit(&self, level: LogLevel, payload: String) -> Result<()> {
        let message_id = self.shared.message_id.fetch_add(1, Ordering::Relaxed);
        let mut record = LogRecord::new(Arc::clone(&self.shared.name), level, message_id, payload);
        self.shared.formatter.load().format(&mut record);

        match &self.transport {
            Transport::Sync { last_flush } => self.write_sync(last_flush, &record),
            Transport::Async {
                queue, submitted, ..
            } => {
                self.enqueue(queue, submitted, record, self.shared.full_policy.load());
                Ok(())
            }
        }
    }

    fn write_sync(&self, last_flush: &Mutex<Instant>, record: &LogRecord) -> Result<()> {
        let written = self.shared.deliver(record);

        let flushed = {
            let mut last = last_flush.lock();
            if self.shared.should_flush(record.level, *last) {
                *last = Instant::now();
                true
            } else {
                false
            }
        };

        if flushed {
            written.and(self.shared.sinks.flush())
        } else {
            written
        }
    }

    fn enqueue(
        &self,
        queue: &BoundedQueue<LogRecord>,
        submitted: &AtomicU64,
        record: LogRecord,
        policy: FullPolicy,
    ) {
        let mut record = record;
        let mut waiting_since: Option<Instant> = None;

        loop {
            match queue.write(record) {
                Ok(()) => {
                    submitted.fetch_add(1, Ordering::AcqRel);
                    return;
                }
                Err(rejected) => record = rejected,
            }

            if policy == FullPolicy::Discard || !self.shared.worker_alive.load(Ordering::Acquire) {
                self.shared.record_discard();
                return;
            }

            let since = *waiting_since.get_or_insert_with(|| {
                self.shared.metrics.record_queue_full();
                self.shared.metrics.record_retry();
                Instant::now()
            });
            self.shared.backoff.sleep_or_yield(since);
        }
    }

    /// Flush every sink
    ///
    /// Sync loggers flush immediately. Async loggers queue a flush that runs
    /// after every record submitted before it; use [`Logger::wait`] to block
    /// until it has happened.
    pub fn flush(&self) -> Result<()> {
        match &self.transport {
            Transport::Sync { last_flush } => {
                *last_flush.lock() = Instant::now();
                self.shared.sinks.flush()
            }
            Transport::Async {
                queue, submitted, ..
            } => {
                let record = LogRecord::control(Arc::clone(&self.shared.name), RecordStatus::Flush);
                self.enqueue(queue, submitted, record, FullPolicy::Retry);
                Ok(())
            }
        }
    }

    /// Block until the worker has handled every record submitted so far
    ///
    /// Returns immediately for sync loggers.
    pub fn wait(&self) {
        if let Transport::Async {
            queue, submitted, ..
        } = &self.transport
        {
            let start = Instant::now();
            let target = submitted.load(Ordering::Acquire);
            while self.shared.worker_alive.load(Ordering::Acquire)
                && (self.shared.completed.load(Ordering::Acquire) < target || !queue.is_empty())
            {
                self.shared.backoff.sleep_or_yield(start);
            }
        }
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }
}

/// Marks the worker as gone however it exits, so producers stop waiting on it
struct WorkerGuard<'a>(&'a LoggerShared);

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        self.0.worker_alive.store(false, Ordering::Release);
        if thread::panicking() {
            eprintln!(
                "[LOGGER CRITICAL] Worker thread for logger '{}' died; further records are discarded",
                self.0.name
            );
        }
    }
}

fn run_worker(shared: Arc<LoggerShared>, queue: Arc<BoundedQueue<LogRecord>>) {
    let _guard = WorkerGuard(&shared);
    let mut last_flush = Instant::now();
    let mut last_read = Instant::now();
    let mut dirty = false;
    let mut flush_pending = false;
    let mut stop = false;
    // Control records are acknowledged once their flush has run
    let mut unacknowledged = 0u64;

    loop {
        if let Some(record) = queue.read() {
            last_read = Instant::now();
            match record.status {
                RecordStatus::Write => {
                    if let Err(e) = shared.deliver(&record) {
                        shared.report("failed to write record", &e);
                    }
                    dirty = true;
                    if shared.should_flush(record.level, last_flush) {
                        if let Err(e) = shared.sinks.flush() {
                            shared.report("failed to flush", &e);
                        }
                        last_flush = Instant::now();
                        dirty = false;
                    }
                    shared.completed.fetch_add(1, Ordering::AcqRel);
                }
                RecordStatus::Flush => {
                    flush_pending = true;
                    unacknowledged += 1;
                }
                RecordStatus::Terminate => {
                    flush_pending = true;
                    stop = true;
                    unacknowledged += 1;
                }
            }
            continue;
        }

        if flush_pending || (dirty && last_flush.elapsed() >= shared.flush_interval()) {
            if let Err(e) = shared.sinks.flush() {
                shared.report("failed to flush", &e);
            }
            last_flush = Instant::now();
            dirty = false;
            flush_pending = false;
            shared.completed.fetch_add(unacknowledged, Ordering::AcqRel);
            unacknowledged = 0;
        }

        if stop {
            break;
        }

        shared.backoff.sleep_or_yield(last_read);
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        match &mut self.transport {
            Transport::Sync { .. } => {
                if let Err(e) = self.shared.sinks.flush() {
                    self.shared.report("failed to flush during shutdown", &e);
                }
            }
            Transport::Async {
                queue,
                submitted,
                worker,
            } => {
                let mut record =
                    LogRecord::control(Arc::clone(&self.shared.name), RecordStatus::Terminate);
                let start = Instant::now();
                while self.shared.worker_alive.load(Ordering::Acquire) {
                    match queue.write(record) {
                        Ok(()) => {
                            submitted.fetch_add(1, Ordering::AcqRel);
                            break;
                        }
                        Err(rejected) => record = rejected,
                    }
                    self.shared.backoff.sleep_or_yield(start);
                }

                if let Some(handle) = worker.take() {
                    if let Err(panic) = handle.join() {
                        eprintln!(
                            "[LOGGER ERROR] Worker thread for logger '{}' panicked: {}",
                            self.shared.name,
                            panic_message(&*panic)
                        );
                    }
                }
            }
        }

        // Report any dropped logs
        let dropped = self.shared.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' shutting down with {} dropped records (drop rate: {:.2}%)",
                self.shared.name,
                dropped,
                self.shared.metrics.drop_rate()
            );
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.shared.name)
            .field("kind", &self.shared.kind)
            .field("level", &self.level())
            .field("sinks", &self.shared.sinks)
            .finish()
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use tiny_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder("net")
///     .level(LogLevel::Info)
///     .auto_flush_level(LogLevel::Error)
///     .full_policy(FullPolicy::Discard)
///     .flush_interval(Duration::from_millis(50))
///     .queue_capacity(1024)
///     .build_async()
///     .unwrap();
///
/// assert_eq!(logger.queue_capacity(), Some(1024));
/// ```
pub struct LoggerBuilder {
    name: String,
    config: LoggerConfig,
    formatter: Option<Formatter>,
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: LoggerConfig::default(),
            formatter: None,
            sinks: Vec::new(),
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn auto_flush_level(mut self, level: LogLevel) -> Self {
        self.config.auto_flush_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn full_policy(mut self, policy: FullPolicy) -> Self {
        self.config.full_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    /// Use a pre-built formatter instead of compiling the configured pattern
    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Async queue size; must be a power of two
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.config.backoff = backoff;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    fn parts(self, kind: LoggerKind) -> (LoggerShared, usize) {
        let formatter = self
            .formatter
            .unwrap_or_else(|| Formatter::compile(self.config.pattern.as_str()));
        let shared = Logger::shared(self.name, kind, &self.config, formatter);
        shared.sinks.add_all(self.sinks);
        (shared, self.config.queue_capacity)
    }

    pub fn build_sync(self) -> Logger {
        let (shared, _) = self.parts(LoggerKind::Sync);
        Logger::sync_with(shared)
    }

    pub fn build_async(self) -> Result<Logger> {
        let (shared, capacity) = self.parts(LoggerKind::Async);
        Logger::async_with(shared, capacity)
    }

    pub fn build(self, kind: LoggerKind) -> Result<Logger> {
        match kind {
            LoggerKind::Sync => Ok(self.build_sync()),
            LoggerKind::Async => self.build_async(),
        }
    }
}
