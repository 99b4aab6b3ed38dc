//! Fan-out sink
//!
//! Holds an ordered list of shared sinks and delivers every record to each
//! sink whose threshold accepts it. The list is swapped atomically, so the
//! write path reads a snapshot without taking a lock.
//!
//! **Per-sink isolation**: every sink call runs under `catch_unwind`; an
//! error or panic in one sink is collected and the remaining sinks still
//! receive the record.

use crate::core::{AtomicLogLevel, LogLevel, LogRecord, LoggerError, Result, Sink};
use arc_swap::ArcSwap;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub type SinkList = Vec<Arc<dyn Sink>>;

pub struct ManagerSink {
    level: AtomicLogLevel,
    sinks: ArcSwap<SinkList>,
}

impl ManagerSink {
    pub fn new() -> Self {
        Self::with_sinks(Vec::new())
    }

    pub fn with_sinks(sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        Self {
            level: AtomicLogLevel::default(),
            sinks: ArcSwap::from_pointee(sinks.into_iter().collect::<SinkList>()),
        }
    }

    pub fn add(&self, sink: Arc<dyn Sink>) {
        self.sinks.rcu(|current| {
            let mut next = SinkList::clone(current);
            next.push(Arc::clone(&sink));
            next
        });
    }

    pub fn add_all(&self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) {
        let added: SinkList = sinks.into_iter().collect();
        self.sinks.rcu(|current| {
            let mut next = SinkList::clone(current);
            next.extend(added.iter().cloned());
            next
        });
    }

    /// Remove every occurrence of `sink`, compared by identity
    ///
    /// Returns `true` if anything was removed.
    pub fn remove(&self, sink: &Arc<dyn Sink>) -> bool {
        let mut removed = false;
        self.sinks.rcu(|current| {
            let next: SinkList = current
                .iter()
                .filter(|candidate| !same_sink(candidate, sink))
                .cloned()
                .collect();
            removed = next.len() != current.len();
            next
        });
        removed
    }

    pub fn clear(&self) {
        self.sinks.store(Arc::new(Vec::new()));
    }

    pub fn len(&self) -> usize {
        self.sinks.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.load().is_empty()
    }

    pub fn contains(&self, sink: &Arc<dyn Sink>) -> bool {
        self.sinks.load().iter().any(|candidate| same_sink(candidate, sink))
    }

    /// Current sink list; later changes do not affect the returned snapshot
    pub fn snapshot(&self) -> Arc<SinkList> {
        self.sinks.load_full()
    }

    fn for_each<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Sink) -> Option<Result<()>>,
    {
        let sinks = self.sinks.load();
        let mut failed = 0;
        let mut first: Option<LoggerError> = None;

        for sink in sinks.iter() {
            let sink = sink.as_ref();
            let outcome = match catch_unwind(AssertUnwindSafe(|| op(sink))) {
                Ok(None) | Ok(Some(Ok(()))) => continue,
                Ok(Some(Err(e))) => e,
                Err(panic) => LoggerError::sink_panicked(sink.name(), panic_message(&*panic)),
            };
            failed += 1;
            first.get_or_insert(outcome);
        }

        match first {
            None => Ok(()),
            Some(first) => Err(LoggerError::sink_failures(failed, sinks.len(), &first)),
        }
    }
}

impl Sink for ManagerSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        self.for_each(|sink| {
            sink.check_level(record.level).then(|| sink.write(record))
        })
    }

    fn flush(&self) -> Result<()> {
        self.for_each(|sink| Some(sink.flush()))
    }

    fn level(&self) -> LogLevel {
        self.level.load()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    fn name(&self) -> &str {
        "manager"
    }
}

impl Default for ManagerSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManagerSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sinks = self.sinks.load();
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("ManagerSink")
            .field("level", &self.level.load())
            .field("sinks", &names)
            .finish()
    }
}

/// Identity comparison that ignores vtable pointers
fn same_sink(a: &Arc<dyn Sink>, b: &Arc<dyn Sink>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SinkBackend;
    use crate::sinks::{NullSink, OStreamSink, SharedBuffer};

    struct Failing;

    impl SinkBackend for Failing {
        const NAME: &'static str = "failing";

        fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
            Err(LoggerError::file_sink("/mnt/logs/app.log", "disk gone"))
        }

        fn flush_backend(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct Panicking;

    impl SinkBackend for Panicking {
        const NAME: &'static str = "panicking";

        fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
            panic!("sink exploded");
        }

        fn flush_backend(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn record(level: LogLevel, text: &str) -> LogRecord {
        let mut record = LogRecord::new(Arc::from("test"), level, 1, text.to_string());
        record.formatted = format!("{}\n", text).into_bytes();
        record
    }

    #[test]
    fn test_fan_out_respects_sink_levels() {
        let all = SharedBuffer::new();
        let errors = SharedBuffer::new();
        let manager = ManagerSink::new();
        manager.add(OStreamSink::new(all.clone()).into_sink());
        let error_sink = OStreamSink::new(errors.clone()).into_sink();
        error_sink.set_level(LogLevel::Error);
        manager.add(error_sink);

        manager.write(&record(LogLevel::Info, "info")).unwrap();
        manager.write(&record(LogLevel::Error, "error")).unwrap();

        assert_eq!(all.contents_string(), "info\nerror\n");
        assert_eq!(errors.contents_string(), "error\n");
    }

    #[test]
    fn test_failure_does_not_stop_other_sinks() {
        let buffer = SharedBuffer::new();
        let manager = ManagerSink::with_sinks([
            Failing.into_sink() as Arc<dyn Sink>,
            Panicking.into_sink(),
            OStreamSink::new(buffer.clone()).into_sink(),
        ]);

        let err = manager.write(&record(LogLevel::Info, "kept")).unwrap_err();
        match err {
            LoggerError::SinkFailures { failed, total, first } => {
                assert_eq!(failed, 2);
                assert_eq!(total, 3);
                assert!(first.contains("disk gone"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(buffer.contents_string(), "kept\n");
    }

    #[test]
    fn test_add_remove_by_identity() {
        let manager = ManagerSink::new();
        let a: Arc<dyn Sink> = NullSink.into_sink();
        let b: Arc<dyn Sink> = NullSink.into_sink();
        manager.add_all([Arc::clone(&a), Arc::clone(&b)]);
        assert_eq!(manager.len(), 2);

        assert!(manager.remove(&a));
        assert!(!manager.remove(&a));
        assert!(manager.contains(&b));
        assert!(!manager.contains(&a));

        let before = manager.snapshot();
        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(before.len(), 1);
    }
}
