//! Integration tests for the logging engine
//!
//! These tests verify:
//! - Level filtering at logger and sink level
//! - Pattern output for a fixed timestamp
//! - Async queue behaviour under Discard and Retry
//! - Auto-flush level and flush interval
//! - File, rotating and daily sinks on disk
//! - Registry naming and hierarchy
//! - Sinks shared between loggers and failure isolation

mod common;

use chrono::{TimeZone, Utc};
use common::{BrokenSink, CaptureSink, FlushCounter, GatedSink};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tiny_logger::prelude::*;

#[test]
fn test_level_filtering() {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder("filter")
        .level(LogLevel::Info)
        .pattern("%L %v")
        .sink(OStreamSink::new(buffer.clone()).into_sink())
        .build_sync();

    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    logger.error("e");

    assert_eq!(buffer.lines(), vec!["INFO  i", "ERROR e"]);
    assert_eq!(logger.metrics().total_logged(), 2);
}

#[test]
fn test_sink_level_threshold() {
    let all = SharedBuffer::new();
    let errors = SharedBuffer::new();
    let error_sink = OStreamSink::new(errors.clone()).into_sink();
    error_sink.set_level(LogLevel::Error);

    let logger = Logger::builder("split")
        .pattern("%v")
        .sink(OStreamSink::new(all.clone()).into_sink())
        .sink(error_sink)
        .build_sync();

    logger.info("routine");
    logger.critical("alarm");

    assert_eq!(all.lines(), vec!["routine", "alarm"]);
    assert_eq!(errors.lines(), vec!["alarm"]);
}

#[test]
fn test_fixed_timestamp_line() {
    let formatter = Formatter::compile("%Y-%m-%d %H:%M:%S [%L] %v")
        .with_time_zone(FormatterTimeZone::Utc)
        .with_line_ending("\n");
    let mut record = LogRecord::new(Arc::from("golden"), LogLevel::Error, 1, "boom".to_string())
        .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 30).unwrap());

    formatter.format(&mut record);

    assert_eq!(record.formatted_str(), "2024-03-15 13:45:30 [ERROR] boom\n");
}

#[test]
fn test_async_preserves_order() {
    let (sink, payloads) = CaptureSink::new();
    let logger = Logger::builder("ordered")
        .queue_capacity(64)
        .sink(sink.into_sink())
        .build_async()
        .expect("Failed to build logger");

    for i in 0..1000 {
        logger.info(format!("{}", i));
    }
    logger.wait();

    let expected: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    assert_eq!(*payloads.lock(), expected);
}

#[test]
fn test_discard_never_blocks() {
    let (sink, handles) = GatedSink::new();
    let logger = Logger::builder("discard")
        .queue_capacity(4)
        .full_policy(FullPolicy::Discard)
        .sink(sink.into_sink())
        .build_async()
        .expect("Failed to build logger");

    // Park the worker inside the first write
    logger.info("first");
    handles.wait_entered(1);

    let start = Instant::now();
    for i in 0..100 {
        logger.info(format!("flood {}", i));
    }
    assert!(start.elapsed() < Duration::from_secs(2), "Discard blocked the producer");

    let dropped = logger.metrics().dropped_count();
    assert!(dropped >= 90, "expected most records dropped, got {}", dropped);
    assert!(logger.metrics().queue_full_events() >= dropped);

    // One more record on a full queue is dropped without touching the queue
    let queued = logger.queue_len();
    assert_eq!(queued, 4);
    logger.info("one too many");
    assert_eq!(logger.queue_len(), queued);
    assert_eq!(logger.metrics().dropped_count(), dropped + 1);

    handles.gate.open();
    logger.wait();

    assert_eq!(handles.payloads.lock().len() as u64, 102 - (dropped + 1));
    assert!(!handles.payloads.lock().iter().any(|p| p == "one too many"));
}

#[test]
fn test_sync_auto_flush_level() {
    let (sink, counts) = FlushCounter::new();
    let logger = Logger::builder("sync-flush")
        .auto_flush_level(LogLevel::Fatal)
        .flush_interval(Duration::from_secs(3600))
        .sink(sink.into_sink())
        .build_sync();

    logger.info("routine");
    logger.critical("bad but not fatal");
    assert_eq!(counts.writes(), 2);
    assert_eq!(counts.flushes(), 0);

    logger.fatal("going down");
    assert_eq!(counts.writes(), 3);
    assert_eq!(counts.flushes(), 1);
}

#[test]
fn test_raising_auto_flush_level_stops_forced_flush() {
    let (sink, counts) = FlushCounter::new();
    let logger = Logger::builder("raised")
        .auto_flush_level(LogLevel::Error)
        .flush_interval(Duration::from_secs(3600))
        .sink(sink.into_sink())
        .build_sync();

    logger.error("flushed");
    assert_eq!(counts.flushes(), 1);

    logger.set_auto_flush_level(LogLevel::Fatal);
    logger.error("buffered");
    assert_eq!(counts.writes(), 2);
    assert_eq!(counts.flushes(), 1);

    logger.fatal("flushed again");
    assert_eq!(counts.flushes(), 2);
}

#[test]
fn test_async_fatal_flushes_before_wait_returns() {
    let (sink, counts) = FlushCounter::new();
    let logger = Logger::builder("async-fatal")
        .auto_flush_level(LogLevel::Fatal)
        .flush_interval(Duration::from_secs(3600))
        .sink(sink.into_sink())
        .build_async()
        .expect("Failed to build logger");

    logger.fatal("going down");
    logger.wait();

    assert_eq!(counts.writes(), 1);
    assert!(counts.flushes() >= 1);
}

#[test]
fn test_idle_worker_flushes_after_interval() {
    let interval = Duration::from_millis(200);
    let (sink, counts) = FlushCounter::new();
    let logger = Logger::builder("idle-flush")
        .auto_flush_level(LogLevel::Fatal)
        .flush_interval(interval)
        .sink(sink.into_sink())
        .build_async()
        .expect("Failed to build logger");

    let start = Instant::now();
    logger.info("quiet");
    logger.wait();
    assert_eq!(counts.writes(), 1);
    assert_eq!(counts.flushes(), 0, "info flushed before the interval elapsed");

    let deadline = start + Duration::from_secs(2);
    while counts.flushes() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    assert!(counts.flushes() >= 1, "idle worker never flushed");
    assert!(
        start.elapsed() <= interval * 2,
        "idle flush took {:?}",
        start.elapsed()
    );
}

#[test]
fn test_retry_blocks_until_space() {
    let (sink, handles) = GatedSink::new();
    let logger = Arc::new(
        Logger::builder("retry")
            .queue_capacity(4)
            .full_policy(FullPolicy::Retry)
            .sink(sink.into_sink())
            .build_async()
            .expect("Failed to build logger"),
    );

    logger.info("first");
    handles.wait_entered(1);

    let finished = Arc::new(AtomicBool::new(false));
    let producer = {
        let logger = Arc::clone(&logger);
        let finished = Arc::clone(&finished);
        thread::spawn(move || {
            for i in 0..10 {
                logger.info(format!("queued {}", i));
            }
            finished.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!finished.load(Ordering::SeqCst), "Retry producer did not block");

    handles.gate.open();
    producer.join().unwrap();
    logger.wait();

    assert_eq!(handles.payloads.lock().len(), 11);
    assert_eq!(logger.metrics().dropped_count(), 0);
    assert!(logger.metrics().retry_events() >= 1);
}

#[test]
fn test_file_sink_async() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("logs").join("async.log");

    let logger = Logger::builder("file")
        .pattern("[%L] %v")
        .sink(FileSink::new(&log_file).expect("Failed to open file").into_sink())
        .build_async()
        .expect("Failed to build logger");

    for i in 0..50 {
        logger.info(format!("Message {}", i));
    }
    logger.flush().expect("Failed to flush");
    logger.wait();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 50);
    assert_eq!(lines[0], "[INFO ] Message 0");
    assert_eq!(lines[49], "[INFO ] Message 49");
}

#[test]
fn test_file_sink_appends_across_loggers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("append.log");

    for run in 0..2 {
        let logger = Logger::builder("append")
            .pattern("%v")
            .sink(FileSink::new(&log_file).unwrap().into_sink())
            .build_sync();
        logger.info(format!("run {}", run));
    }

    assert_eq!(fs::read_to_string(&log_file).unwrap(), "run 0\nrun 1\n");
}

#[test]
fn test_rotating_file_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotate.log");

    let sink = RotatingFileSink::with_limits(&log_file, 50, 2).unwrap();
    let logger = Logger::builder("rotate")
        .pattern("%v")
        .sink(sink.into_sink())
        .build_sync();

    // 20 bytes per line; every third line crosses 50 bytes and rotates
    for i in 1..=10 {
        logger.info(format!("{:019}", i));
    }
    logger.flush().unwrap();

    let read_lines = |path: &std::path::Path| -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.trim_start_matches('0').to_string())
            .collect()
    };

    assert_eq!(read_lines(&log_file), vec!["10"]);
    assert_eq!(read_lines(&temp_dir.path().join("rotate.log.1")), vec!["7", "8", "9"]);
    assert_eq!(read_lines(&temp_dir.path().join("rotate.log.2")), vec!["4", "5", "6"]);
    assert!(!temp_dir.path().join("rotate.log.3").exists());
}

#[test]
fn test_daily_file_sink_targets_dated_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base = temp_dir.path().join("daily.log");

    let sink = DailyFileSink::new(&base, 0, 0, 0).unwrap();
    let next = sink.next_rotation();
    let current = sink.current_path().to_path_buf();
    assert!(next > chrono::Local::now());
    assert!(next - chrono::Local::now() <= chrono::TimeDelta::days(1));

    let logger = Logger::builder("daily")
        .pattern("%v")
        .sink(sink.into_sink())
        .build_sync();
    logger.warning("dated");
    logger.flush().unwrap();

    let name = current.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("daily_"));
    assert!(name.ends_with(".log"));
    assert_eq!(fs::read_to_string(&current).unwrap(), "dated\n");
    assert!(!base.exists());
}

#[test]
fn test_daily_file_sink_rejects_bad_time() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = DailyFileSink::new(temp_dir.path().join("daily.log"), 24, 0, 0);
    match result {
        Err(LoggerError::InvalidConfiguration { message, .. }) => {
            assert_eq!(message, "Invalid Time 24:00:00")
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_registry_hierarchy() {
    let registry = LoggerRegistry::new("svc");
    let root = registry.get_sync("").unwrap();
    let net = registry.get_async("net").unwrap();
    let http = registry.get_child(&net, "http").unwrap();

    assert_eq!(root.name(), "svc");
    assert_eq!(net.name(), "svc.net");
    assert_eq!(http.name(), "svc.net.http");
    assert_eq!(http.kind(), LoggerKind::Async);

    // First registration wins
    let again = registry.get_sync("net").unwrap();
    assert!(Arc::ptr_eq(&net, &again));
    assert_eq!(again.kind(), LoggerKind::Async);

    assert_eq!(registry.names(), vec!["svc", "svc.net", "svc.net.http"]);
}

#[test]
fn test_registry_global_settings() {
    let registry = LoggerRegistry::new("svc");
    let buffer = SharedBuffer::new();
    let a = registry
        .ostream_logger(LoggerKind::Async, "a", buffer.clone())
        .unwrap();
    let b = registry
        .ostream_logger(LoggerKind::Sync, "b", buffer.clone())
        .unwrap();

    registry.set_level(LogLevel::Warning);
    registry.set_full_policy(FullPolicy::Discard);
    registry.set_flush_interval(Duration::from_millis(10));
    registry.set_formatter(Formatter::compile("%N %v"));

    a.info("hidden");
    a.warning("from a");
    a.wait();
    b.error("from b");

    assert_eq!(a.full_policy(), FullPolicy::Discard);
    assert_eq!(b.flush_interval(), Duration::from_millis(10));
    assert_eq!(buffer.lines(), vec!["svc.a from a", "svc.b from b"]);
}

#[test]
fn test_shared_sink_between_parent_and_child() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shared.log");
    let shared: Arc<dyn Sink> = FileSink::new(&log_file).unwrap().into_sink();

    let registry = LoggerRegistry::new("svc");
    let parent = registry
        .register(LoggerKind::Async, "db", Arc::clone(&shared))
        .unwrap();
    let child = registry
        .register_child(&parent, "pool", Arc::clone(&shared))
        .unwrap();
    registry.set_pattern("%N|%v");

    let handles: Vec<_> = [Arc::clone(&parent), Arc::clone(&child)]
        .into_iter()
        .map(|logger| {
            thread::spawn(move || {
                for i in 0..200 {
                    logger.info(format!("line {}", i));
                }
                logger.flush().unwrap();
                logger.wait();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&log_file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 400);
    assert!(lines.iter().all(|l| l.starts_with("svc.db|line ") || l.starts_with("svc.db.pool|line ")));
    assert_eq!(lines.iter().filter(|l| l.starts_with("svc.db.pool|")).count(), 200);
}

#[test]
fn test_failing_sink_does_not_starve_others() {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder("isolated")
        .pattern("%v")
        .sink(BrokenSink.into_sink())
        .sink(OStreamSink::new(buffer.clone()).into_sink())
        .build_sync();

    let result = logger.try_log(LogLevel::Info, "still delivered");
    match result {
        Err(LoggerError::SinkFailures { failed, total, .. }) => {
            assert_eq!((failed, total), (1, 2));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    logger.info("again");
    assert_eq!(buffer.lines(), vec!["still delivered", "again"]);
    assert_eq!(logger.metrics().sink_failures(), 2);
}

#[test]
fn test_drop_flushes_and_joins() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("shutdown.log");

    {
        let logger = Logger::builder("shutdown")
            .pattern("%v")
            .sink(FileSink::new(&log_file).unwrap().into_sink())
            .build_async()
            .unwrap();
        for i in 0..500 {
            logger.debug(format!("{}", i));
        }
    }

    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.lines().count(), 500);
    assert_eq!(content.lines().last(), Some("499"));
}

#[test]
fn test_worker_thread_name() {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder("named")
        .pattern("%N")
        .sink(OStreamSink::new(buffer.clone()).into_sink())
        .build_async()
        .unwrap();

    struct ThreadName(Arc<parking_lot::Mutex<Option<String>>>);
    impl SinkBackend for ThreadName {
        const NAME: &'static str = "thread_name";
        fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
            *self.0.lock() = thread::current().name().map(str::to_string);
            Ok(())
        }
        fn flush_backend(&mut self) -> Result<()> {
            Ok(())
        }
    }

    let seen = Arc::new(parking_lot::Mutex::new(None));
    logger.add_sink(ThreadName(Arc::clone(&seen)).into_sink());
    logger.info("who writes this");
    logger.wait();

    assert_eq!(seen.lock().as_deref(), Some("logger-named"));
}
