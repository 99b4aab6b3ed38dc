//! Sinks shared by the integration and stress tests

#![allow(dead_code)]

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_logger::prelude::*;

/// Keeps every payload it receives, in arrival order
#[derive(Default)]
pub struct CaptureSink {
    pub payloads: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let payloads = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                payloads: Arc::clone(&payloads),
            },
            payloads,
        )
    }
}

impl SinkBackend for CaptureSink {
    const NAME: &'static str = "capture";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.payloads.lock().push(record.payload.clone());
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Closed until `open` is called; lets a test hold the worker inside a write
#[derive(Clone, Default)]
pub struct Gate {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn open(&self) {
        let (open, signal) = &*self.state;
        *open.lock() = true;
        signal.notify_all();
    }

    fn pass(&self) {
        let (open, signal) = &*self.state;
        let mut open = open.lock();
        while !*open {
            signal.wait(&mut open);
        }
    }
}

/// Blocks each write on a [`Gate`], then records the payload
pub struct GatedSink {
    gate: Gate,
    entered: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<String>>>,
}

pub struct GatedHandles {
    pub gate: Gate,
    pub entered: Arc<AtomicUsize>,
    pub payloads: Arc<Mutex<Vec<String>>>,
}

impl GatedHandles {
    /// Spin until the sink has been entered `count` times
    pub fn wait_entered(&self, count: usize) {
        let start = Instant::now();
        while self.entered.load(Ordering::SeqCst) < count {
            assert!(
                start.elapsed() < Duration::from_secs(10),
                "sink never entered"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

impl GatedSink {
    pub fn new() -> (Self, GatedHandles) {
        let gate = Gate::default();
        let entered = Arc::new(AtomicUsize::new(0));
        let payloads = Arc::new(Mutex::new(Vec::new()));
        let sink = Self {
            gate: gate.clone(),
            entered: Arc::clone(&entered),
            payloads: Arc::clone(&payloads),
        };
        (
            sink,
            GatedHandles {
                gate,
                entered,
                payloads,
            },
        )
    }
}

impl SinkBackend for GatedSink {
    const NAME: &'static str = "gated";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.gate.pass();
        self.payloads.lock().push(record.payload.clone());
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Always fails
pub struct BrokenSink;

impl SinkBackend for BrokenSink {
    const NAME: &'static str = "broken";

    fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
        Err(LoggerError::file_sink("/mnt/usb/app.log", "disk unplugged"))
    }

    fn flush_backend(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Counts writes and flushes
pub struct FlushCounter {
    writes: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
}

#[derive(Clone)]
pub struct FlushCounts {
    writes: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
}

impl FlushCounts {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl FlushCounter {
    pub fn new() -> (Self, FlushCounts) {
        let writes = Arc::new(AtomicUsize::new(0));
        let flushes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                writes: Arc::clone(&writes),
                flushes: Arc::clone(&flushes),
            },
            FlushCounts { writes, flushes },
        )
    }
}

impl SinkBackend for FlushCounter {
    const NAME: &'static str = "flush_counter";

    fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
