//! Sink writing to any `std::io::Write`

use crate::core::{LogRecord, LoggerError, Result, SinkBackend};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

pub struct OStreamSink<W> {
    writer: W,
    auto_flush: bool,
}

impl<W: Write + Send> OStreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            auto_flush: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn set_auto_flush(&mut self, auto_flush: bool) {
        self.auto_flush = auto_flush;
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SinkBackend for OStreamSink<W> {
    const NAME: &'static str = "ostream";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.writer
            .write_all(&record.formatted)
            .map_err(|e| LoggerError::io_operation("writing to stream", "write failed", e))?;
        if self.auto_flush {
            self.flush_backend()?;
        }
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing stream", "flush failed", e))
    }
}

/// In-memory writer whose clones share one buffer
///
/// # Example
///
/// ```
/// use tiny_logger::prelude::*;
/// use tiny_logger::sinks::{OStreamSink, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::builder("capture")
///     .pattern("[%L] %v")
///     .sink(OStreamSink::new(buffer.clone()).into_sink())
///     .build_sync();
///
/// logger.warning("disk almost full");
/// logger.flush().unwrap();
/// assert!(buffer.contents_string().starts_with("[WARN ] disk almost full"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    /// Captured text split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents_string().lines().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
