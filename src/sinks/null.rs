//! Sink that discards everything

use crate::core::{LogRecord, Result, SinkBackend};

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SinkBackend for NullSink {
    const NAME: &'static str = "null";

    #[inline]
    fn write_record(&mut self, _record: &LogRecord) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn flush_backend(&mut self) -> Result<()> {
        Ok(())
    }
}
