//! # Tiny Logger
//!
//! A small, high-throughput logging engine. Records are formatted on the
//! calling thread with a compiled `%`-directive pattern and delivered to a
//! fan-out of sinks, either immediately or through a lock-free bounded queue
//! drained by a dedicated worker thread.
//!
//! ## Features
//!
//! - **Sync and async loggers**: pick per logger, switch nothing else
//! - **Bounded queue**: `Retry` backpressure or `Discard` on overflow
//! - **Sinks**: null, file, daily file, rotating file, any `io::Write`,
//!   coloured console and syslog
//! - **Registry**: named, hierarchical loggers owned by the application
//!
//! ## Example
//!
//! ```
//! use tiny_logger::prelude::*;
//!
//! let registry = LoggerRegistry::new("shop");
//! let buffer = SharedBuffer::new();
//! let logger = registry
//!     .ostream_logger(LoggerKind::Async, "orders", buffer.clone())
//!     .unwrap();
//!
//! logger.set_pattern("%N [%L] %v");
//! logger.info("order accepted");
//! logger.flush().unwrap();
//! logger.wait();
//!
//! assert_eq!(buffer.lines(), vec!["shop.orders [INFO ] order accepted"]);
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        BackoffConfig, Formatter, FormatterTimeZone, FullPolicy, LogLevel, LogRecord, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerKind, LoggerMetrics, LoggerRegistry,
        Result, Sink, SinkBackend,
    };
    pub use crate::sinks::{
        DailyFileSink, FileSink, ManagerSink, NullSink, OStreamSink, RotatingFileSink,
        SharedBuffer,
    };

    #[cfg(feature = "console")]
    pub use crate::sinks::{ConsoleSink, ConsoleTarget};

    #[cfg(all(unix, feature = "syslog"))]
    pub use crate::sinks::SyslogSink;
}

pub use core::{
    BackoffConfig, BoundedQueue, Formatter, FormatterTimeZone, FullPolicy, LogLevel, LogRecord,
    Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerKind, LoggerMetrics, LoggerRegistry,
    RecordStatus, Result, Sink, SinkBackend,
};
