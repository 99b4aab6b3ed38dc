//! Logging macros with `format!`-style arguments.
//!
//! Arguments are captured with `format_args!` and only rendered when the
//! logger's level lets the record through.
//!
//! # Examples
//!
//! ```
//! use tiny_logger::prelude::*;
//! use tiny_logger::info;
//!
//! let buffer = SharedBuffer::new();
//! let logger = Logger::builder("server")
//!     .pattern("%v")
//!     .sink(OStreamSink::new(buffer.clone()).into_sink())
//!     .build_sync();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(buffer.lines(), vec!["Server listening on port 8080"]);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use tiny_logger::prelude::*;
/// # let logger = Logger::builder("demo").build_sync();
/// use tiny_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_args($level, format_args!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// Only logs; the process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
