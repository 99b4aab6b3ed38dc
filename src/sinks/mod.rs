//! Sink implementations

pub mod daily_file;
pub mod file;
pub mod manager;
pub mod null;
pub mod ostream;
pub mod rotating_file;

#[cfg(feature = "console")]
pub mod console;

#[cfg(all(unix, feature = "syslog"))]
pub mod syslog;

pub use daily_file::DailyFileSink;
pub use file::{FileSink, LogFile};
pub use manager::{ManagerSink, SinkList};
pub use null::NullSink;
pub use ostream::{OStreamSink, SharedBuffer};
pub use rotating_file::RotatingFileSink;

#[cfg(feature = "console")]
pub use console::{ConsoleSink, ConsoleStyle, ConsoleTarget};

#[cfg(all(unix, feature = "syslog"))]
pub use syslog::{SyslogFacility, SyslogSeverity, SyslogSink};

pub use crate::core::{BaseSink, Sink, SinkBackend};
