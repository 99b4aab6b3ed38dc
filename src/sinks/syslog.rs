//! Sink forwarding payloads to the local syslog daemon
//!
//! Datagrams follow the BSD format, `<PRI>ident[pid]: payload`. Only the raw
//! payload is sent; the daemon adds its own timestamp and host.

use crate::core::{identity, LogLevel, LogRecord, LoggerError, Result, SinkBackend};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

const DEFAULT_SOCKETS: [&str; 2] = ["/dev/log", "/var/run/syslog"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogFacility {
    Kernel = 0,
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    AuthPriv = 10,
    Ftp = 11,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyslogSeverity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

impl SyslogSeverity {
    pub fn from_level(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace | LogLevel::Debug => SyslogSeverity::Debug,
            LogLevel::Info => SyslogSeverity::Informational,
            LogLevel::Warning => SyslogSeverity::Warning,
            LogLevel::Error => SyslogSeverity::Error,
            LogLevel::Critical => SyslogSeverity::Critical,
            LogLevel::Fatal => SyslogSeverity::Alert,
        }
    }
}

#[derive(Debug)]
pub struct SyslogSink {
    socket: UnixDatagram,
    socket_path: PathBuf,
    ident: String,
    facility: SyslogFacility,
}

impl SyslogSink {
    /// Connect to the first available system syslog socket
    pub fn new() -> Result<Self> {
        let mut last_error = None;
        for candidate in DEFAULT_SOCKETS {
            match Self::with_socket_path(candidate) {
                Ok(sink) => return Ok(sink),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| LoggerError::config("SyslogSink", "no syslog socket available")))
    }

    /// Connect to a syslog socket at `path`
    pub fn with_socket_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let socket = UnixDatagram::unbound()
            .map_err(|e| LoggerError::io_operation("creating syslog socket", "unbound", e))?;
        socket.connect(path).map_err(|e| {
            LoggerError::io_operation(
                "connecting to syslog",
                path.display().to_string(),
                e,
            )
        })?;

        Ok(Self {
            socket,
            socket_path: path.to_path_buf(),
            ident: identity::application_name().to_string(),
            facility: SyslogFacility::User,
        })
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = ident.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_facility(mut self, facility: SyslogFacility) -> Self {
        self.facility = facility;
        self
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn priority(&self, level: LogLevel) -> u8 {
        (self.facility as u8) * 8 + SyslogSeverity::from_level(level) as u8
    }

    pub fn message(&self, record: &LogRecord) -> String {
        format!(
            "<{}>{}[{}]: {}",
            self.priority(record.level),
            self.ident,
            identity::process_id(),
            record.payload
        )
    }
}

impl SinkBackend for SyslogSink {
    const NAME: &'static str = "syslog";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.socket
            .send(self.message(record).as_bytes())
            .map_err(|e| {
                LoggerError::io_operation(
                    "sending syslog datagram",
                    self.socket_path.display().to_string(),
                    e,
                )
            })?;
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        Ok(())
    }
}
