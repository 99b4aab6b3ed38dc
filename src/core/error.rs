//! Error types for the logging engine

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Queue capacity rejected at construction
    #[error("Invalid queue capacity {capacity}: size must be a power of two and at least 2")]
    InvalidCapacity { capacity: usize },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// One or more sinks of a fan-out failed
    #[error("{failed} of {total} sinks failed, first failure: {first}")]
    SinkFailures {
        failed: usize,
        total: usize,
        first: String,
    },

    /// A sink panicked while handling a record
    #[error("Sink '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// Worker thread could not be started
    #[error("Failed to spawn worker thread for logger '{logger}'")]
    WorkerSpawn {
        logger: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid capacity error
    pub fn invalid_capacity(capacity: usize) -> Self {
        LoggerError::InvalidCapacity { capacity }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Summarize the failures of a fan-out write or flush
    pub fn sink_failures(failed: usize, total: usize, first: &LoggerError) -> Self {
        LoggerError::SinkFailures {
            failed,
            total,
            first: first.to_string(),
        }
    }

    /// Create a sink panic error
    pub fn sink_panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkPanicked {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
