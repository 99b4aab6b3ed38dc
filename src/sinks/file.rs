//! File sink and the buffered log file shared by the file-backed sinks

use crate::core::{LogRecord, LoggerError, Result, SinkBackend};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A buffered log file that tracks its size and can be closed and reopened
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl LogFile {
    /// Open `path` for appending, or truncate it first when `truncate` is set
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl Into<PathBuf>, truncate: bool) -> Result<Self> {
        let path = path.into();
        let (writer, size) = Self::open_writer(&path, truncate)?;
        Ok(Self {
            path,
            writer: Some(writer),
            size,
        })
    }

    fn open_writer(path: &Path, truncate: bool) -> Result<(BufWriter<File>, u64)> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }

        let file = options.open(path).map_err(|e| {
            LoggerError::io_operation("opening log file", path.display().to_string(), e)
        })?;
        let size = if truncate {
            0
        } else {
            file.metadata().map(|m| m.len()).unwrap_or(0)
        };

        Ok((BufWriter::new(file), size))
    }

    /// Close the current file and open it again
    pub fn reopen(&mut self, truncate: bool) -> Result<()> {
        let path = self.path.clone();
        self.reopen_at(path, truncate)
    }

    /// Close the current file and continue at `path`
    pub fn reopen_at(&mut self, path: impl Into<PathBuf>, truncate: bool) -> Result<()> {
        self.close()?;
        let path = path.into();
        let (writer, size) = Self::open_writer(&path, truncate)?;
        self.path = path;
        self.writer = Some(writer);
        self.size = size;
        Ok(())
    }

    /// Flush and release the file handle; closing twice is a no-op
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::io_operation("closing log file", self.path.display().to_string(), e)
            })?;
        }
        Ok(())
    }

    /// Append `bytes`; fails with a file sink error once the file is closed
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_sink(self.path.display().to_string(), "file is closed")
        })?;

        writer.write_all(bytes).map_err(|e| {
            LoggerError::io_operation("writing log file", self.path.display().to_string(), e)
        })?;
        self.size += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::io_operation("flushing log file", self.path.display().to_string(), e)
            })?;
        }
        Ok(())
    }

    /// Bytes in the file, including data still buffered
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.close();
    }
}

/// Writes every record to a single file
#[derive(Debug)]
pub struct FileSink {
    file: LogFile,
    auto_flush: bool,
}

impl FileSink {
    /// Append to `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, false)
    }

    pub fn open(path: impl Into<PathBuf>, truncate: bool) -> Result<Self> {
        Ok(Self {
            file: LogFile::open(path, truncate)?,
            auto_flush: false,
        })
    }

    /// Flush after every record
    #[must_use = "builder methods return a new value"]
    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn set_auto_flush(&mut self, auto_flush: bool) {
        self.auto_flush = auto_flush;
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.file.size()
    }
}

impl SinkBackend for FileSink {
    const NAME: &'static str = "file";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.file.write(&record.formatted)?;
        if self.auto_flush {
            self.file.flush()?;
        }
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        self.file.flush()
    }
}
