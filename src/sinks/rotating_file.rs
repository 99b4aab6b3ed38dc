//! Size-based rotating file sink
//!
//! When a write pushes the primary file past `max_size`, backups shift one
//! step (`app.log.1` becomes `app.log.2`, ...), the oldest `app.log.N` is
//! removed, the primary becomes `app.log.1` and is reopened empty.

use super::file::LogFile;
use crate::core::{LogRecord, LoggerError, Result, SinkBackend};
use std::fs;
use std::path::{Path, PathBuf};

/// One gigabyte
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 100;

#[derive(Debug)]
pub struct RotatingFileSink {
    file: LogFile,
    max_size: u64,
    max_files: usize,
    auto_flush: bool,
}

impl RotatingFileSink {
    /// Rotate `path` at [`DEFAULT_MAX_SIZE`], keeping [`DEFAULT_MAX_FILES`] backups
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_limits(path, DEFAULT_MAX_SIZE, DEFAULT_MAX_FILES)
    }

    pub fn with_limits(path: impl Into<PathBuf>, max_size: u64, max_files: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(LoggerError::config(
                "RotatingFileSink",
                "maximum file size must be greater than zero",
            ));
        }
        if max_files == 0 {
            return Err(LoggerError::config(
                "RotatingFileSink",
                "at least one backup file must be kept",
            ));
        }

        Ok(Self {
            file: LogFile::open(path, false)?,
            max_size,
            max_files,
            auto_flush: false,
        })
    }

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

    pub fn current_size(&self) -> u64 {
        self.file.size()
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Path of backup `index`; index 0 is the primary file
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let path = self.file.path();
        if index == 0 {
            return path.to_path_buf();
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app.log".to_string());
        path.with_file_name(format!("{}.{}", filename, index))
    }

    /// Shift backups and reopen the primary file empty
    ///
    /// On failure the primary file is reopened for appending, so the next
    /// write past the limit tries again.
    pub fn rotate(&mut self) -> Result<()> {
        self.file.close()?;

        if let Err(e) = self.shift_backups() {
            self.file.reopen(false)?;
            return Err(e);
        }

        self.file.reopen(true)
    }

    fn shift_backups(&self) -> Result<()> {
        for i in (1..=self.max_files).rev() {
            let src = self.backup_path(i - 1);
            let dst = self.backup_path(i);

            if dst.exists() {
                fs::remove_file(&dst).map_err(|e| {
                    LoggerError::file_rotation(
                        dst.display().to_string(),
                        format!("Failed to remove old backup: {}", e),
                    )
                })?;
            }

            if src.exists() {
                fs::rename(&src, &dst).map_err(|e| {
                    LoggerError::file_rotation(
                        src.display().to_string(),
                        format!("Failed to rename to {}: {}", dst.display(), e),
                    )
                })?;
            }
        }
        Ok(())
    }
}

impl SinkBackend for RotatingFileSink {
    const NAME: &'static str = "rotating_file";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.file.write(&record.formatted)?;

        if self.file.size() > self.max_size {
            self.rotate()?;
        } else if self.auto_flush {
            self.file.flush()?;
        }
        Ok(())
    }

    fn flush_backend(&mut self) -> Result<()> {
        self.file.flush()
    }
}
