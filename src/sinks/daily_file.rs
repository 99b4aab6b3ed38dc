//! Daily rotating file sink
//!
//! Each file is named after the moment it was opened,
//! `<dir>/<stem>_<YYYY_MM_DD_HH_MM_SS><.ext>`. A new file is started on the
//! first write at or after the configured time of day.

use super::file::LogFile;
use crate::core::{LogRecord, LoggerError, Result, SinkBackend};
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct DailyFileSink {
    base_path: PathBuf,
    rotation_time: NaiveTime,
    next_rotation: DateTime<Local>,
    file: LogFile,
    auto_flush: bool,
}

impl DailyFileSink {
    /// Start a file now and rotate every day at `hour:minute:second` local time
    pub fn new(path: impl Into<PathBuf>, hour: u32, minute: u32, second: u32) -> Result<Self> {
        let rotation_time = rotation_time(hour, minute, second)?;
        let base_path = path.into();
        let now = Local::now();

        Ok(Self {
            file: LogFile::open(dated_path(&base_path, &now), false)?,
            next_rotation: next_rotation_after(&now, rotation_time),
            base_path,
            rotation_time,
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

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File currently being written
    pub fn current_path(&self) -> &Path {
        self.file.path()
    }

    pub fn next_rotation(&self) -> DateTime<Local> {
        self.next_rotation
    }

    fn rotate_if_due(&mut self, now: DateTime<Local>) -> Result<()> {
        if now < self.next_rotation {
            return Ok(());
        }
        self.file
            .reopen_at(dated_path(&self.base_path, &now), false)
            .map_err(|e| {
                LoggerError::file_rotation(self.base_path.display().to_string(), e.to_string())
            })?;
        self.next_rotation = next_rotation_after(&now, self.rotation_time);
        Ok(())
    }
}

impl SinkBackend for DailyFileSink {
    const NAME: &'static str = "daily_file";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        self.rotate_if_due(Local::now())?;
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

fn rotation_time(hour: u32, minute: u32, second: u32) -> Result<NaiveTime> {
    if hour > 23 || minute > 59 || second > 59 {
        return Err(LoggerError::config(
            "DailyFileSink",
            format!("Invalid Time {:02}:{:02}:{:02}", hour, minute, second),
        ));
    }
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        LoggerError::config(
            "DailyFileSink",
            format!("Invalid Time {:02}:{:02}:{:02}", hour, minute, second),
        )
    })
}

/// Today's `time` in the zone of `now`, or tomorrow's when that is not in the future
pub fn next_rotation_after<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let today = now.date_naive().and_time(time);
    let candidate = resolve_local(&now.timezone(), today);
    if candidate > *now {
        return candidate;
    }
    resolve_local(&now.timezone(), today + TimeDelta::days(1))
}

/// Local times skipped by a DST gap are read as UTC so rotation still happens that day
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// `<dir>/<stem>_<YYYY_MM_DD_HH_MM_SS><.ext>`
pub fn dated_path<Tz: TimeZone>(base: &Path, time: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    base.with_file_name(format!(
        "{}_{}{}",
        stem,
        time.format("%Y_%m_%d_%H_%M_%S"),
        extension
    ))
}
