//! Log record structure

use super::identity;
use super::log_level::LogLevel;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::sync::Arc;

/// What the worker should do with a queued record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Deliver the formatted bytes to the sinks
    Write,
    /// Flush every sink once the preceding records are written
    Flush,
    /// Flush and stop the worker
    Terminate,
}

/// Broken-down calendar time of a record, in the formatter's time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calendar {
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
    /// 0-6, Sunday is 0
    pub weekday: u32,
    /// 1-366
    pub day_of_year: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Calendar {
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
            day: time.day(),
            weekday: time.weekday().num_days_from_sunday(),
            day_of_year: time.ordinal(),
            hour: time.hour(),
            minute: time.minute(),
            // Leap seconds surface as nanosecond overflow in chrono
            second: time.second() + time.nanosecond() / 1_000_000_000,
        }
    }

    /// Hour on a 12-hour clock, 1-12
    #[inline]
    pub fn hour12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    #[inline]
    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    /// Filled in by the formatter
    pub calendar: Calendar,
    pub thread_id: u64,
    pub message_id: u64,
    pub name: Arc<str>,
    pub level: LogLevel,
    pub status: RecordStatus,
    pub payload: String,
    /// Rendered line including the terminator
    pub formatted: Vec<u8>,
}

impl LogRecord {
    /// A `Write` record stamped with the current time and calling thread
    pub fn new(name: Arc<str>, level: LogLevel, message_id: u64, payload: String) -> Self {
        Self {
            timestamp: Utc::now(),
            calendar: Calendar::default(),
            thread_id: identity::thread_id(),
            message_id,
            name,
            level,
            status: RecordStatus::Write,
            payload,
            formatted: Vec::new(),
        }
    }

    /// A payload-less `Flush` or `Terminate` record
    pub fn control(name: Arc<str>, status: RecordStatus) -> Self {
        Self {
            timestamp: Utc::now(),
            calendar: Calendar::default(),
            thread_id: identity::thread_id(),
            message_id: 0,
            name,
            level: LogLevel::Trace,
            status,
            payload: String::new(),
            formatted: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_thread_id(mut self, thread_id: u64) -> Self {
        self.thread_id = thread_id;
        self
    }

    #[inline]
    pub fn is_write(&self) -> bool {
        self.status == RecordStatus::Write
    }

    /// The formatted line as text, lossy for non UTF-8 payloads
    pub fn formatted_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_breakdown() {
        let time = Utc.with_ymd_and_hms(2018, 3, 30, 17, 1, 4).unwrap();
        let cal = Calendar::from_datetime(&time);
        assert_eq!(cal.year, 2018);
        assert_eq!(cal.month, 3);
        assert_eq!(cal.day, 30);
        assert_eq!(cal.weekday, 5);
        assert_eq!(cal.day_of_year, 89);
        assert_eq!(cal.hour12(), 5);
        assert!(cal.is_pm());
    }

    #[test]
    fn test_midnight_is_twelve_am() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        let cal = Calendar::from_datetime(&time);
        assert_eq!(cal.hour12(), 12);
        assert!(!cal.is_pm());
    }

    #[test]
    fn test_control_record_has_no_payload() {
        let record = LogRecord::control(Arc::from("app"), RecordStatus::Flush);
        assert!(!record.is_write());
        assert!(record.payload.is_empty());
        assert!(record.formatted.is_empty());
    }
}
