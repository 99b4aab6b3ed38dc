//! Pattern formatter
//!
//! A pattern such as `"[%Y-%m-%d %H:%M:%S.%f][%N][%L] %v"` is compiled once
//! into a flat list of tokens; formatting a record walks the list and writes
//! each token into the record's output buffer, then appends the line ending.
//!
//! | Directive | Output |
//! |-----------|--------|
//! | `%Y` `%y` | year, 4 digits / 2 digits |
//! | `%m` `%d` `%e` | month 01-12, day 01-31, day 1-31 |
//! | `%H` `%I` `%k` `%l` | hour 00-23, 01-12, 0-23, 1-12 |
//! | `%M` `%S` `%p` | minute, second, `AM`/`PM` |
//! | `%a` `%A` `%b` `%h` `%B` | weekday and month names |
//! | `%j` `%w` | day of year 001-366, weekday 0-6 |
//! | `%f` `%F` `%n` | milli-, micro-, nanoseconds of the timestamp |
//! | `%s` | seconds since the Unix epoch |
//! | `%N` `%L` `%v` | logger name, padded level, payload |
//! | `%t` `%P` `%i` | thread id, process id, message id |
//! | `%r` `%T` `%X` `%D` `%x` `%c` | composite time and date forms |
//! | `%+` | `[YYYY-MM-DD HH:MM:SS.ffffff][name][LEVEL] payload` |
//! | `%%` | `%` |
//!
//! Any other `%x` is copied through unchanged.

use super::identity;
use super::log_record::{Calendar, LogRecord};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Pattern used when none is configured
pub const DEFAULT_PATTERN: &str = "%+";

#[cfg(windows)]
pub const DEFAULT_LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const DEFAULT_LINE_ENDING: &str = "\n";

const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEKDAY_FULL: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const MONTH_FULL: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Time zone the calendar fields of a record are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormatterTimeZone {
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Year,
    ShortYear,
    Month,
    Day,
    DayUnpadded,
    Hour,
    Hour12,
    HourUnpadded,
    Hour12Unpadded,
    Minute,
    Second,
    AmPm,
    WeekdayName,
    WeekdayFullName,
    MonthName,
    MonthFullName,
    DayOfYear,
    Weekday,
    Millis,
    Micros,
    Nanos,
    EpochSeconds,
    Name,
    Level,
    ThreadId,
    ProcessId,
    MessageId,
    Time12,
    Time24,
    ShortDate,
    DateTime,
    Payload,
    Full,
}

impl Token {
    fn from_directive(flag: char) -> Option<Self> {
        let token = match flag {
            'Y' => Token::Year,
            'y' => Token::ShortYear,
            'm' => Token::Month,
            'd' => Token::Day,
            'e' => Token::DayUnpadded,
            'H' => Token::Hour,
            'I' => Token::Hour12,
            'k' => Token::HourUnpadded,
            'l' => Token::Hour12Unpadded,
            'M' => Token::Minute,
            'S' => Token::Second,
            'p' => Token::AmPm,
            'a' => Token::WeekdayName,
            'A' => Token::WeekdayFullName,
            'b' | 'h' => Token::MonthName,
            'B' => Token::MonthFullName,
            'j' => Token::DayOfYear,
            'w' => Token::Weekday,
            'f' => Token::Millis,
            'F' => Token::Micros,
            'n' => Token::Nanos,
            's' => Token::EpochSeconds,
            'N' => Token::Name,
            'L' => Token::Level,
            't' => Token::ThreadId,
            'P' => Token::ProcessId,
            'i' => Token::MessageId,
            'r' => Token::Time12,
            'T' | 'X' => Token::Time24,
            'D' | 'x' => Token::ShortDate,
            'c' => Token::DateTime,
            'v' => Token::Payload,
            '+' => Token::Full,
            _ => return None,
        };
        Some(token)
    }
}

/// Compiled pattern
///
/// # Example
///
/// ```
/// use tiny_logger::{Formatter, FormatterTimeZone, LogLevel, LogRecord};
/// use chrono::{TimeZone, Utc};
/// use std::sync::Arc;
///
/// let formatter = Formatter::compile("%Y-%m-%d %H:%M:%S [%L] %v")
///     .with_time_zone(FormatterTimeZone::Utc)
///     .with_line_ending("\n");
///
/// let mut record = LogRecord::new(Arc::from("app"), LogLevel::Error, 1, "boom".to_string())
///     .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 30).unwrap());
/// formatter.format(&mut record);
///
/// assert_eq!(record.formatted, b"2024-03-15 13:45:30 [ERROR] boom\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pattern: String,
    tokens: Vec<Token>,
    time_zone: FormatterTimeZone,
    line_ending: String,
}

impl Formatter {
    /// Compile `pattern`; compilation never fails
    pub fn compile(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let tokens = Self::parse(&pattern);
        Self {
            pattern,
            tokens,
            time_zone: FormatterTimeZone::default(),
            line_ending: DEFAULT_LINE_ENDING.to_string(),
        }
    }

    fn parse(pattern: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => literal.push('%'),
                Some(flag) => match Token::from_directive(flag) {
                    Some(token) => {
                        if !literal.is_empty() {
                            tokens.push(Token::Literal(std::mem::take(&mut literal)));
                        }
                        tokens.push(token);
                    }
                    None => {
                        literal.push('%');
                        literal.push(flag);
                    }
                },
                None => literal.push('%'),
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        tokens
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_time_zone(mut self, time_zone: FormatterTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn time_zone(&self) -> FormatterTimeZone {
        self.time_zone
    }

    pub fn line_ending(&self) -> &str {
        &self.line_ending
    }

    /// Number of compiled tokens, adjacent literal text counting as one
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Render `record` into `record.formatted`, replacing previous contents
    pub fn format(&self, record: &mut LogRecord) {
        record.calendar = match self.time_zone {
            FormatterTimeZone::Local => {
                Calendar::from_datetime(&record.timestamp.with_timezone(&Local))
            }
            FormatterTimeZone::Utc => Calendar::from_datetime(&record.timestamp),
        };

        // Reuse the record's allocation when it already holds text
        let mut out = String::from_utf8(std::mem::take(&mut record.formatted)).unwrap_or_default();
        out.clear();

        for token in &self.tokens {
            Self::render(token, record, &mut out);
        }
        out.push_str(&self.line_ending);

        record.formatted = out.into_bytes();
    }

    fn render(token: &Token, record: &LogRecord, out: &mut String) {
        let cal = &record.calendar;
        let nanos = record.timestamp.timestamp_subsec_nanos() % 1_000_000_000;
        let am_pm = if cal.is_pm() { "PM" } else { "AM" };

        // Writing into a String cannot fail
        let _ = match token {
            Token::Literal(text) => {
                out.push_str(text);
                Ok(())
            }
            Token::Year => write!(out, "{}", cal.year),
            Token::ShortYear => write!(out, "{:02}", cal.year.rem_euclid(100)),
            Token::Month => write!(out, "{:02}", cal.month),
            Token::Day => write!(out, "{:02}", cal.day),
            Token::DayUnpadded => write!(out, "{}", cal.day),
            Token::Hour => write!(out, "{:02}", cal.hour),
            Token::Hour12 => write!(out, "{:02}", cal.hour12()),
            Token::HourUnpadded => write!(out, "{}", cal.hour),
            Token::Hour12Unpadded => write!(out, "{}", cal.hour12()),
            Token::Minute => write!(out, "{:02}", cal.minute),
            Token::Second => write!(out, "{:02}", cal.second),
            Token::AmPm => out.write_str(am_pm),
            Token::WeekdayName => out.write_str(WEEKDAY_SHORT[cal.weekday as usize % 7]),
            Token::WeekdayFullName => out.write_str(WEEKDAY_FULL[cal.weekday as usize % 7]),
            Token::MonthName => out.write_str(MONTH_SHORT[(cal.month as usize + 11) % 12]),
            Token::MonthFullName => out.write_str(MONTH_FULL[(cal.month as usize + 11) % 12]),
            Token::DayOfYear => write!(out, "{:03}", cal.day_of_year),
            Token::Weekday => write!(out, "{}", cal.weekday),
            Token::Millis => write!(out, "{:03}", nanos / 1_000_000),
            Token::Micros => write!(out, "{:06}", nanos / 1_000),
            Token::Nanos => write!(out, "{:09}", nanos),
            Token::EpochSeconds => write!(out, "{}", record.timestamp.timestamp()),
            Token::Name => out.write_str(&record.name),
            Token::Level => out.write_str(record.level.padded_name()),
            Token::ThreadId => write!(out, "{}", record.thread_id),
            Token::ProcessId => write!(out, "{}", identity::process_id()),
            Token::MessageId => write!(out, "{:06}", record.message_id),
            Token::Time12 => write!(
                out,
                "{:02}:{:02}:{:02} {}",
                cal.hour12(),
                cal.minute,
                cal.second,
                am_pm
            ),
            Token::Time24 => write!(out, "{:02}:{:02}:{:02}", cal.hour, cal.minute, cal.second),
            Token::ShortDate => write!(
                out,
                "{:02}/{:02}/{:02}",
                cal.month,
                cal.day,
                cal.year.rem_euclid(100)
            ),
            Token::DateTime => write!(
                out,
                "{} {} {} {} {:02}:{:02}:{:02}",
                WEEKDAY_SHORT[cal.weekday as usize % 7],
                cal.day,
                MONTH_SHORT[(cal.month as usize + 11) % 12],
                cal.year,
                cal.hour,
                cal.minute,
                cal.second
            ),
            Token::Payload => out.write_str(&record.payload),
            Token::Full => write!(
                out,
                "[{}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}][{}][{}] {}",
                cal.year,
                cal.month,
                cal.day,
                cal.hour,
                cal.minute,
                cal.second,
                nanos / 1_000,
                record.name,
                record.level.padded_name(),
                record.payload
            ),
        };
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::compile(DEFAULT_PATTERN)
    }
}
