//! Property-based tests for tiny_logger using proptest

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use tiny_logger::prelude::*;
use tiny_logger::BoundedQueue;

fn any_level() -> impl Strategy<Value = LogLevel> {
    (0u8..7).prop_map(LogLevel::from_u8)
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let lowered: LogLevel = level.to_str().to_lowercase().parse().unwrap();
        prop_assert_eq!(level, lowered);
    }

    /// Test that LogLevel ordering follows the numeric value
    #[test]
    fn test_log_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, a.as_u8() <= b.as_u8());
        prop_assert_eq!(a > b, a.as_u8() > b.as_u8());
    }

    /// Padded names always fill exactly five columns
    #[test]
    fn test_padded_name_width(level in any_level()) {
        prop_assert_eq!(level.padded_name().len(), 5);
    }
}

// ============================================================================
// BoundedQueue Tests
// ============================================================================

proptest! {
    /// Whatever fits in the queue comes back out in FIFO order
    #[test]
    fn test_queue_fifo(shift in 1u32..8, items in prop::collection::vec(any::<u32>(), 0..300)) {
        let capacity = 1usize << shift;
        let queue = BoundedQueue::new(capacity).unwrap();

        let mut accepted = Vec::new();
        for item in &items {
            if queue.write(*item).is_ok() {
                accepted.push(*item);
            }
        }
        prop_assert_eq!(accepted.len(), items.len().min(capacity));
        prop_assert_eq!(queue.len(), accepted.len());

        let mut drained = Vec::new();
        while let Some(item) = queue.read() {
            drained.push(item);
        }
        prop_assert_eq!(drained, accepted);
        prop_assert!(queue.is_empty());
    }

    /// Only powers of two from 2 upward are accepted
    #[test]
    fn test_queue_capacity_validation(capacity in 0usize..5000) {
        let valid = capacity >= 2 && capacity.is_power_of_two();
        prop_assert_eq!(BoundedQueue::<u8>::new(capacity).is_ok(), valid);
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// Patterns without directives render verbatim
    #[test]
    fn test_literal_pattern(text in "[a-zA-Z0-9 .:\\[\\]-]{0,40}") {
        let formatter = Formatter::compile(text.as_str()).with_line_ending("\n");
        let mut record = LogRecord::new(Arc::from("prop"), LogLevel::Info, 1, "x".to_string());
        formatter.format(&mut record);
        prop_assert_eq!(record.formatted_str(), format!("{}\n", text));
    }

    /// The payload directive copies the message unchanged
    #[test]
    fn test_payload_passthrough(payload in ".{0,200}", level in any_level()) {
        let formatter = Formatter::compile("%v").with_line_ending("");
        let mut record = LogRecord::new(Arc::from("prop"), level, 1, payload.clone());
        formatter.format(&mut record);
        prop_assert_eq!(record.formatted_str(), payload);
    }

    /// Formatting the same record twice gives the same bytes
    #[test]
    fn test_formatting_is_deterministic(
        secs in 0i64..4_000_000_000,
        nanos in 0u32..1_000_000_000,
        level in any_level(),
        message_id in 1u64..1_000_000,
    ) {
        let timestamp = Utc.timestamp_opt(secs, nanos).unwrap();
        let formatter = Formatter::compile("%c %j %r %F %n %i %L %v")
            .with_time_zone(FormatterTimeZone::Utc);
        let mut first = LogRecord::new(Arc::from("prop"), level, message_id, "m".to_string())
            .with_timestamp(timestamp);
        let mut second = first.clone();

        formatter.format(&mut first);
        formatter.format(&mut second);
        formatter.format(&mut second);

        prop_assert_eq!(first.formatted, second.formatted);
    }
}
