//! Delivery counters kept by every logger
//!
//! A record either reaches the sink fan-out or is thrown away by the
//! `Discard` full-queue policy. `Retry` never loses a record but can make a
//! producer wait, so waits are counted separately from drops.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-logger delivery counters
///
/// The producer side bumps the queue counters, the side that writes to
/// sinks (caller or worker) bumps the delivery counters. All updates are
/// relaxed, so a reading taken mid-burst is only a lower bound.
///
/// # Example
///
/// ```
/// use tiny_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_queue_full();
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.drop_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records thrown away under `Discard` or after the worker died
    dropped_count: AtomicU64,

    /// Records every sink accepted
    total_logged: AtomicU64,

    /// Records that found the queue without a free slot, whatever the policy
    queue_full_events: AtomicU64,

    /// `Retry` producers that had to back off at least once
    retry_events: AtomicU64,

    /// Records rejected by one or more sinks, panics included
    sink_failures: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            retry_events: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Records written to every sink without error
    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn retry_events(&self) -> u64 {
        self.retry_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Count a discarded record; returns the count before this one
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Count a producer entering the `Retry` backoff loop
    #[inline]
    pub fn record_retry(&self) -> u64 {
        self.retry_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Count a record the fan-out reported as failed
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Discarded records as a percentage of discarded plus delivered
    ///
    /// Sink failures are left out of both sides. 0.0 before any record.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
        self.retry_events.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Point-in-time copy that no longer follows the logger
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
            retry_events: AtomicU64::new(self.retry_events()),
            sink_failures: AtomicU64::new(self.sink_failures()),
        }
    }
}
