//! Escalating wait used by producers on a full queue and by idle workers
//!
//! The wait grows with the time already spent waiting: short waits return
//! immediately, then yield the CPU, then sleep in increasingly long steps.

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Below this much elapsed wait, return without pausing
    pub spin_until: Duration,
    /// Below this much elapsed wait, yield the thread
    pub yield_until: Duration,
    /// Below this much elapsed wait, sleep for `short_sleep`
    pub short_sleep_until: Duration,
    pub short_sleep: Duration,
    /// Sleep used once the wait exceeds `short_sleep_until`
    pub long_sleep: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            spin_until: Duration::from_micros(50),
            yield_until: Duration::from_micros(100),
            short_sleep_until: Duration::from_millis(200),
            short_sleep: Duration::from_millis(20),
            long_sleep: Duration::from_millis(100),
        }
    }
}

impl BackoffConfig {
    /// Pause once, according to how long the caller has been waiting since `since`
    pub fn sleep_or_yield(&self, since: Instant) {
        let elapsed = since.elapsed();
        if elapsed <= self.spin_until {
            std::hint::spin_loop();
        } else if elapsed <= self.yield_until {
            thread::yield_now();
        } else if elapsed <= self.short_sleep_until {
            thread::sleep(self.short_sleep);
        } else {
            thread::sleep(self.long_sleep);
        }
    }

    /// Configuration that never sleeps longer than `cap`
    #[must_use = "builder methods return a new value"]
    pub fn capped(mut self, cap: Duration) -> Self {
        self.short_sleep = self.short_sleep.min(cap);
        self.long_sleep = self.long_sleep.min(cap);
        self
    }
}
