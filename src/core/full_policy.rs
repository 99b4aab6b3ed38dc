//! What an asynchronous logger does when its queue is full

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Policy for a record that does not fit in the async queue
///
/// # Example
///
/// ```
/// use tiny_logger::FullPolicy;
///
/// assert_eq!(FullPolicy::default(), FullPolicy::Retry);
/// assert_eq!("discard".parse::<FullPolicy>(), Ok(FullPolicy::Discard));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FullPolicy {
    /// Wait with escalating backoff until a slot frees up
    ///
    /// The producer is blocked while the worker is behind.
    #[default]
    Retry,

    /// Drop the record and count it in the logger metrics
    Discard,
}

impl fmt::Display for FullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FullPolicy::Retry => write!(f, "Retry"),
            FullPolicy::Discard => write!(f, "Discard"),
        }
    }
}

impl std::str::FromStr for FullPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" => Ok(FullPolicy::Retry),
            "discard" => Ok(FullPolicy::Discard),
            _ => Err(format!("Invalid full policy: '{}'", s)),
        }
    }
}

#[derive(Debug)]
pub struct AtomicFullPolicy(AtomicU8);

impl AtomicFullPolicy {
    pub const fn new(policy: FullPolicy) -> Self {
        Self(AtomicU8::new(policy as u8))
    }

    #[inline]
    pub fn load(&self) -> FullPolicy {
        match self.0.load(Ordering::Relaxed) {
            0 => FullPolicy::Retry,
            _ => FullPolicy::Discard,
        }
    }

    #[inline]
    pub fn store(&self, policy: FullPolicy) {
        self.0.store(policy as u8, Ordering::Relaxed);
    }
}
