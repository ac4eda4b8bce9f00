//! Time-ordered log of failure events.
//!
//! # Design Decisions
//! - One mutex covers both append and scan; readers and writers serialize
//! - The timestamp is read while the lock is held, so entries never go
//!   backwards relative to insertion order
//! - Optional retention evicts old entries on append; without it the log
//!   grows for the lifetime of the owner

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::health::clock::Clock;

/// Append-only failure log with a windowed count query.
#[derive(Debug, Default)]
pub struct FailureLog {
    entries: Mutex<VecDeque<i64>>,
    retention_secs: Option<u64>,
}

impl FailureLog {
    /// An unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that drops entries older than `secs` whenever a new one is added.
    pub fn with_retention(secs: u64) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            retention_secs: Some(secs),
        }
    }

    pub fn retention_secs(&self) -> Option<u64> {
        self.retention_secs
    }

    /// Append the current time.
    pub fn record(&self, clock: &dyn Clock) {
        let mut entries = self.lock();
        let now = clock.now_unix();

        if let Some(retention) = self.retention_secs {
            let retention = i64::try_from(retention).unwrap_or(i64::MAX);
            while entries.front().is_some_and(|&t| now.saturating_sub(t) >= retention) {
                entries.pop_front();
            }
        }

        entries.push_back(now);
    }

    /// Count entries whose age is strictly less than `window_secs`.
    pub fn count_recent(&self, clock: &dyn Clock, window_secs: u64) -> usize {
        if window_secs == 0 {
            return 0;
        }

        let entries = self.lock();
        let now = clock.now_unix();
        let window = i64::try_from(window_secs).unwrap_or(i64::MAX);

        entries
            .iter()
            .filter(|&&t| now.saturating_sub(t) < window)
            .count()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the retained timestamps, oldest first.
    pub fn entries(&self) -> Vec<i64> {
        self.lock().iter().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<i64>> {
        // A panic while holding the lock cannot leave the deque half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
