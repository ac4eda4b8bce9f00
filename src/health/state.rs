//! Heartbeat run state.
//!
//! # States
//! - Running: the monitor accepts and performs polls
//! - Stopped: shutdown was requested; the heartbeat exits at its next tick
//!
//! # State Transitions
//! ```text
//! Running → Stopped: shutdown()
//! ```
//! There is no way back. A second shutdown is reported to the caller instead
//! of being applied twice.

use std::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    Running = 0,
    Stopped = 1,
}

impl From<u8> for HeartbeatState {
    fn from(val: u8) -> Self {
        match val {
            0 => HeartbeatState::Running,
            _ => HeartbeatState::Stopped,
        }
    }
}

/// Atomic cell holding a [`HeartbeatState`].
#[derive(Debug)]
pub struct RunState(AtomicU8);

impl RunState {
    pub fn new() -> Self {
        Self(AtomicU8::new(HeartbeatState::Running as u8))
    }

    pub fn get(&self) -> HeartbeatState {
        HeartbeatState::from(self.0.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.get() == HeartbeatState::Running
    }

    /// Move to `Stopped`. Returns `false` if the state was already `Stopped`.
    pub fn stop(&self) -> bool {
        self.0
            .compare_exchange(
                HeartbeatState::Running as u8,
                HeartbeatState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
