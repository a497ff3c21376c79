//! Component I: command state.
//!
//! Unlike the snapshot (#4.D, lock-based), this state is read and
//! written as a bare atomic load/store: the 1Hz telemetry task reads
//! it on every tick and must never block behind the command-RX task's
//! much rarer writes. `AtomicU8` gives a lock-free read with no
//! `#[shared]` resource or RTIC lock required.

use core::sync::atomic::{AtomicU8, Ordering};

pub const STATE_IDLE: u8 = 0;
pub const STATE_RUN: u8 = 1;

pub struct CommandState {
    raw: AtomicU8,
}

impl CommandState {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(STATE_IDLE),
        }
    }

    pub fn get(&self) -> u8 {
        self.raw.load(Ordering::Acquire)
    }

    pub fn set(&self, value: u8) {
        self.raw.store(value, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.get() == STATE_RUN
    }
}

impl Default for CommandState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Property 8: svc=1/sub=1 (test_start) drives the state to RUN;
    /// svc=1/sub=2 (test_stop) drives it back to IDLE.
    #[test]
    fn transitions_between_idle_and_run() {
        let state = CommandState::new();
        assert_eq!(state.get(), STATE_IDLE);
        assert!(!state.is_running());

        state.set(STATE_RUN);
        assert!(state.is_running());

        state.set(STATE_IDLE);
        assert!(!state.is_running());
    }
}
