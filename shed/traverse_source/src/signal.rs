/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

/// Where a single traversal call stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CallState {
    Running,
    Stopped,
    Failed,
    Completed,
}

impl CallState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => CallState::Running,
            1 => CallState::Stopped,
            2 => CallState::Failed,
            _ => CallState::Completed,
        }
    }
}

/// Call state shared by every segment of one traversal call.
///
/// Transitions: `Running -> Stopped`, `Running | Stopped -> Failed`,
/// `Running -> Completed`. `Failed` and `Completed` are terminal.
#[derive(Debug)]
pub(crate) struct Signal {
    state: AtomicU8,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(CallState::Running as u8),
        }
    }

    pub(crate) fn state(&self) -> CallState {
        CallState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether segments should stop offering elements.
    pub(crate) fn is_halted(&self) -> bool {
        matches!(self.state(), CallState::Stopped | CallState::Failed)
    }

    /// Record a voluntary stop. Returns true for the segment that caused it.
    pub(crate) fn stop(&self) -> bool {
        self.transition(CallState::Running, CallState::Stopped)
    }

    /// Record a failure. Returns true for the first failing segment.
    pub(crate) fn fail(&self) -> bool {
        let prev = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                match CallState::from_u8(raw) {
                    CallState::Running | CallState::Stopped => Some(CallState::Failed as u8),
                    CallState::Failed | CallState::Completed => None,
                }
            });
        prev.is_ok()
    }

    /// Close the call. Returns true iff nothing stopped or failed.
    pub(crate) fn complete(&self) -> bool {
        self.transition(CallState::Running, CallState::Completed)
    }

    fn transition(&self, from: CallState, to: CallState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn completes_when_untouched() {
        let signal = Signal::new();
        assert!(!signal.is_halted());
        assert!(signal.complete());
        assert_eq!(signal.state(), CallState::Completed);
        assert!(!signal.stop());
        assert!(!signal.fail());
    }

    #[test]
    fn first_stop_wins() {
        let signal = Signal::new();
        assert!(signal.stop());
        assert!(!signal.stop());
        assert!(signal.is_halted());
        assert!(!signal.complete());
        assert_eq!(signal.state(), CallState::Stopped);
    }

    #[test]
    fn failure_overrides_stop() {
        let signal = Signal::new();
        assert!(signal.stop());
        assert!(signal.fail());
        assert!(!signal.fail());
        assert_eq!(signal.state(), CallState::Failed);
        assert!(signal.is_halted());
    }
}
