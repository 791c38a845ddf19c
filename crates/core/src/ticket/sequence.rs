//! Sequence counter shared by concurrent identifier generation.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Counter value at which the sequence restarts from 1.
pub const SEQUENCE_CEILING: u32 = 100_000_000;

/// Observable state of a [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Identifiers are purely random.
    Disabled,
    /// Identifiers embed a sequence number; holds the last issued value
    /// (0 right after enabling).
    Sequencing(u32),
}

/// Lock-free sequence counter.
///
/// Starts disabled. [`enable`](Sequencer::enable) arms it at zero exactly
/// once; there is no way back to disabled.
#[derive(Debug, Default)]
pub struct Sequencer {
    enabled: AtomicBool,
    counter: AtomicU32,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the counter at zero. Returns true only for the call that
    /// performed the transition.
    pub fn enable(&self) -> bool {
        self.enabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SequenceState {
        if self.is_enabled() {
            SequenceState::Sequencing(self.counter.load(Ordering::SeqCst))
        } else {
            SequenceState::Disabled
        }
    }

    /// Issues the next sequence number, or `None` while disabled.
    ///
    /// The increment is a single atomic add so concurrent callers each see a
    /// distinct value. Reaching [`SEQUENCE_CEILING`] resets the counter to 1
    /// on a best-effort basis; losing that race lets the counter run past the
    /// ceiling until the next caller lands on it again.
    pub fn next_value(&self) -> Option<u32> {
        if !self.is_enabled() {
            return None;
        }

        let value = self.counter.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        let _ = self.counter.compare_exchange(
            SEQUENCE_CEILING,
            1,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );

        Some(value)
    }
}
