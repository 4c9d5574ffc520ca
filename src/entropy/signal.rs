//! Host notification that strong entropy has become available.
//!
//! The signal lives outside the generator lock so the host can raise it
//! from any context without contending with callers.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

const NO_ENTROPY: u8 = 0;
const HAVE_ENTROPY: u8 = 1;
const SEEDED: u8 = 2;

/// Whether the host has delivered fresh strong entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntropyState {
    /// No signal from the host yet.
    NoEntropy,
    /// The host signalled; the generator has not reseeded from it yet.
    HaveEntropy,
    /// The generator has reseeded after the host signal.
    Seeded,
}

/// Lock-free tri-state entropy flag.
#[derive(Debug)]
pub struct EntropySignal(AtomicU8);

impl EntropySignal {
    /// Creates a signal in the no-entropy state.
    pub const fn new() -> Self {
        Self(AtomicU8::new(NO_ENTROPY))
    }

    /// Returns the current state.
    pub fn state(&self) -> EntropyState {
        match self.0.load(Ordering::Acquire) {
            NO_ENTROPY => EntropyState::NoEntropy,
            HAVE_ENTROPY => EntropyState::HaveEntropy,
            _ => EntropyState::Seeded,
        }
    }

    /// Marks entropy as available. One-shot: returns false if the host
    /// already signalled.
    pub fn raise(&self) -> bool {
        self.0
            .compare_exchange(NO_ENTROPY, HAVE_ENTROPY, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Consumes a pending signal. Returns true exactly once per `raise`.
    pub(crate) fn consume(&self) -> bool {
        self.0
            .compare_exchange(HAVE_ENTROPY, SEEDED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for EntropySignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_without_entropy() {
        let signal = EntropySignal::new();
        assert_eq!(signal.state(), EntropyState::NoEntropy);
        assert!(!signal.consume());
    }

    #[test]
    fn test_raise_then_consume_once() {
        let signal = EntropySignal::new();

        assert!(signal.raise());
        assert_eq!(signal.state(), EntropyState::HaveEntropy);

        assert!(signal.consume());
        assert_eq!(signal.state(), EntropyState::Seeded);
        assert!(!signal.consume());
    }

    #[test]
    fn test_raise_is_one_shot() {
        let signal = EntropySignal::new();
        assert!(signal.raise());
        assert!(!signal.raise());

        signal.consume();
        assert!(!signal.raise());
        assert_eq!(signal.state(), EntropyState::Seeded);
    }
}
