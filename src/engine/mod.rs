//! Keystream cache and reseed engine.
//!
//! The engine owns all mutable generator state behind a single lock. Each
//! call evaluates the reseed policy, then drains the keystream cache,
//! rekeying whenever the cache runs dry.
//!
//! # Trigger policy
//!
//! Evaluated at the top of every call, first match wins:
//!
//! 1. the host signalled fresh entropy → reseed
//! 2. the caller asked for a reseed → reseed
//! 3. the byte-volume threshold was reached → reseed
//! 4. the mandatory reseed deadline passed → reseed
//! 5. the generator was never keyed → first stir
//! 6. the rekey countdown is exhausted → rekey
//! 7. otherwise the countdown is decremented

mod cache;
mod generator;
mod guarded;
mod state;

pub use cache::CACHE_LEN;
pub use generator::{Generator, SystemGenerator};

use crate::entropy::{EntropyState, SeedQuality};
use serde::Serialize;

/// Why a reseed happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReseedReason {
    /// The host signalled that strong entropy became available.
    EntropyAvailable,
    /// The caller requested a reseed along with its bytes.
    Requested,
    /// [`Generator::force_reseed`] was called.
    Forced,
    /// The byte-volume threshold was reached.
    ByteVolume,
    /// The mandatory reseed interval elapsed.
    Deadline,
}

/// Outcome of the per-call trigger policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Reseed(ReseedReason),
    FirstStir,
    Rekey,
    Countdown,
}

/// Point-in-time view of the generator's bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorStats {
    /// Whether the generator has been keyed.
    pub initialized: bool,
    /// Reseeds performed.
    pub reseeds: u64,
    /// Rekeys performed, including cache refills.
    pub rekeys: u64,
    /// First stirs performed (one per lifetime, absent shutdown).
    pub first_stirs: u64,
    /// Total bytes handed to callers.
    pub bytes_served: u64,
    /// Bytes requested since the last reseed.
    pub bytes_since_reseed: u64,
    /// Bytes remaining before a mandatory rekey.
    pub bytes_until_rekey: u64,
    /// Deadline for the next mandatory reseed, in Unix seconds.
    pub next_reseed_secs: i64,
    /// Unconsumed bytes in the keystream cache.
    pub cache_valid_len: usize,
    /// Quality of the most recent seeding.
    pub seed_quality: SeedQuality,
    /// Host entropy signal state.
    pub entropy_state: EntropyState,
    /// Reason for the most recent reseed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reseed_reason: Option<ReseedReason>,
}

/// Aborts on a broken internal invariant.
///
/// Serving bytes from inconsistent state is worse than stopping.
#[cold]
pub(crate) fn fatal(msg: &str) -> ! {
    tracing::error!(msg, "fatal generator invariant violation");
    std::process::abort()
}
