//! External collaborators of the generator.
//!
//! The engine consumes entropy and time through traits so the host can
//! supply its own device and clock, and tests can pin both.

mod clock;
mod signal;
mod source;

pub use clock::{Clock, MockClock, SystemClock, Timestamp};
pub use signal::{EntropySignal, EntropyState};
pub use source::{EntropySource, NoEntropy, OsEntropy, ScriptedEntropy, SeedQuality};
