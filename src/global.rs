//! Process-wide generator instance.
//!
//! Created and seeded from OS entropy on first use, then shared for the
//! life of the process.

use crate::engine::SystemGenerator;
use std::sync::OnceLock;

static GENERATOR: OnceLock<SystemGenerator> = OnceLock::new();

/// Returns the process-wide generator, creating it on first use.
pub fn generator() -> &'static SystemGenerator {
    GENERATOR.get_or_init(SystemGenerator::from_os_entropy)
}

/// Fills `buf` from the process-wide generator.
pub fn fill(buf: &mut [u8]) {
    generator().fill(buf);
}

/// Returns one word from the process-wide generator.
pub fn next_word() -> u64 {
    generator().next_word()
}

/// Reseeds the process-wide generator now.
pub fn force_reseed() {
    generator().force_reseed();
}

/// Tells the process-wide generator that strong entropy is available.
pub fn signal_entropy_available() -> bool {
    generator().signal_entropy_available()
}
