//! Keystream CSPRNG Library
//!
//! A process-wide cryptographically secure pseudorandom number generator
//! built on a ChaCha20 keystream, plus constant-time buffer comparison for
//! consumers that compare secrets.
//!
//! # Architecture
//!
//! ```text
//! fill / next_word ──▶ lock ──▶ trigger policy ──▶ keystream cache ──▶ caller
//!                                  │                    ▲
//!                        entropy source + clock     keystream primitive
//! ```
//!
//! # Design Principles
//!
//! - **Fail-open, flagged**: output is never refused; a weak entropy read is
//!   reported through [`SeedQuality`] instead of an error
//! - **Backtracking resistance**: every cache refill rekeys the cipher from
//!   its own fresh keystream, and served bytes are zeroed immediately
//! - **Single critical section**: all state lives behind one lock
//! - **Replaceable collaborators**: cipher, entropy source and clock are
//!   traits, so tests can pin them
//!
//! # Example
//!
//! ```no_run
//! use keystream_csprng::{compare::differs_exact, global};
//!
//! let mut key = [0u8; 32];
//! global::fill(&mut key);
//!
//! let nonce = global::next_word();
//! # let _ = nonce;
//!
//! let tag = [0u8; 16];
//! let expected = [0u8; 16];
//! assert_eq!(differs_exact(&tag, &expected), Ok(false));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod compare;
pub mod config;
pub mod engine;
pub mod entropy;
pub mod global;
pub mod keystream;
pub mod metrics;

// Re-export commonly used types at crate root
pub use compare::{differs, differs_exact, CompareError};
pub use config::{ConfigError, FileConfig, GeneratorConfig};
pub use engine::{Generator, GeneratorStats, ReseedReason, SystemGenerator};
pub use entropy::{
    Clock, EntropySource, EntropyState, MockClock, OsEntropy, ScriptedEntropy, SeedQuality,
    SystemClock,
};
pub use keystream::{ChaChaKeystream, KeystreamPrimitive};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
