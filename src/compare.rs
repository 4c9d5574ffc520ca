//! Constant-time buffer comparison.
//!
//! Use these instead of `==` when comparing secrets such as MACs or
//! tokens, so that timing does not reveal where two buffers diverge.

use thiserror::Error;

/// Errors from comparing buffers of different lengths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// The two buffers have different lengths.
    #[error("buffer lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first buffer.
        left: usize,
        /// Length of the second buffer.
        right: usize,
    },
}

/// Returns true iff any of the first `len` bytes of `a` and `b` differ.
///
/// Every byte of both prefixes is read and the result is tested once,
/// after the full scan. `len == 0` never differs.
///
/// # Panics
///
/// Panics if either buffer is shorter than `len`.
///
/// # Examples
///
/// ```
/// use keystream_csprng::compare::differs;
///
/// assert!(!differs(b"secret", b"secret", 6));
/// assert!(differs(b"secret", b"secreT", 6));
/// assert!(!differs(b"secret", b"secreT", 5));
/// ```
pub fn differs(a: &[u8], b: &[u8], len: usize) -> bool {
    let (a, b) = (&a[..len], &b[..len]);

    let mut acc = 0u8;
    for (x, y) in a.iter().zip(b) {
        acc |= x ^ y;
    }
    std::hint::black_box(acc) != 0
}

/// Compares two whole buffers in constant time.
///
/// Unequal lengths are rejected up front; the length of a secret is not
/// treated as secret.
pub fn differs_exact(a: &[u8], b: &[u8]) -> Result<bool, CompareError> {
    if a.len() != b.len() {
        return Err(CompareError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(differs(a, b, a.len()))
}
