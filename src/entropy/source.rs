//! Entropy source abstraction.
//!
//! Sources may return fewer bytes than requested, including none at all.
//! The generator absorbs short reads rather than failing, and records how
//! much it actually obtained as a [`SeedQuality`].

use serde::Serialize;

/// A source of fresh seed material.
pub trait EntropySource: Send {
    /// Fills up to `buf.len()` bytes and returns how many were written.
    ///
    /// Must not block indefinitely. Returning 0 is a valid outcome.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

impl<T: EntropySource + ?Sized> EntropySource for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

/// Operating system entropy via `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        use rand_core::RngCore;

        match rand_core::OsRng.try_fill_bytes(buf) {
            Ok(()) => buf.len(),
            Err(e) => {
                tracing::warn!(error = %e, "OS entropy read failed");
                0
            }
        }
    }
}

/// Deterministic source returning the same scripted bytes on every read.
///
/// Reads are truncated to the script length, so a short script models a
/// device that only ever delivers partial reads.
#[derive(Clone, Default)]
pub struct ScriptedEntropy {
    script: Vec<u8>,
}

impl ScriptedEntropy {
    /// Creates a source that serves `script` on every read.
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl EntropySource for ScriptedEntropy {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.script.len());
        buf[..n].copy_from_slice(&self.script[..n]);
        n
    }
}

impl std::fmt::Debug for ScriptedEntropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedEntropy")
            .field("len", &self.script.len())
            .finish_non_exhaustive()
    }
}

/// A source that never yields anything, as on a host without an entropy device.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEntropy;

impl EntropySource for NoEntropy {
    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

/// Quality of the most recent seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SeedQuality {
    /// The generator has not been seeded yet.
    #[default]
    Unseeded,
    /// The entropy source delivered everything requested.
    Full,
    /// Short read: the seed was padded and perturbed only by the timestamp
    /// beyond `obtained` bytes.
    Degraded {
        /// Bytes the source delivered.
        obtained: usize,
        /// Bytes asked for.
        requested: usize,
    },
}

impl SeedQuality {
    /// Classifies a read of `obtained` out of `requested` bytes.
    pub fn from_read(obtained: usize, requested: usize) -> Self {
        if obtained >= requested {
            SeedQuality::Full
        } else {
            SeedQuality::Degraded {
                obtained,
                requested,
            }
        }
    }

    /// Returns true if the last seed did not get full entropy.
    pub fn is_degraded(&self) -> bool {
        matches!(self, SeedQuality::Degraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_short_read() {
        let mut source = ScriptedEntropy::new(vec![1, 2, 3]);
        let mut buf = [0u8; 8];

        assert_eq!(source.read(&mut buf), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(&buf[3..], &[0u8; 5]);
    }

    #[test]
    fn test_scripted_repeats_on_every_read() {
        let mut source = ScriptedEntropy::new((0u8..32).collect::<Vec<_>>());
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        source.read(&mut a);
        source.read(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_entropy_returns_zero() {
        let mut buf = [0xAAu8; 16];
        assert_eq!(NoEntropy.read(&mut buf), 0);
        assert_eq!(buf, [0xAAu8; 16]);
    }

    #[test]
    fn test_os_entropy_fills_buffer() {
        let mut buf = [0u8; 32];
        assert_eq!(OsEntropy.read(&mut buf), 32);
    }

    #[test]
    fn test_seed_quality_classification() {
        assert_eq!(SeedQuality::from_read(32, 32), SeedQuality::Full);
        assert!(SeedQuality::from_read(0, 32).is_degraded());
        assert_eq!(
            SeedQuality::from_read(5, 32),
            SeedQuality::Degraded {
                obtained: 5,
                requested: 32
            }
        );
        assert!(!SeedQuality::Unseeded.is_degraded());
    }
}
