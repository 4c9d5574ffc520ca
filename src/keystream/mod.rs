//! Keystream primitive adapter.
//!
//! The generator never implements a cipher itself. It drives any type
//! implementing [`KeystreamPrimitive`], which lets tests substitute
//! recording or deterministic primitives for the ChaCha20 default.

mod chacha;

pub use chacha::ChaChaKeystream;

/// Key length in bytes (256-bit key).
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (64-bit nonce).
pub const NONCE_LEN: usize = 8;

/// Bytes of keystream consumed per rekey.
pub const SEED_LEN: usize = KEY_LEN + NONCE_LEN;

/// Keystream block size in bytes.
pub const BLOCK_LEN: usize = 64;

/// A stream cipher used purely as a keystream generator.
///
/// Implementations must be deterministic given `(key, nonce, position)`:
/// after `rekey`, successive `generate` calls continue the same stream.
pub trait KeystreamPrimitive: Send {
    /// Re-initializes the context from a key and nonce, resetting the
    /// stream position to zero. The previous context is overwritten.
    fn rekey(&mut self, key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN]);

    /// Writes the next `out.len()` keystream bytes into `out`.
    fn generate(&mut self, out: &mut [u8]);

    /// Destroys the current key by rekeying with all-zero material.
    fn wipe(&mut self) {
        self.rekey(&[0u8; KEY_LEN], &[0u8; NONCE_LEN]);
    }
}
