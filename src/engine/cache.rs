//! Keystream cache.
//!
//! Unconsumed bytes sit at the tail of the buffer. Every byte handed out,
//! whether to a caller or as rekey material, is zeroed by a drop guard in
//! the same step that copies it, so no path (unwinding included) leaves a
//! served byte behind.

use super::fatal;
use crate::keystream::{KeystreamPrimitive, BLOCK_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Cache capacity: 16 keystream blocks.
pub const CACHE_LEN: usize = 16 * BLOCK_LEN;

/// Zeroes the wrapped region when dropped.
struct Consumed<'a>(&'a mut [u8]);

impl Drop for Consumed<'_> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct KeystreamCache {
    buf: [u8; CACHE_LEN],
    valid: usize,
}

impl KeystreamCache {
    pub(crate) fn new() -> Self {
        Self {
            buf: [0u8; CACHE_LEN],
            valid: 0,
        }
    }

    #[inline]
    pub(crate) fn valid_len(&self) -> usize {
        self.valid
    }

    /// Overwrites the whole buffer with fresh keystream.
    pub(crate) fn refill<K: KeystreamPrimitive>(&mut self, keystream: &mut K) {
        keystream.generate(&mut self.buf);
        self.valid = CACHE_LEN;
    }

    /// Copies up to `out.len()` bytes from the tail into `out`, zeroing
    /// them in the cache. Returns the number of bytes copied.
    pub(crate) fn drain(&mut self, out: &mut [u8]) -> usize {
        if self.valid > CACHE_LEN {
            fatal("keystream cache length exceeds capacity");
        }

        let m = out.len().min(self.valid);
        let start = CACHE_LEN - self.valid;
        let region = Consumed(&mut self.buf[start..start + m]);
        out[..m].copy_from_slice(&*region.0);
        drop(region);

        self.valid -= m;
        m
    }

    /// Discards all unconsumed bytes.
    pub(crate) fn clear(&mut self) {
        self.buf.zeroize();
        self.valid = 0;
    }

    /// The already-consumed front of the buffer.
    #[cfg(test)]
    pub(crate) fn consumed(&self) -> &[u8] {
        &self.buf[..CACHE_LEN - self.valid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystream::ChaChaKeystream;

    fn filled() -> KeystreamCache {
        let mut cache = KeystreamCache::new();
        let mut ks = ChaChaKeystream::new(&[5u8; 32], &[0u8; 8]);
        cache.refill(&mut ks);
        cache
    }

    #[test]
    fn test_starts_empty() {
        let mut cache = KeystreamCache::new();
        let mut out = [0xAAu8; 4];

        assert_eq!(cache.valid_len(), 0);
        assert_eq!(cache.drain(&mut out), 0);
        assert_eq!(out, [0xAAu8; 4]);
    }

    #[test]
    fn test_drain_serves_from_front_of_valid_region() {
        let mut cache = filled();
        let mut expected = [0u8; CACHE_LEN];
        ChaChaKeystream::new(&[5u8; 32], &[0u8; 8]).generate(&mut expected);

        let mut first = [0u8; 10];
        assert_eq!(cache.drain(&mut first), 10);
        assert_eq!(&first, &expected[..10]);

        let mut second = [0u8; 6];
        cache.drain(&mut second);
        assert_eq!(&second, &expected[10..16]);
        assert_eq!(cache.valid_len(), CACHE_LEN - 16);
    }

    #[test]
    fn test_drained_bytes_are_zeroed() {
        let mut cache = filled();
        let mut out = [0u8; 100];
        cache.drain(&mut out);

        assert_eq!(cache.consumed().len(), 100);
        assert!(cache.consumed().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_drain_stops_at_valid_len() {
        let mut cache = filled();
        let mut out = vec![0u8; CACHE_LEN + 10];

        assert_eq!(cache.drain(&mut out), CACHE_LEN);
        assert_eq!(cache.valid_len(), 0);
        assert!(cache.consumed().iter().all(|&b| b == 0));
        assert_eq!(&out[CACHE_LEN..], &[0u8; 10]);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut cache = filled();
        cache.clear();
        assert_eq!(cache.valid_len(), 0);
        assert!(cache.consumed().iter().all(|&b| b == 0));
    }
}
