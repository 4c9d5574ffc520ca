//! Generator state and the reseed/rekey policy.
//!
//! # Rekey vs. reseed
//!
//! A *rekey* refills the cache from the current cipher context, loads a
//! new key and nonce from the first 40 bytes of that fresh keystream and
//! zeroes them. The remaining bytes are served to callers. Because the new
//! key never overlaps anything served, a later state compromise cannot
//! recover earlier output.
//!
//! A *reseed* additionally folds external entropy and the wall-clock time
//! into that new key, then discards the rest of the cache.

use super::cache::KeystreamCache;
use super::{ReseedReason, Trigger};
use crate::config::GeneratorConfig;
use crate::entropy::{Clock, EntropySignal, EntropySource, SeedQuality, Timestamp};
use crate::keystream::{KeystreamPrimitive, KEY_LEN, NONCE_LEN, SEED_LEN};
use zeroize::Zeroizing;

pub(crate) struct GeneratorState<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    pub(crate) keystream: K,
    entropy: E,
    clock: C,
    pub(crate) config: GeneratorConfig,
    pub(crate) cache: KeystreamCache,
    pub(crate) bytes_until_rekey: u64,
    pub(crate) initialized: bool,
    pub(crate) next_reseed_secs: i64,
    pub(crate) bytes_since_reseed: u64,
    pub(crate) seed_quality: SeedQuality,
    pub(crate) counters: Counters,
}

/// Instrumentation counters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub(crate) reseeds: u64,
    pub(crate) rekeys: u64,
    pub(crate) first_stirs: u64,
    pub(crate) bytes_served: u64,
    pub(crate) last_reseed_reason: Option<ReseedReason>,
}

impl<K, E, C> GeneratorState<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    pub(crate) fn new(keystream: K, entropy: E, clock: C, config: GeneratorConfig) -> Self {
        let next_reseed_secs = clock.now().secs.saturating_add(interval_secs(&config));
        Self {
            keystream,
            entropy,
            clock,
            config,
            cache: KeystreamCache::new(),
            bytes_until_rekey: 0,
            initialized: false,
            next_reseed_secs,
            bytes_since_reseed: 0,
            seed_quality: SeedQuality::Unseeded,
            counters: Counters::default(),
        }
    }

    /// Evaluates the trigger policy for a request of `len` bytes. First
    /// match wins.
    fn decide(
        &self,
        signal: &EntropySignal,
        requested: bool,
        len: u64,
        now: Timestamp,
    ) -> Trigger {
        if signal.consume() {
            Trigger::Reseed(ReseedReason::EntropyAvailable)
        } else if requested {
            Trigger::Reseed(ReseedReason::Requested)
        } else if self.bytes_since_reseed >= self.config.reseed_bytes {
            Trigger::Reseed(ReseedReason::ByteVolume)
        } else if now.secs > self.next_reseed_secs {
            Trigger::Reseed(ReseedReason::Deadline)
        } else if !self.initialized {
            Trigger::FirstStir
        } else if self.bytes_until_rekey <= len {
            Trigger::Rekey
        } else {
            Trigger::Countdown
        }
    }

    /// Runs the trigger policy ahead of serving `len` bytes.
    pub(crate) fn prepare(
        &mut self,
        signal: &EntropySignal,
        requested: bool,
        len: usize,
    ) -> Trigger {
        let len = len as u64;
        let now = self.clock.now();
        let trigger = self.decide(signal, requested, len, now);

        match trigger {
            Trigger::Reseed(reason) => self.reseed(now, reason),
            Trigger::FirstStir => self.first_stir(now),
            Trigger::Rekey => {
                self.rekey(None);
                self.bytes_until_rekey = self.config.rekey_bytes;
                tracing::trace!("mandatory rekey");
            }
            Trigger::Countdown => self.bytes_until_rekey -= len,
        }

        self.bytes_since_reseed = self.bytes_since_reseed.saturating_add(len);
        trigger
    }

    /// Serves `out.len()` bytes from the cache, rekeying whenever it runs dry.
    pub(crate) fn serve(&mut self, out: &mut [u8]) {
        let mut offset = 0;
        while offset < out.len() {
            if self.cache.valid_len() > 0 {
                offset += self.cache.drain(&mut out[offset..]);
            }
            if self.cache.valid_len() == 0 {
                self.rekey(None);
            }
        }
        self.counters.bytes_served = self.counters.bytes_served.saturating_add(out.len() as u64);
    }

    /// Serves a single word of at most 8 bytes without a refill loop.
    pub(crate) fn serve_word(&mut self, out: &mut [u8]) {
        debug_assert!(out.len() <= 8);
        if self.cache.valid_len() < out.len() {
            self.rekey(None);
        }
        if self.cache.drain(out) != out.len() {
            super::fatal("keystream cache underflow after rekey");
        }
        self.counters.bytes_served = self.counters.bytes_served.saturating_add(out.len() as u64);
    }

    /// Reloads the cipher from its own fresh keystream, optionally mixed
    /// with `mix`, and leaves the rest of that keystream in the cache.
    fn rekey(&mut self, mix: Option<&[u8; SEED_LEN]>) {
        self.cache.refill(&mut self.keystream);

        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        if self.cache.drain(&mut seed[..]) != SEED_LEN {
            super::fatal("keystream cache shorter than rekey material");
        }
        if let Some(mix) = mix {
            for (b, m) in seed.iter_mut().zip(mix.iter()) {
                *b ^= m;
            }
        }

        self.load_key(&seed);
        self.counters.rekeys += 1;
    }

    fn load_key(&mut self, seed: &[u8; SEED_LEN]) {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        let mut nonce = Zeroizing::new([0u8; NONCE_LEN]);
        key.copy_from_slice(&seed[..KEY_LEN]);
        nonce.copy_from_slice(&seed[KEY_LEN..]);
        self.keystream.rekey(&key, &nonce);
    }

    /// Reads the entropy source and builds seed material.
    ///
    /// Short reads are padded by repeating what was obtained; the
    /// timestamp is always mixed in so even an empty read perturbs state.
    fn gather_seed(&mut self, now: Timestamp) -> Zeroizing<[u8; SEED_LEN]> {
        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        let obtained = self.entropy.read(&mut seed[..KEY_LEN]).min(KEY_LEN);

        if obtained > 0 {
            for n in obtained..SEED_LEN {
                seed[n] = seed[n % obtained];
            }
        }
        for (b, t) in seed.iter_mut().zip(now.to_bytes()) {
            *b ^= t;
        }

        self.seed_quality = SeedQuality::from_read(obtained, KEY_LEN);
        if self.seed_quality.is_degraded() {
            tracing::warn!(
                obtained,
                requested = KEY_LEN,
                "entropy source returned a short read, seeding with degraded entropy"
            );
        }
        seed
    }

    /// Keys the cipher from seed material and drops any cached output.
    fn seed(&mut self, material: &[u8; SEED_LEN]) {
        if self.initialized {
            self.rekey(Some(material));
        } else {
            self.load_key(material);
        }
        self.cache.clear();
        self.initialized = true;
    }

    fn reseed(&mut self, now: Timestamp, reason: ReseedReason) {
        let material = self.gather_seed(now);
        self.seed(&material);

        self.bytes_until_rekey = self.config.rekey_bytes;
        self.bytes_since_reseed = 0;
        self.next_reseed_secs = now.secs.saturating_add(interval_secs(&self.config));
        self.counters.reseeds += 1;
        self.counters.last_reseed_reason = Some(reason);

        tracing::debug!(
            reason = ?reason,
            quality = ?self.seed_quality,
            reseeds = self.counters.reseeds,
            "generator reseeded"
        );
    }

    /// Reseeds immediately, outside the per-call trigger policy.
    pub(crate) fn force_reseed(&mut self) {
        let now = self.clock.now();
        self.reseed(now, ReseedReason::Forced);
    }

    /// Keys an uninitialized generator without counting as a reseed.
    fn first_stir(&mut self, now: Timestamp) {
        let material = self.gather_seed(now);
        self.seed(&material);

        self.bytes_until_rekey = self.config.initial_rekey_bytes;
        self.counters.first_stirs += 1;

        tracing::info!(quality = ?self.seed_quality, "generator initialized");
    }

    /// Destroys key material and cached output, returning to unseeded.
    pub(crate) fn wipe(&mut self) {
        self.cache.clear();
        self.keystream.wipe();
        self.initialized = false;
        self.bytes_until_rekey = 0;
        self.bytes_since_reseed = 0;
        self.seed_quality = SeedQuality::Unseeded;
    }
}

impl<K, E, C> Drop for GeneratorState<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    fn drop(&mut self) {
        self.keystream.wipe();
    }
}

fn interval_secs(config: &GeneratorConfig) -> i64 {
    i64::try_from(config.reseed_interval_secs).unwrap_or(i64::MAX)
}
