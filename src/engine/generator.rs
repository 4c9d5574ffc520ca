//! The public generator handle.

use super::guarded::Guarded;
use super::state::GeneratorState;
use super::GeneratorStats;
use crate::config::GeneratorConfig;
use crate::entropy::{
    Clock, EntropySignal, EntropySource, EntropyState, OsEntropy, SeedQuality, SystemClock,
};
use crate::keystream::{ChaChaKeystream, KeystreamPrimitive};
use rand_core::{CryptoRng, RngCore};

/// A generator backed by ChaCha20, OS entropy and the system clock.
pub type SystemGenerator = Generator<ChaChaKeystream, OsEntropy, SystemClock>;

/// Self-reseeding keystream CSPRNG.
///
/// All methods take `&self`; the generator serializes callers internally
/// and is meant to be shared (for example behind an `Arc` or in a
/// `static`).
///
/// # Failure model
///
/// Output is never refused. If the entropy source comes up short, the
/// generator seeds from what it got plus the current time and reports the
/// condition through [`Generator::seed_quality`].
pub struct Generator<K = ChaChaKeystream, E = OsEntropy, C = SystemClock>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    state: Guarded<GeneratorState<K, E, C>>,
    signal: EntropySignal,
}

impl SystemGenerator {
    /// Creates a generator seeded from the OS entropy source.
    ///
    /// The initial reseed happens here rather than on first use.
    pub fn from_os_entropy() -> Self {
        let generator = Self::new(ChaChaKeystream::default(), OsEntropy, SystemClock);
        generator.force_reseed();
        generator
    }
}

impl<K, E, C> Generator<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    /// Creates an unseeded generator with the default tuning.
    ///
    /// The first call keys it from the entropy source (a first stir).
    pub fn new(keystream: K, entropy: E, clock: C) -> Self {
        Self::with_config(keystream, entropy, clock, GeneratorConfig::default())
    }

    /// Creates an unseeded generator with custom tuning.
    ///
    /// An invalid configuration is logged and replaced with the defaults.
    pub fn with_config(keystream: K, entropy: E, clock: C, config: GeneratorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid generator config, using defaults");
                GeneratorConfig::default()
            }
        };
        Self {
            state: Guarded::new(GeneratorState::new(keystream, entropy, clock, config)),
            signal: EntropySignal::new(),
        }
    }

    /// Fills `buf` with random bytes.
    pub fn fill(&self, buf: &mut [u8]) {
        self.fill_inner(buf, false);
    }

    /// Fills `buf` with random bytes, reseeding first.
    pub fn fill_reseed(&self, buf: &mut [u8]) {
        self.fill_inner(buf, true);
    }

    fn fill_inner(&self, buf: &mut [u8], reseed: bool) {
        self.state.with(|state| {
            let trigger = state.prepare(&self.signal, reseed, buf.len());
            tracing::trace!(?trigger, len = buf.len(), "fill");
            state.serve(buf);
        });
    }

    /// Returns one random 64-bit word.
    pub fn next_word(&self) -> u64 {
        let mut word = [0u8; 8];
        self.word(&mut word);
        u64::from_le_bytes(word)
    }

    /// Returns one random 32-bit word.
    pub fn next_u32(&self) -> u32 {
        let mut word = [0u8; 4];
        self.word(&mut word);
        u32::from_le_bytes(word)
    }

    fn word(&self, out: &mut [u8]) {
        self.state.with(|state| {
            let trigger = state.prepare(&self.signal, false, out.len());
            tracing::trace!(?trigger, len = out.len(), "word");
            state.serve_word(out);
        });
    }

    /// Reseeds from the entropy source now, regardless of counters.
    pub fn force_reseed(&self) {
        self.state.with(|state| state.force_reseed());
    }

    /// Notifies the generator that strong entropy is available.
    ///
    /// The next call reseeds. Returns false if the host already signalled.
    pub fn signal_entropy_available(&self) -> bool {
        let raised = self.signal.raise();
        if raised {
            tracing::info!("host signalled entropy availability");
        }
        raised
    }

    /// Returns the host entropy signal state.
    pub fn entropy_state(&self) -> EntropyState {
        self.signal.state()
    }

    /// Returns the quality of the most recent seeding.
    pub fn seed_quality(&self) -> SeedQuality {
        self.state.with(|state| state.seed_quality)
    }

    /// Returns a snapshot of the generator's bookkeeping.
    pub fn stats(&self) -> GeneratorStats {
        let entropy_state = self.signal.state();
        self.state.with(|state| GeneratorStats {
            initialized: state.initialized,
            reseeds: state.counters.reseeds,
            rekeys: state.counters.rekeys,
            first_stirs: state.counters.first_stirs,
            bytes_served: state.counters.bytes_served,
            bytes_since_reseed: state.bytes_since_reseed,
            bytes_until_rekey: state.bytes_until_rekey,
            next_reseed_secs: state.next_reseed_secs,
            cache_valid_len: state.cache.valid_len(),
            seed_quality: state.seed_quality,
            entropy_state,
            last_reseed_reason: state.counters.last_reseed_reason,
        })
    }

    /// Wipes key material and cached output.
    ///
    /// The generator stays usable: the next call keys it again from
    /// scratch.
    pub fn shutdown(&self) {
        self.state.with(|state| state.wipe());
        tracing::info!("generator state wiped");
    }

    /// Returns the active tuning.
    pub fn config(&self) -> GeneratorConfig {
        self.state.with(|state| state.config.clone())
    }
}

impl<K, E, C> RngCore for &Generator<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    fn next_u32(&mut self) -> u32 {
        Generator::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        self.next_word()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

impl<K, E, C> CryptoRng for &Generator<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
}

impl<K, E, C> std::fmt::Debug for Generator<K, E, C>
where
    K: KeystreamPrimitive,
    E: EntropySource,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("entropy_state", &self.signal.state())
            .finish_non_exhaustive()
    }
}
