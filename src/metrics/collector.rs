//! Metrics collection and registry.

use crate::engine::GeneratorStats;
use crate::entropy::EntropyState;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registering or encoding a metric failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of generator state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the generator has been keyed.
    pub initialized: bool,
    /// Total reseeds.
    pub reseed_count: u64,
    /// Total rekeys.
    pub rekey_count: u64,
    /// Total bytes handed to callers.
    pub bytes_served: u64,
    /// Bytes served since the last reseed.
    pub bytes_since_reseed: u64,
    /// Remaining rekey countdown.
    pub bytes_until_rekey: u64,
    /// Whether the last seeding had a short entropy read.
    pub entropy_degraded: bool,
    /// 0 = no entropy, 1 = have entropy, 2 = seeded.
    pub entropy_state: u8,
}

impl MetricsSnapshot {
    /// Creates a snapshot from generator statistics.
    pub fn from_stats(stats: &GeneratorStats) -> Self {
        Self {
            initialized: stats.initialized,
            reseed_count: stats.reseeds,
            rekey_count: stats.rekeys,
            bytes_served: stats.bytes_served,
            bytes_since_reseed: stats.bytes_since_reseed,
            bytes_until_rekey: stats.bytes_until_rekey,
            entropy_degraded: stats.seed_quality.is_degraded(),
            entropy_state: match stats.entropy_state {
                EntropyState::NoEntropy => 0,
                EntropyState::HaveEntropy => 1,
                EntropyState::Seeded => 2,
            },
        }
    }
}

/// Prometheus metrics registry for generator monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    initialized: IntGauge,
    reseed_total: IntCounter,
    rekey_total: IntCounter,
    bytes_served_total: IntCounter,
    bytes_since_reseed: IntGauge,
    bytes_until_rekey: IntGauge,
    entropy_degraded: IntGauge,
    entropy_state: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all generator metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let initialized = IntGauge::new(
            "keystream_csprng_initialized",
            "Whether the generator has been keyed (1=yes, 0=no)",
        )?;
        let reseed_total = IntCounter::new(
            "keystream_csprng_reseed_total",
            "Total number of reseeds performed",
        )?;
        let rekey_total = IntCounter::new(
            "keystream_csprng_rekey_total",
            "Total number of rekeys performed",
        )?;
        let bytes_served_total = IntCounter::new(
            "keystream_csprng_bytes_served_total",
            "Total random bytes handed to callers",
        )?;
        let bytes_since_reseed = IntGauge::new(
            "keystream_csprng_bytes_since_reseed",
            "Bytes requested since the last reseed",
        )?;
        let bytes_until_rekey = IntGauge::new(
            "keystream_csprng_bytes_until_rekey",
            "Bytes remaining before a mandatory rekey",
        )?;
        let entropy_degraded = IntGauge::new(
            "keystream_csprng_entropy_degraded",
            "Whether the last seed got a short entropy read (1=yes, 0=no)",
        )?;
        let entropy_state = IntGauge::new(
            "keystream_csprng_entropy_state",
            "Host entropy signal (0=none, 1=have, 2=seeded)",
        )?;

        registry.register(Box::new(initialized.clone()))?;
        registry.register(Box::new(reseed_total.clone()))?;
        registry.register(Box::new(rekey_total.clone()))?;
        registry.register(Box::new(bytes_served_total.clone()))?;
        registry.register(Box::new(bytes_since_reseed.clone()))?;
        registry.register(Box::new(bytes_until_rekey.clone()))?;
        registry.register(Box::new(entropy_degraded.clone()))?;
        registry.register(Box::new(entropy_state.clone()))?;

        Ok(Self {
            registry,
            initialized,
            reseed_total,
            rekey_total,
            bytes_served_total,
            bytes_since_reseed,
            bytes_until_rekey,
            entropy_degraded,
            entropy_state,
        })
    }

    /// Updates all metrics from a snapshot of generator state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.initialized.set(i64::from(snapshot.initialized));
        self.entropy_degraded.set(i64::from(snapshot.entropy_degraded));
        self.entropy_state.set(i64::from(snapshot.entropy_state));
        self.bytes_since_reseed.set(clamp(snapshot.bytes_since_reseed));
        self.bytes_until_rekey.set(clamp(snapshot.bytes_until_rekey));

        // Counters only move forward; apply the difference.
        advance(&self.reseed_total, snapshot.reseed_count);
        advance(&self.rekey_total, snapshot.rekey_count);
        advance(&self.bytes_served_total, snapshot.bytes_served);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
