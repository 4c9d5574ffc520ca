//! Prometheus metrics exporter for generator monitoring.
//!
//! # Metrics Exposed
//!
//! - `keystream_csprng_initialized` - Whether the generator has been keyed (1/0)
//! - `keystream_csprng_reseed_total` - Total reseeds performed
//! - `keystream_csprng_rekey_total` - Total rekeys performed
//! - `keystream_csprng_bytes_served_total` - Total bytes handed to callers
//! - `keystream_csprng_bytes_since_reseed` - Bytes requested since last reseed
//! - `keystream_csprng_bytes_until_rekey` - Bytes left before a mandatory rekey
//! - `keystream_csprng_entropy_degraded` - Last seed got a short entropy read (1/0)
//! - `keystream_csprng_entropy_state` - Host signal (0=none, 1=have, 2=seeded)
//!
//! # Example
//!
//! ```no_run
//! use keystream_csprng::{metrics::{MetricsRegistry, MetricsSnapshot}, SystemGenerator};
//!
//! let generator = SystemGenerator::from_os_entropy();
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot::from_stats(&generator.stats()));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError, SnapshotSource};
