//! Wall clock access.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;

/// A wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub secs: i64,
    /// Sub-second nanoseconds.
    pub nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp from seconds and nanoseconds.
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Byte image mixed into seed material: seconds then nanoseconds,
    /// each as a little-endian `i64`.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.secs.to_le_bytes());
        out[8..].copy_from_slice(&i64::from(self.nanos).to_le_bytes());
        out
    }
}

/// A source of wall-clock time.
pub trait Clock: Send {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Real time from the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = chrono::Utc::now();
        Timestamp::new(now.timestamp(), now.timestamp_subsec_nanos())
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    secs: Arc<AtomicI64>,
    nanos: Arc<AtomicU32>,
}

impl MockClock {
    /// Creates a clock stopped at `secs` past the epoch.
    pub fn new(secs: i64) -> Self {
        Self {
            secs: Arc::new(AtomicI64::new(secs)),
            nanos: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, at: Timestamp) {
        self.secs.store(at.secs, Ordering::SeqCst);
        self.nanos.store(at.nanos, Ordering::SeqCst);
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(
            self.secs.load(Ordering::SeqCst),
            self.nanos.load(Ordering::SeqCst),
        )
    }
}
