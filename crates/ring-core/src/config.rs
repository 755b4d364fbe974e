/// Configuration for a [`LockFreeRing`](crate::LockFreeRing).
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    /// Requested capacity in elements. The ring rounds this up to the
    /// next power of two at construction time.
    pub capacity_hint: usize,
    /// Enable atomic metrics collection (slight overhead on the hot path).
    pub enable_metrics: bool,
}

impl RingConfig {
    /// Creates a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_hint` is zero.
    #[must_use]
    pub const fn new(capacity_hint: usize, enable_metrics: bool) -> Self {
        assert!(capacity_hint > 0, "capacity_hint must be nonzero");
        Self {
            capacity_hint,
            enable_metrics,
        }
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity_hint: 1 << 16,
            enable_metrics: false,
        }
    }
}

/// Low-latency preset: 4K elements, fits comfortably in L1 cache.
pub const LOW_LATENCY_CONFIG: RingConfig = RingConfig::new(1 << 12, false);

/// High-throughput preset: 256K elements.
pub const HIGH_THROUGHPUT_CONFIG: RingConfig = RingConfig::new(1 << 18, false);
