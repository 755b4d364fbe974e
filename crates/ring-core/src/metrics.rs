use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for a [`LockFreeRing`](crate::LockFreeRing).
///
/// Only touched when [`RingConfig::enable_metrics`](crate::RingConfig)
/// is set; otherwise the ring skips these stores entirely.
#[derive(Debug, Default)]
pub struct Metrics {
    elements_written: AtomicU64,
    elements_read: AtomicU64,
    write_calls: AtomicU64,
    read_calls: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_written(&self, n: u64) {
        self.elements_written.fetch_add(n, Ordering::Relaxed);
        self.write_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_read(&self, n: u64) {
        self.elements_read.fetch_add(n, Ordering::Relaxed);
        self.read_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            elements_written: self.elements_written.load(Ordering::Relaxed),
            elements_read: self.elements_read.load(Ordering::Relaxed),
            write_calls: self.write_calls.load(Ordering::Relaxed),
            read_calls: self.read_calls.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`Metrics`], safe to pass around and compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub elements_written: u64,
    pub elements_read: u64,
    pub write_calls: u64,
    pub read_calls: u64,
}
