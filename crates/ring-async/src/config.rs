//! Configuration for [`BlockingRing`](crate::BlockingRing) behavior.

/// What a writer does when the ring has no room for its remaining frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Suspend the writer until space opens up or the ring closes.
    Block,
    /// Write only what currently fits and return immediately.
    Truncate,
    /// Advance the read cursor to make room, discarding the oldest
    /// unread frames, and always write every requested frame.
    Overwrite,
}

/// What a reader does when the ring has fewer frames than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderflowPolicy {
    /// Suspend the reader until more data arrives or the ring closes.
    Block,
    /// Read only what is currently available and return immediately.
    Truncate,
    /// Read what is available and zero-fill the remainder of the
    /// destination, always reporting the requested frame count.
    Pad,
}

/// Configuration for a [`BlockingRing`](crate::BlockingRing).
#[derive(Debug, Clone, Copy)]
pub struct BlockingRingConfig {
    /// Number of interleaved channels per frame.
    pub nchannels: usize,
    /// Ring capacity in frames (rounded up to a power of two).
    pub frames: usize,
    /// Policy applied when a write cannot fit.
    pub overflow: OverflowPolicy,
    /// Policy applied when a read has insufficient data.
    pub underflow: UnderflowPolicy,
    /// Enable the underlying ring's atomic metrics.
    pub enable_metrics: bool,
}

impl BlockingRingConfig {
    /// Creates a new configuration with explicit policies.
    #[must_use]
    pub const fn new(
        nchannels: usize,
        frames: usize,
        overflow: OverflowPolicy,
        underflow: UnderflowPolicy,
    ) -> Self {
        Self {
            nchannels,
            frames,
            overflow,
            underflow,
            enable_metrics: false,
        }
    }

    /// BLOCK on both sides — the only combination under which `close`
    /// deterministically cancels every in-progress caller with a
    /// well-defined partial count, since no side ever silently truncates
    /// or overwrites out from under a queued peer.
    #[must_use]
    pub const fn realtime_safe(nchannels: usize, frames: usize) -> Self {
        Self::new(nchannels, frames, OverflowPolicy::Block, UnderflowPolicy::Block)
    }

    #[must_use]
    pub const fn with_enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}
