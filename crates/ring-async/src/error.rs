//! Error types for `ring-async` operations.

use thiserror::Error;

/// Errors that can occur in [`BlockingRing`](crate::BlockingRing) operations.
///
/// A short read or short write caused by the ring closing mid-operation is
/// *not* represented here — it is a normal result, observable by comparing
/// the returned frame count against the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// The caller-supplied buffer is shorter than `nframes * nchannels`.
    #[error("buffer holds {actual} elements, need at least {expected}")]
    ArgumentError { expected: usize, actual: usize },

    /// A matrix overload was given a row count that does not match the
    /// ring's configured channel count.
    #[error("expected {expected} channels, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    /// An allocating overload (e.g. the owned-matrix read) was called
    /// after the ring had already closed, so there is no sensible partial
    /// result to return.
    #[error("ring is closed")]
    Closed,
}

impl RingError {
    #[inline]
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::ArgumentError { .. } | Self::ChannelCountMismatch { .. })
    }
}
