//! `ring-core` — a wait-free single-producer single-consumer ring buffer
//! for audio-style frame streaming.
//!
//! [`LockFreeRing<T>`] is the data-path primitive: a fixed, power-of-two
//! capacity array of `Copy` elements with monotonic write/read counters
//! and the release/acquire memory-ordering contract needed to publish
//! writes to a consumer on another thread without locks.
//!
//! This crate has no opinion on frames, channels, or blocking semantics —
//! see the `ring-async` crate for the cooperative, queued facade built on
//! top of it.
//!
//! # Example
//!
//! ```
//! use ring_core::LockFreeRing;
//!
//! let ring = LockFreeRing::<i16>::new(1024);
//! assert_eq!(ring.write(&[1, 2, 3]), 3);
//!
//! let mut out = [0i16; 3];
//! assert_eq!(ring.read(&mut out), 3);
//! assert_eq!(out, [1, 2, 3]);
//! ```

mod config;
mod invariants;
mod metrics;
mod ring;

pub use config::{RingConfig, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::LockFreeRing;
