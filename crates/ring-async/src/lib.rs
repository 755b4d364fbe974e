//! `ring-async` — a cooperative, queued blocking facade over `ring-core`.
//!
//! [`BlockingRing<T>`] presents a traditional frame-oriented read/write
//! API on top of a wait-free [`ring_core::LockFreeRing`]: callers that
//! would otherwise overrun or underrun the ring suspend on a FIFO
//! [`WaiterQueue`] instead, and wake in enqueue order once their request
//! can make progress or the ring closes.
//!
//! # Features
//!
//! - **Head-of-queue discipline**: only the first-enqueued reader (resp.
//!   writer) attempts progress; everyone else stays suspended.
//! - **Configurable overflow/underflow policies**: BLOCK (the default,
//!   required for deterministic close-cancellation), TRUNCATE, PAD
//!   (reads only), OVERWRITE (writes only).
//! - **Graceful shutdown**: `close()` is idempotent, wakes every queued
//!   waiter, and causes any in-progress caller to return its partial
//!   count on its next check.
//!
//! # Example
//!
//! ```
//! use ring_async::BlockingRing;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let ring = BlockingRing::<i16>::new(2, 1024);
//! let written = ring.write(&[1, 2, 3, 4], 2).await.unwrap();
//! assert_eq!(written, 2);
//!
//! let mut out = [0i16; 4];
//! let read = ring.read(&mut out, 2).await.unwrap();
//! assert_eq!(read, 2);
//! # }
//! ```

mod blocking_ring;
mod config;
mod error;
mod invariants;
mod waiter_queue;

pub use blocking_ring::BlockingRing;
pub use config::{BlockingRingConfig, OverflowPolicy, UnderflowPolicy};
pub use error::RingError;
pub use waiter_queue::WaiterQueue;
