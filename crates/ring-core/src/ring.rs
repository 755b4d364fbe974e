use crate::invariants::{
    debug_assert_bounded_count, debug_assert_monotonic, debug_assert_no_wrap,
    debug_assert_read_not_past_write,
};
use crate::{Metrics, MetricsSnapshot, RingConfig};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic SPSC producer-consumer protocol.
//
// ## Sequence Numbers (ABA Prevention)
//
// `nwritten` and `nread` are unbounded u64 counters rather than wrapped
// indices. Buffer position is computed as `counter & mask` only when a
// slot is actually accessed; the counters themselves are never wrapped.
//
// ## Memory Ordering Protocol
//
// **Producer (write path):**
// 1. Load `nwritten` with Relaxed (only the producer writes it)
// 2. Load `cached_nread` via UnsafeCell (single-writer, no atomics)
// 3. If cache insufficient: load `nread` with Acquire
// 4. Copy data into buffer slots (protected by the protocol, no ordering needed)
// 5. Store `nwritten` with Release (publishes the writes to the consumer)
//
// **Consumer (read path):** symmetric, with `nread`/`nwritten` swapped.
//
// `cached_nread`/`cached_nwritten` are written only by their respective
// single owner, so UnsafeCell access without atomics is sound.
//
// =============================================================================

/// Wait-free single-producer single-consumer ring of `Copy` elements.
///
/// Optimized with:
/// - 128-byte alignment to prevent false sharing
/// - cached cursors to avoid cross-core reads on the common path
/// - a single shared wake handle doubling as the data-availability signal
///   used by the cooperative blocking facade layered on top of this ring
#[repr(C)]
pub struct LockFreeRing<T> {
    // === PRODUCER HOT === (128-byte aligned)
    nwritten: CacheAligned<AtomicU64>,
    cached_nread: CacheAligned<UnsafeCell<u64>>,

    // === CONSUMER HOT === (128-byte aligned)
    nread: CacheAligned<AtomicU64>,
    cached_nwritten: CacheAligned<UnsafeCell<u64>>,

    // === COLD STATE ===
    closed: AtomicBool,
    metrics: Metrics,
    config: RingConfig,
    capacity: usize,
    notify: Notify,

    // === DATA BUFFER ===
    buffer: UnsafeCell<Box<[MaybeUninit<T>]>>,
}

// Safety: all cross-thread communication happens through the atomics and
// through `Notify`; T only ever has one writer (producer) and one reader
// (consumer) at a time.
unsafe impl<T: Send> Send for LockFreeRing<T> {}
unsafe impl<T: Send> Sync for LockFreeRing<T> {}

impl<T: Copy> LockFreeRing<T> {
    /// Creates a ring whose capacity is the next power of two at least as
    /// large as `capacity_hint`.
    #[must_use]
    pub fn new(capacity_hint: usize) -> Self {
        Self::with_config(RingConfig::new(capacity_hint, false))
    }

    /// Creates a ring from an explicit [`RingConfig`].
    #[must_use]
    pub fn with_config(config: RingConfig) -> Self {
        let capacity = config.capacity_hint.next_power_of_two();

        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, MaybeUninit::uninit);
        let buffer = buffer.into_boxed_slice();

        Self {
            nwritten: CacheAligned::new(AtomicU64::new(0)),
            cached_nread: CacheAligned::new(UnsafeCell::new(0)),
            nread: CacheAligned::new(AtomicU64::new(0)),
            cached_nwritten: CacheAligned::new(UnsafeCell::new(0)),
            closed: AtomicBool::new(false),
            metrics: Metrics::new(),
            config,
            capacity,
            notify: Notify::new(),
            buffer: UnsafeCell::new(buffer),
        }
    }

    /// Ring capacity in elements (always a power of two).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity as u64
    }

    #[inline]
    fn mask(&self) -> u64 {
        self.capacity() - 1
    }

    /// Number of elements currently available to read.
    #[inline]
    #[must_use]
    pub fn readable(&self) -> u64 {
        let written = self.nwritten.load(Ordering::Acquire);
        let read = self.nread.load(Ordering::Relaxed);
        written.wrapping_sub(read)
    }

    /// Number of elements of free space currently available to write.
    #[inline]
    #[must_use]
    pub fn writable(&self) -> u64 {
        self.capacity() - self.readable()
    }

    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Copies as many elements of `src` into the ring as fit, publishing
    /// them with a release store. Returns the count actually written.
    ///
    /// Producer-only: calling this from more than one thread concurrently
    /// is a contract violation (undefined which writes land).
    pub fn write(&self, src: &[T]) -> u64 {
        let n = src.len() as u64;
        if n == 0 {
            return 0;
        }

        let written = self.nwritten.load(Ordering::Relaxed);

        // SAFETY: cached_nread is written only by the producer (this path).
        let cached_read = unsafe { *self.cached_nread.get() };
        let mut space = self.capacity() - written.wrapping_sub(cached_read);

        if space < n {
            let read = self.nread.load(Ordering::Acquire);
            // SAFETY: single-writer cell, see above.
            unsafe {
                *self.cached_nread.get() = read;
            }
            space = self.capacity() - written.wrapping_sub(read);
        }

        let to_write = space.min(n);
        if to_write == 0 {
            return 0;
        }

        self.copy_in(written, src, to_write);

        let new_written = written.wrapping_add(to_write);
        let read = self.nread.load(Ordering::Relaxed);
        debug_assert_bounded_count!(new_written.wrapping_sub(read), self.capacity());
        debug_assert_monotonic!("nwritten", written, new_written);
        debug_assert_no_wrap!("nwritten", written, new_written);

        self.nwritten.store(new_written, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_written(to_write);
        }

        self.notify.notify_waiters();
        to_write
    }

    /// Copies as many available elements as fit into `dst`, publishing the
    /// advance with a release store. Returns the count actually read.
    ///
    /// Consumer-only: calling this from more than one thread concurrently
    /// is a contract violation.
    pub fn read(&self, dst: &mut [T]) -> u64 {
        let n = dst.len() as u64;
        if n == 0 {
            return 0;
        }

        let read = self.nread.load(Ordering::Relaxed);

        // SAFETY: cached_nwritten is written only by the consumer (this path).
        let cached_written = unsafe { *self.cached_nwritten.get() };
        let mut avail = cached_written.wrapping_sub(read);

        if avail == 0 {
            let written = self.nwritten.load(Ordering::Acquire);
            // SAFETY: single-writer cell, see above.
            unsafe {
                *self.cached_nwritten.get() = written;
            }
            avail = written.wrapping_sub(read);
        }

        let to_read = avail.min(n);
        if to_read == 0 {
            return 0;
        }

        self.copy_out(read, dst, to_read);

        let new_read = read.wrapping_add(to_read);
        let written = self.nwritten.load(Ordering::Relaxed);
        debug_assert_read_not_past_write!(new_read, written);
        debug_assert_monotonic!("nread", read, new_read);

        self.nread.store(new_read, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_read(to_read);
        }

        self.notify.notify_waiters();
        to_read
    }

    /// Copies `count` elements from `src` into the buffer starting at the
    /// masked position of `start`, splitting across the wrap boundary.
    fn copy_in(&self, start: u64, src: &[T], count: u64) {
        let mask = self.mask();
        let idx = (start & mask) as usize;
        let count = count as usize;
        let first_len = count.min(self.capacity - idx);

        // SAFETY: idx is within bounds; these slots are strictly ahead of
        // `nread` (the consumer will not touch them until we publish
        // `nwritten`), so the producer has exclusive access.
        unsafe {
            let buf = &mut *self.buffer.get();
            let dst_ptr = buf.as_mut_ptr().cast::<T>();
            ptr::copy_nonoverlapping(src.as_ptr(), dst_ptr.add(idx), first_len);
            if count > first_len {
                ptr::copy_nonoverlapping(
                    src[first_len..].as_ptr(),
                    dst_ptr,
                    count - first_len,
                );
            }
        }
    }

    /// Copies `count` elements out of the buffer starting at the masked
    /// position of `start`, splitting across the wrap boundary.
    fn copy_out(&self, start: u64, dst: &mut [T], count: u64) {
        let mask = self.mask();
        let idx = (start & mask) as usize;
        let count = count as usize;
        let first_len = count.min(self.capacity - idx);

        // SAFETY: idx is within bounds; the range [nread, nwritten) was
        // published by the producer's release store of nwritten, observed
        // here via the matching acquire load.
        unsafe {
            let buf = &*self.buffer.get();
            let src_ptr = buf.as_ptr().cast::<T>();
            ptr::copy_nonoverlapping(src_ptr.add(idx), dst.as_mut_ptr(), first_len);
            if count > first_len {
                ptr::copy_nonoverlapping(
                    src_ptr,
                    dst[first_len..].as_mut_ptr(),
                    count - first_len,
                );
            }
        }
    }

    /// Suspends the caller until a `write`, `read`, `signal`, or `close`
    /// is observed. Spurious wakeups are permitted; callers must re-check
    /// the condition they were waiting for.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }

    /// Wakes any task currently suspended in [`wait`](Self::wait). Safe to
    /// call from any thread, including one outside the async runtime.
    pub fn signal(&self) {
        self.notify.notify_waiters();
    }

    /// Marks the ring closed and wakes every pending waiter. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Snapshot of write/read counters, or a zeroed snapshot if metrics
    /// were not enabled for this ring.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    /// Exposes the buffer base pointer and the two atomic cursors for a
    /// caller outside the cooperative runtime that wants to perform SPSC
    /// access directly (e.g. from a realtime audio callback thread with no
    /// `Waker`). The caller must follow the same release/acquire protocol
    /// documented on [`write`](Self::write)/[`read`](Self::read) and may
    /// call [`signal`](Self::signal) to wake a cooperative-side waiter.
    ///
    /// # Safety
    /// The returned pointer is valid for `capacity()` elements only as
    /// long as `self` is not dropped or moved. The caller must not read or
    /// write past the bounds published by the counters, and must not
    /// introduce a second concurrent producer or consumer.
    #[must_use]
    pub unsafe fn raw_parts(&self) -> (*mut T, *const AtomicU64, *const AtomicU64, u64) {
        let buf = (*self.buffer.get()).as_mut_ptr().cast::<T>();
        let nread: *const AtomicU64 = &*self.nread;
        let nwritten: *const AtomicU64 = &*self.nwritten;
        (buf, nread, nwritten, self.capacity())
    }
}

// ---------------------------------------------------------------------
// HELPER: 128-byte cache-aligned wrapper
// ---------------------------------------------------------------------

/// Ensures 128-byte alignment to prevent prefetcher-induced false sharing
/// on Intel/AMD CPUs (which may prefetch adjacent cache lines).
#[repr(align(128))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
