//! Cooperative, queued blocking reads/writes over a [`LockFreeRing`].

use crate::config::{BlockingRingConfig, OverflowPolicy, UnderflowPolicy};
use crate::error::RingError;
use crate::invariants::debug_assert_partial_count_bounded;
use crate::waiter_queue::WaiterQueue;
use ring_core::{LockFreeRing, MetricsSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};

/// A frame-oriented ring that blocks callers until their request can be
/// satisfied (or the ring closes), serializing concurrent readers among
/// themselves and concurrent writers among themselves via FIFO queues.
///
/// Frames are interleaved: `nchannels` elements of `T` per frame. The
/// underlying [`LockFreeRing`] measures its capacity in elements, so one
/// frame is `nchannels` ring elements.
pub struct BlockingRing<T> {
    inner: LockFreeRing<T>,
    nchannels: usize,
    readers: WaiterQueue,
    writers: WaiterQueue,
    open: AtomicBool,
    overflow: OverflowPolicy,
    underflow: UnderflowPolicy,
}

impl<T: Copy + Default> BlockingRing<T> {
    /// Creates a ring sized for `frames` frames of `nchannels` channels
    /// each, using the BLOCK policy on both sides.
    #[must_use]
    pub fn new(nchannels: usize, frames: usize) -> Self {
        Self::with_config(BlockingRingConfig::realtime_safe(nchannels, frames))
    }

    /// Creates a ring from an explicit [`BlockingRingConfig`].
    #[must_use]
    pub fn with_config(config: BlockingRingConfig) -> Self {
        assert!(config.nchannels >= 1, "nchannels must be at least 1");
        let ring_config = ring_core::RingConfig::new(
            config.frames.max(1) * config.nchannels,
            config.enable_metrics,
        );
        Self {
            inner: LockFreeRing::with_config(ring_config),
            nchannels: config.nchannels,
            readers: WaiterQueue::new(),
            writers: WaiterQueue::new(),
            open: AtomicBool::new(true),
            overflow: config.overflow,
            underflow: config.underflow,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn nchannels(&self) -> usize {
        self.nchannels
    }

    /// Size in bytes of one interleaved frame (`nchannels * size_of::<T>()`).
    #[inline]
    #[must_use]
    pub fn frame_bytes(&self) -> usize {
        self.nchannels * std::mem::size_of::<T>()
    }

    /// Frames currently available to read.
    #[must_use]
    pub fn readable_frames(&self) -> u64 {
        self.inner.readable() / self.nchannels as u64
    }

    /// Frames of free space currently available to write.
    #[must_use]
    pub fn writable_frames(&self) -> u64 {
        self.inner.writable() / self.nchannels as u64
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics()
    }

    /// Writes `nframes` frames from `data` (interleaved, `nframes *
    /// nchannels` elements). Blocks according to the configured
    /// [`OverflowPolicy`] when the ring has no room. Returns the number
    /// of frames actually written — fewer than `nframes` only if the
    /// ring closed mid-write (BLOCK) or the policy permits a short write
    /// (TRUNCATE).
    pub async fn write(&self, data: &[T], nframes: u64) -> Result<u64, RingError> {
        let need = nframes as usize * self.nchannels;
        if data.len() < need {
            return Err(RingError::ArgumentError {
                expected: need,
                actual: data.len(),
            });
        }
        if !self.is_open() {
            return Ok(0);
        }

        let (position, turn) = self.writers.enqueue();
        if position != 0 && turn.await.is_err() {
            return Ok(0);
        }
        if !self.is_open() {
            // close() already popped this waiter while draining the queue.
            return Ok(0);
        }

        let written = self.write_while_head(data, nframes).await;
        debug_assert_partial_count_bounded!(written, nframes);

        self.inner.signal();
        self.writers.pop_head();
        Ok(written)
    }

    /// Infers `nframes` from `data.len() / nchannels` and writes it.
    pub async fn write_flat(&self, data: &[T]) -> Result<u64, RingError> {
        let nframes = (data.len() / self.nchannels) as u64;
        self.write(data, nframes).await
    }

    /// Writes a per-channel matrix (one slice per channel, `rows ==
    /// nchannels`), interleaving it internally before writing.
    pub async fn write_matrix(&self, channels: &[&[T]]) -> Result<u64, RingError> {
        if channels.len() != self.nchannels {
            return Err(RingError::ChannelCountMismatch {
                expected: self.nchannels,
                actual: channels.len(),
            });
        }
        let nframes = channels.iter().map(|c| c.len()).min().unwrap_or(0) as u64;
        let mut flat = Vec::with_capacity(nframes as usize * self.nchannels);
        for frame in 0..nframes as usize {
            for ch in channels {
                flat.push(ch[frame]);
            }
        }
        self.write(&flat, nframes).await
    }

    async fn write_while_head(&self, data: &[T], nframes: u64) -> u64 {
        let mut written_frames = 0u64;

        match self.overflow {
            OverflowPolicy::Truncate => {
                let remaining = (nframes - written_frames) as usize * self.nchannels;
                let written_elems = self.inner.write(&data[..remaining]);
                written_frames = written_elems / self.nchannels as u64;
            }
            OverflowPolicy::Overwrite => {
                let capacity_frames = self.inner.capacity() / self.nchannels as u64;
                if nframes >= capacity_frames {
                    // Discard whatever is buffered; write only the
                    // trailing `capacity_frames` frames of `data`. The
                    // ring cannot hold more than `capacity_frames`
                    // frames, but OVERWRITE always reports the full
                    // request as written.
                    let skip_frames = nframes - capacity_frames;
                    let start = skip_frames as usize * self.nchannels;
                    let mut dummy = vec![T::default(); self.inner.readable() as usize];
                    self.inner.read(&mut dummy);
                    self.inner.write(&data[start..]);
                    written_frames = nframes;
                } else {
                    let needed_elems = nframes as usize * self.nchannels;
                    let shortfall = (needed_elems as u64).saturating_sub(self.inner.writable());
                    if shortfall > 0 {
                        let mut discard = vec![T::default(); shortfall as usize];
                        self.inner.read(&mut discard);
                    }
                    let written_elems = self.inner.write(&data[..needed_elems]);
                    written_frames = written_elems / self.nchannels as u64;
                }
            }
            OverflowPolicy::Block => loop {
                if !self.is_open() {
                    break;
                }
                let remaining = nframes - written_frames;
                if remaining == 0 {
                    break;
                }
                let start = written_frames as usize * self.nchannels;
                let end = (written_frames + remaining) as usize * self.nchannels;
                let written_elems = self.inner.write(&data[start..end]);
                let this_round = written_elems / self.nchannels as u64;
                written_frames += this_round;
                if written_frames >= nframes || !self.is_open() {
                    break;
                }
                self.inner.wait().await;
            },
        }

        written_frames
    }

    /// Reads `nframes` frames into `dst` (interleaved, `nframes *
    /// nchannels` elements). Blocks according to the configured
    /// [`UnderflowPolicy`] when the ring has insufficient data. Returns
    /// the number of frames actually read. Once the ring is closed, no
    /// further successful read is initiated — even if frames remain
    /// buffered — mirroring [`write`](Self::write)'s unconditional
    /// post-close short-circuit.
    pub async fn read(&self, dst: &mut [T], nframes: u64) -> Result<u64, RingError> {
        let need = nframes as usize * self.nchannels;
        if dst.len() < need {
            return Err(RingError::ArgumentError {
                expected: need,
                actual: dst.len(),
            });
        }
        if !self.is_open() {
            return Ok(0);
        }

        let (position, turn) = self.readers.enqueue();
        if position != 0 && turn.await.is_err() {
            return Ok(0);
        }
        if !self.is_open() {
            // close() already popped this waiter while draining the queue.
            return Ok(0);
        }

        let read = self.read_while_head(dst, nframes).await;
        debug_assert_partial_count_bounded!(read, nframes);

        self.inner.signal();
        self.readers.pop_head();
        Ok(read)
    }

    /// Reads `nframes` frames, returning an owned per-channel matrix.
    pub async fn read_matrix(&self, nframes: u64) -> Result<Vec<Vec<T>>, RingError> {
        if !self.is_open() {
            return Err(RingError::Closed);
        }
        let mut flat = vec![T::default(); nframes as usize * self.nchannels];
        let read = self.read(&mut flat, nframes).await?;
        let mut matrix = vec![Vec::with_capacity(read as usize); self.nchannels];
        for frame in 0..read as usize {
            for (ch, row) in matrix.iter_mut().enumerate() {
                row.push(flat[frame * self.nchannels + ch]);
            }
        }
        Ok(matrix)
    }

    async fn read_while_head(&self, dst: &mut [T], nframes: u64) -> u64 {
        let mut read_frames = 0u64;

        match self.underflow {
            UnderflowPolicy::Truncate => {
                let remaining = (nframes - read_frames) as usize * self.nchannels;
                let read_elems = self.inner.read(&mut dst[..remaining]);
                read_frames = read_elems / self.nchannels as u64;
            }
            UnderflowPolicy::Pad => {
                let remaining = nframes as usize * self.nchannels;
                let read_elems = self.inner.read(&mut dst[..remaining]);
                read_frames = read_elems / self.nchannels as u64;
                for slot in &mut dst[(read_frames as usize * self.nchannels)..remaining] {
                    *slot = T::default();
                }
                read_frames = nframes;
            }
            UnderflowPolicy::Block => loop {
                if self.inner.readable() == 0 && !self.is_open() {
                    break;
                }
                let remaining = nframes - read_frames;
                if remaining == 0 {
                    break;
                }
                let start = read_frames as usize * self.nchannels;
                let end = (read_frames + remaining) as usize * self.nchannels;
                let read_elems = self.inner.read(&mut dst[start..end]);
                let this_round = read_elems / self.nchannels as u64;
                read_frames += this_round;
                if read_frames >= nframes {
                    break;
                }
                if !self.is_open() {
                    break;
                }
                self.inner.wait().await;
            },
        }

        read_frames
    }

    /// Marks the ring closed, wakes every queued reader and writer, and
    /// signals `data_notify` once so any in-progress head caller observes
    /// the closed state on its next check. Idempotent.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.inner.close();
        self.readers.drain_and_notify_all();
        self.writers.drain_and_notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips_flat() {
        let ring = BlockingRing::<i32>::new(2, 8);
        let written = ring.write(&[1, 2, 3, 4], 2).await.unwrap();
        assert_eq!(written, 2);

        let mut out = [0i32; 4];
        let read = ring.read(&mut out, 2).await.unwrap();
        assert_eq!(read, 2);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn write_matrix_and_read_matrix_round_trip() {
        let ring = BlockingRing::<i32>::new(2, 8);
        let ch0 = [1, 3, 5, 7, 9];
        let ch1 = [2, 4, 6, 8, 10];
        let written = ring.write_matrix(&[&ch0, &ch1]).await.unwrap();
        assert_eq!(written, 5);

        let matrix = ring.read_matrix(5).await.unwrap();
        assert_eq!(matrix, vec![vec![1, 3, 5, 7, 9], vec![2, 4, 6, 8, 10]]);
    }

    #[tokio::test]
    async fn wrong_channel_count_is_argument_error() {
        let ring = BlockingRing::<i32>::new(2, 8);
        let one = [1, 2, 3];
        let err = ring.write_matrix(&[&one]).await.unwrap_err();
        assert_eq!(
            err,
            RingError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[tokio::test]
    async fn close_cancels_pending_write() {
        let ring = BlockingRing::<i32>::new(2, 8);
        // Fill the ring (capacity is 8 frames).
        let data = vec![1i32; 16];
        ring.write(&data, 8).await.unwrap();

        ring.close();
        let more = vec![1i32; 2];
        let written = ring.write(&more, 1).await.unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn frame_bytes_is_nchannels_times_element_size() {
        let ring = BlockingRing::<i32>::new(2, 8);
        assert_eq!(ring.frame_bytes(), 2 * std::mem::size_of::<i32>());
    }

    #[tokio::test]
    async fn argument_error_precedes_any_side_effect() {
        let ring = BlockingRing::<i32>::new(2, 8);
        let short = [1i32];
        let err = ring.write(&short, 4).await.unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!(ring.readable_frames(), 0);
    }

    #[tokio::test]
    async fn overwrite_policy_with_room_writes_without_discarding() {
        // The normal, non-edge-case OVERWRITE write: plenty of free space,
        // so `writable() > needed_elems` and the shortfall computation
        // must not underflow.
        let config =
            BlockingRingConfig::new(2, 8, OverflowPolicy::Overwrite, UnderflowPolicy::Block);
        let ring = BlockingRing::<i32>::with_config(config);

        let data: Vec<i32> = (1..=4).collect(); // 2 frames into an 8-frame ring
        let written = ring.write(&data, 2).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(ring.readable_frames(), 2);

        let mut out = [0i32; 4];
        let read = ring.read(&mut out, 2).await.unwrap();
        assert_eq!(read, 2);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn overwrite_policy_discards_oldest_frames_to_make_room() {
        let config =
            BlockingRingConfig::new(2, 4, OverflowPolicy::Overwrite, UnderflowPolicy::Block);
        let ring = BlockingRing::<i32>::with_config(config);

        let first: Vec<i32> = (1..=6).collect(); // 3 frames, fills most of a 4-frame ring
        ring.write(&first, 3).await.unwrap();

        let second: Vec<i32> = (100..106).collect(); // 3 more frames; only 1 fits
        let written = ring.write(&second, 3).await.unwrap();
        assert_eq!(written, 3, "OVERWRITE always reports the full request written");
        assert_eq!(ring.readable_frames(), 4);

        let mut out = [0i32; 8];
        let read = ring.read(&mut out, 4).await.unwrap();
        assert_eq!(read, 4);
        // Oldest frame of `first` (the 4th-from-tail slot) was evicted;
        // the ring now holds the last frame of `first` plus all of `second`.
        assert_eq!(&out[..8], &[5, 6, 100, 101, 102, 103, 104, 105]);
    }

    #[tokio::test]
    async fn overwrite_policy_at_or_above_capacity_keeps_only_the_trailing_frames() {
        let config =
            BlockingRingConfig::new(2, 4, OverflowPolicy::Overwrite, UnderflowPolicy::Block);
        let ring = BlockingRing::<i32>::with_config(config);

        // 6 frames into a 4-frame ring: only the trailing 4 frames survive.
        let data: Vec<i32> = (0..12).collect();
        let written = ring.write(&data, 6).await.unwrap();
        assert_eq!(written, 6);
        assert_eq!(ring.readable_frames(), 4);

        let mut out = [0i32; 8];
        let read = ring.read(&mut out, 4).await.unwrap();
        assert_eq!(read, 4);
        assert_eq!(&out[..8], &[4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[tokio::test]
    async fn truncate_policy_overflow_writes_only_what_fits_without_blocking() {
        let config =
            BlockingRingConfig::new(2, 4, OverflowPolicy::Truncate, UnderflowPolicy::Block);
        let ring = BlockingRing::<i32>::with_config(config);

        let data: Vec<i32> = (0..12).collect(); // 6 frames requested, only 4 fit
        let written = ring.write(&data, 6).await.unwrap();
        assert_eq!(written, 4);
        assert_eq!(ring.writable_frames(), 0);
    }

    #[tokio::test]
    async fn truncate_policy_underflow_reads_only_whats_available_without_blocking() {
        let config =
            BlockingRingConfig::new(2, 8, OverflowPolicy::Block, UnderflowPolicy::Truncate);
        let ring = BlockingRing::<i32>::with_config(config);

        ring.write(&[1, 2], 1).await.unwrap(); // 1 frame buffered

        let mut out = [0i32; 8];
        let read = ring.read(&mut out, 4).await.unwrap();
        assert_eq!(read, 1);
        assert_eq!(&out[..2], &[1, 2]);
    }

    #[tokio::test]
    async fn pad_policy_zero_fills_the_unread_tail() {
        let config = BlockingRingConfig::new(2, 8, OverflowPolicy::Block, UnderflowPolicy::Pad);
        let ring = BlockingRing::<i32>::with_config(config);

        ring.write(&[1, 2], 1).await.unwrap(); // 1 frame buffered, 3 requested

        let mut out = [7i32; 8];
        let read = ring.read(&mut out, 4).await.unwrap();
        assert_eq!(read, 4, "PAD always reports the requested frame count");
        assert_eq!(out, [1, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn read_returns_zero_after_close_even_with_buffered_frames() {
        let ring = BlockingRing::<i32>::new(2, 8);
        ring.write(&[1, 2, 3, 4], 2).await.unwrap();

        ring.close();

        let mut out = [0i32; 4];
        let read = ring.read(&mut out, 2).await.unwrap();
        assert_eq!(read, 0);
    }
}
