//! Debug assertion macros for ring buffer invariants.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`), so there is
//! zero overhead in release builds.

/// Assert that the element count in flight never exceeds capacity.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

/// Assert that the read cursor never advances past the write cursor.
macro_rules! debug_assert_read_not_past_write {
    ($new_read:expr, $written:expr) => {
        debug_assert!(
            $new_read <= $written,
            "advancing read cursor {} beyond write cursor {}",
            $new_read,
            $written
        )
    };
}

/// Assert that a counter only increases between two observations.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Assert we have not wrapped the u64 counter space (cannot happen in
/// practice; this catches a corrupted counter, not the normal modular
/// wrap of the masked buffer position).
macro_rules! debug_assert_no_wrap {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new > $old || $old.wrapping_sub($new) > (1u64 << 32),
            "potential wrap detected: {} went from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_no_wrap;
pub(crate) use debug_assert_read_not_past_write;
