//! Debug assertion macros for `BlockingRing`/`WaiterQueue` invariants.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`), so there is
//! zero overhead in release builds.

/// Assert that the head waiter was notified after being popped, whenever
/// the queue had a new head left behind.
macro_rules! debug_assert_head_notified_on_pop {
    ($had_new_head:expr, $notified:expr) => {
        debug_assert!(
            !$had_new_head || $notified,
            "popped a waiter queue head but did not notify the new head"
        )
    };
}

/// Assert that every waiter in a queue was notified by `drain_and_notify_all`.
macro_rules! debug_assert_waiters_drained_on_close {
    ($queue_len_before:expr, $notified_count:expr) => {
        debug_assert!(
            $queue_len_before == $notified_count,
            "drained {} waiters but only notified {}",
            $queue_len_before,
            $notified_count
        )
    };
}

/// Assert that a closed ring never reports a partial count larger than
/// what was requested.
macro_rules! debug_assert_partial_count_bounded {
    ($count:expr, $requested:expr) => {
        debug_assert!(
            $count <= $requested,
            "returned {} frames but only {} were requested",
            $count,
            $requested
        )
    };
}

pub(crate) use debug_assert_head_notified_on_pop;
pub(crate) use debug_assert_partial_count_bounded;
pub(crate) use debug_assert_waiters_drained_on_close;
