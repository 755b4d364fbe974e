//! A FIFO queue of one-shot wake handles enforcing head-of-queue progress.

use crate::invariants::{debug_assert_head_notified_on_pop, debug_assert_waiters_drained_on_close};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// FIFO queue of single-shot condition handles.
///
/// Only the caller at the head of the queue is permitted to attempt
/// progress on the shared resource the queue is guarding; everyone else
/// must await the receiver half returned by [`enqueue`](Self::enqueue).
pub struct WaiterQueue {
    // `None` marks a slot whose waiter has already been woken (either
    // because it became head immediately, or because the previous head
    // notified it on pop) but has not yet popped itself.
    slots: Mutex<VecDeque<Option<oneshot::Sender<()>>>>,
}

impl WaiterQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends a new waiter. Returns its position at the time of
    /// enqueueing (0 means it became head immediately — the queue was
    /// empty — and the caller should proceed without awaiting the
    /// receiver) and a receiver that resolves once this waiter reaches
    /// the head.
    pub fn enqueue(&self) -> (usize, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let mut slots = self.slots.lock().expect("waiter queue poisoned");
        let position = slots.len();
        if position == 0 {
            // Nobody ahead of us: wake immediately, keep a placeholder
            // slot so later enqueuers still see us occupying position 0.
            let _ = tx.send(());
            slots.push_back(None);
        } else {
            slots.push_back(Some(tx));
        }
        (position, rx)
    }

    /// Number of waiters currently queued (including the head).
    pub fn len(&self) -> usize {
        self.slots.lock().expect("waiter queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the current head (the caller finishing its turn) and, if
    /// another waiter is now head, wakes it.
    pub fn pop_head(&self) {
        let mut slots = self.slots.lock().expect("waiter queue poisoned");
        slots.pop_front();
        let had_new_head = !slots.is_empty();
        let mut notified = false;
        if let Some(slot) = slots.front_mut() {
            if let Some(tx) = slot.take() {
                notified = tx.send(()).is_ok();
            } else {
                // Already woken by a racing drain; nothing to do.
                notified = true;
            }
        }
        debug_assert_head_notified_on_pop!(had_new_head, notified);
    }

    /// Wakes every queued waiter, head first, and empties the queue. Used
    /// when the guarded resource closes so nobody blocks forever.
    pub fn drain_and_notify_all(&self) {
        let mut slots = self.slots.lock().expect("waiter queue poisoned");
        let before = slots.len();
        let mut notified = 0usize;
        while let Some(slot) = slots.pop_front() {
            if let Some(tx) = slot {
                let _ = tx.send(());
            }
            notified += 1;
        }
        debug_assert_waiters_drained_on_close!(before, notified);
    }
}

impl Default for WaiterQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_enqueue_is_head_and_pre_notified() {
        let q = WaiterQueue::new();
        let (pos, rx) = q.enqueue();
        assert_eq!(pos, 0);
        rx.await.unwrap();
    }

    #[tokio::test]
    async fn second_enqueue_waits_for_first_to_pop() {
        let q = WaiterQueue::new();
        let (pos0, rx0) = q.enqueue();
        let (pos1, rx1) = q.enqueue();
        assert_eq!(pos0, 0);
        assert_eq!(pos1, 1);

        rx0.await.unwrap();
        q.pop_head();
        rx1.await.unwrap();
    }

    #[tokio::test]
    async fn drain_wakes_every_queued_waiter() {
        let q = WaiterQueue::new();
        let (_, rx0) = q.enqueue();
        let (_, rx1) = q.enqueue();
        let (_, rx2) = q.enqueue();

        q.drain_and_notify_all();

        rx0.await.unwrap();
        rx1.await.unwrap();
        rx2.await.unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn fifo_positions_increase_in_enqueue_order() {
        let q = WaiterQueue::new();
        let (p0, _r0) = q.enqueue();
        let (p1, _r1) = q.enqueue();
        let (p2, _r2) = q.enqueue();
        assert_eq!((p0, p1, p2), (0, 1, 2));
        assert_eq!(q.len(), 3);
    }
}
