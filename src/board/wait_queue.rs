//! Per-position FIFO queues of players waiting to take a contested card
//!
//! Each waiter is a one-shot signal. Waking a waiter only tells it that the
//! card it wanted was let go of; it must look at the board again before
//! acting, since the card may have been taken by someone else or removed.

use crate::core::Position;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tokio::sync::oneshot;

/// The receiving half handed to a suspended flip
pub type Waiter = oneshot::Receiver<()>;

#[derive(Debug, Default)]
pub struct WaitQueues {
    queues: FxHashMap<Position, VecDeque<oneshot::Sender<()>>>,
}

impl WaitQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the back of `pos`'s queue
    pub fn enqueue(&mut self, pos: Position) -> Waiter {
        let (tx, rx) = oneshot::channel();
        self.queues.entry(pos).or_default().push_back(tx);
        rx
    }

    /// Rejoin at the head of `pos`'s queue
    ///
    /// Used by a waiter that was woken but lost the card to a flip that never
    /// had to wait; it keeps its place ahead of everyone who queued later.
    pub fn enqueue_front(&mut self, pos: Position) -> Waiter {
        let (tx, rx) = oneshot::channel();
        self.queues.entry(pos).or_default().push_front(tx);
        rx
    }

    /// Wake the longest-waiting live waiter at `pos`
    ///
    /// Waiters whose flip was dropped while suspended are discarded on the way.
    /// A flip dropped after this call but before it runs hands the wake-up
    /// back by calling `signal_one` again. Returns whether anyone was woken.
    pub fn signal_one(&mut self, pos: Position) -> bool {
        let Some(queue) = self.queues.get_mut(&pos) else {
            return false;
        };

        let mut woke = false;
        while let Some(tx) = queue.pop_front() {
            if tx.send(()).is_ok() {
                woke = true;
                break;
            }
        }

        if queue.is_empty() {
            self.queues.remove(&pos);
        }
        woke
    }

    /// Wake every waiter at `pos` (the card there is gone for good)
    pub fn signal_all(&mut self, pos: Position) -> usize {
        self.queues
            .remove(&pos)
            .map(|queue| {
                queue
                    .into_iter()
                    .map(|tx| tx.send(()))
                    .filter(|sent| sent.is_ok())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of live waiters at `pos`
    pub fn len(&self, pos: Position) -> usize {
        self.queues
            .get(&pos)
            .map(|queue| queue.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Positions that currently have a queue
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.queues.keys()
    }
}
