use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tokio::time::Instant;

/// A deferred lifecycle transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Start a new spawn attempt.
    Spawn,
    /// Display time is over; begin fading the record out.
    BeginFade { id: String, serial: u64 },
    /// Fade finished; release the node and free the slot.
    Remove { id: String, serial: u64 },
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    seq: u64,
    timer: Timer,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap yields the earliest deadline first, ties in
    // insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending timers ordered by deadline. Nothing is ever cancelled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, timer: Timer) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { due, seq, timer });
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|scheduled| scheduled.due)
    }

    /// Remove and return every timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Timer> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|scheduled| scheduled.due <= now) {
            if let Some(scheduled) = self.heap.pop() {
                due.push(scheduled.timer);
            }
        }
        due
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Instant, &Timer)> {
        self.heap.iter().map(|scheduled| (scheduled.due, &scheduled.timer))
    }
}
