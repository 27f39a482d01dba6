//! Max-priority queue over outstanding balance magnitudes
//!
//! Creditors and debtors each get one queue for the duration of a single
//! netting call. Both are max-queues: the debtor queue stores debt as a
//! positive magnitude so the largest debt comes out first.

use crate::money::Money;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Queue entry: a member (by input position) and its outstanding magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    /// Outstanding magnitude (always positive)
    pub magnitude: Money,

    /// Position of the member in the netting input
    pub index: usize,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger magnitude first, then earlier input position
        self.magnitude
            .cmp(&other.magnitude)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary-heap-backed max-priority queue keyed by magnitude
#[derive(Debug, Default)]
pub struct BalanceQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl BalanceQueue {
    /// Create empty queue with room for `capacity` members
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Insert a member with its outstanding magnitude
    pub fn push(&mut self, magnitude: Money, index: usize) {
        debug_assert!(magnitude.is_positive());
        self.heap.push(QueueEntry { magnitude, index });
    }

    /// Remove the entry with the largest magnitude
    pub fn pop_max(&mut self) -> Option<QueueEntry> {
        self.heap.pop()
    }

    /// Number of queued members
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consume the queue, yielding leftover entries largest first
    pub fn into_sorted_vec(self) -> Vec<QueueEntry> {
        let mut entries = self.heap.into_sorted_vec();
        entries.reverse();
        entries
    }
}
