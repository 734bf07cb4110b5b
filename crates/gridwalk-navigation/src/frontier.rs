//! Min-priority queue of not-yet-settled coordinates for a single search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::map::GridCoordinate;

/// An immutable frontier entry.
///
/// `cost` is the cumulative cost the coordinate had when it was pushed. The
/// search compares it against its best-cost map on pop to recognise entries
/// that a later improvement has made stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Coordinate this entry refers to.
    pub coord: GridCoordinate,
    /// Cumulative cost at push time.
    pub cost: u32,
    /// `cost + heuristic` at push time.
    pub priority: u32,
    seq: u64,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flip both keys so BinaryHeap pops the lowest priority, and among
        // equal priorities the earliest insertion.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.coord.cmp(&self.coord))
            .then_with(|| other.cost.cmp(&self.cost))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue keyed by an explicit priority with insertion-order tie-breaking.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl Frontier {
    /// Creates an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a coordinate by value. Duplicates of the same coordinate are allowed.
    pub fn push(&mut self, coord: GridCoordinate, cost: u32, priority: u32) {
        self.heap.push(FrontierEntry {
            coord,
            cost,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Removes and returns the entry with the lowest priority.
    pub fn pop_min(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }

    /// Returns true if no entries remain.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
