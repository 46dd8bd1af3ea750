//! Stable Priority Queue
//!
//! Pending commands ordered by priority (highest first) and, within a priority
//! band, by submission time (earliest first). Ties on the timestamp fall back to
//! the submission sequence so ordering is total.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::execution::command::{Command, CommandState};

/// Heap entry wrapping a pending command
#[derive(Debug)]
struct QueuedCommand(Command);

impl QueuedCommand {
    fn rank(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: "greater" pops first
        self.0
            .priority
            .cmp(&other.0.priority)
            .then_with(|| other.0.submitted_at.cmp(&self.0.submitted_at))
            .then_with(|| other.0.sequence.cmp(&self.0.sequence))
    }
}

impl PartialEq for QueuedCommand {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for QueuedCommand {}

impl PartialOrd for QueuedCommand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedCommand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

/// Thread-safe priority queue of `Pending` commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    heap: Mutex<BinaryHeap<QueuedCommand>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending command according to the ordering rule
    pub fn push(&self, command: Command) {
        debug_assert_eq!(command.state, CommandState::Pending);
        self.heap.lock().push(QueuedCommand(command));
    }

    /// Remove and return the highest-ranked command
    pub fn pop(&self) -> Option<Command> {
        self.heap.lock().pop().map(|entry| entry.0)
    }

    /// Remove every pending command, returned in dispatch order
    pub fn drain(&self) -> Vec<Command> {
        let heap = std::mem::take(&mut *self.heap.lock());
        heap.into_sorted_vec()
            .into_iter()
            .rev()
            .map(|entry| entry.0)
            .collect()
    }

    /// Snapshot of a pending command by id
    pub fn find(&self, id: &str) -> Option<Command> {
        self.heap
            .lock()
            .iter()
            .find(|entry| entry.0.id == id)
            .map(|entry| entry.0.clone())
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}
