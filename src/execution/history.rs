//! Execution History and Metrics
//!
//! Bounded, insertion-ordered log of terminal commands. Oldest entries are
//! evicted first. Metrics are recomputed from the log on every request so the
//! two views cannot drift apart.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

use crate::execution::command::{Command, CommandState};

#[derive(Debug)]
pub struct ExecutionHistory {
    entries: RwLock<VecDeque<Command>>,
    capacity: usize,
}

/// Aggregate metrics for the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMetrics {
    /// Percentage of history entries that completed successfully
    pub success_rate: f64,
    /// Mean execution duration over every history entry
    pub average_execution_duration_ms: f64,
    pub queue_depth: usize,
    /// Number of commands currently executing (0 or 1)
    pub active_count: usize,
    pub history_size: usize,
    pub completed_count: usize,
    pub failed_count: usize,
}

/// History-derived portion of `DispatchMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub success_rate: f64,
    pub average_execution_duration_ms: f64,
    pub completed_count: usize,
    pub failed_count: usize,
}

impl HistorySummary {
    /// Summarize a set of terminal commands
    pub fn from_commands<'a>(commands: impl IntoIterator<Item = &'a Command>) -> Self {
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut total_duration_ms = 0u128;
        let mut timed = 0usize;

        for command in commands {
            match command.state() {
                CommandState::Completed => completed += 1,
                CommandState::Failed => failed += 1,
                _ => continue,
            }
            if let Some(duration) = command.execution_duration_ms() {
                total_duration_ms += u128::from(duration);
                timed += 1;
            }
        }

        let terminal = completed + failed;
        let success_rate = if terminal == 0 {
            0.0
        } else {
            completed as f64 / terminal as f64 * 100.0
        };
        let average_execution_duration_ms = if timed == 0 {
            0.0
        } else {
            total_duration_ms as f64 / timed as f64
        };

        Self {
            success_rate,
            average_execution_duration_ms,
            completed_count: completed,
            failed_count: failed,
        }
    }
}

impl ExecutionHistory {
    /// `capacity` must be non-zero; `DispatchConfig::validate` guarantees it.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a terminal command, evicting the oldest entries beyond capacity.
    ///
    /// Returns the number of evicted entries.
    pub fn record(&self, command: Command) -> usize {
        debug_assert!(command.is_terminal());
        let mut entries = self.entries.write();
        entries.push_back(command);

        let mut evicted = 0;
        while entries.len() > self.capacity {
            entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, capacity = self.capacity, "Execution history evicted oldest entries");
        }
        evicted
    }

    /// Most-recent-first view bounded by `limit`
    pub fn recent(&self, limit: usize) -> Vec<Command> {
        self.entries
            .read()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<Command> {
        self.entries
            .read()
            .iter()
            .rev()
            .find(|command| command.id() == id)
            .cloned()
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_commands(self.entries.read().iter())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
