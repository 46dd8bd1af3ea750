//! Process-wide control state shared by the dispatch loop and built-in handlers.
//!
//! Writers are crate-internal: the dispatch loop stamps the last command time
//! and the control handlers move the automation level. Everyone else reads.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use crate::constants::system::{MAX_AUTOMATION_LEVEL, MIN_AUTOMATION_LEVEL};

#[derive(Debug)]
pub struct ControlState {
    automation_level: AtomicU8,
    last_command_at: RwLock<Option<DateTime<Utc>>>,
    started_at: DateTime<Utc>,
    started_instant: Instant,
}

/// Point-in-time copy of the control state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    pub automation_level: u8,
    pub last_command_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
}

impl ControlState {
    pub fn new(initial_automation_level: u8) -> Self {
        Self {
            automation_level: AtomicU8::new(clamp_level(i64::from(initial_automation_level))),
            last_command_at: RwLock::new(None),
            started_at: Utc::now(),
            started_instant: Instant::now(),
        }
    }

    pub fn automation_level(&self) -> u8 {
        self.automation_level.load(Ordering::Acquire)
    }

    pub fn last_command_at(&self) -> Option<DateTime<Utc>> {
        *self.last_command_at.read()
    }

    pub fn uptime(&self) -> Duration {
        self.started_instant.elapsed()
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            automation_level: self.automation_level(),
            last_command_at: self.last_command_at(),
            started_at: self.started_at,
            uptime_seconds: self.uptime().as_secs(),
        }
    }

    /// Set the automation level, clamped into `[0, 100]`. Returns the stored value.
    pub(crate) fn set_automation_level(&self, level: i64) -> u8 {
        let level = clamp_level(level);
        self.automation_level.store(level, Ordering::Release);
        level
    }

    pub(crate) fn record_command_processed(&self, at: DateTime<Utc>) {
        *self.last_command_at.write() = Some(at);
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(MAX_AUTOMATION_LEVEL)
    }
}

fn clamp_level(level: i64) -> u8 {
    // Lossless after clamping to the u8 sub-range
    level.clamp(i64::from(MIN_AUTOMATION_LEVEL), i64::from(MAX_AUTOMATION_LEVEL)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_level_is_clamped() {
        let state = ControlState::default();
        assert_eq!(state.automation_level(), 100);
        assert_eq!(state.set_automation_level(150), 100);
        assert_eq!(state.set_automation_level(-20), 0);
        assert_eq!(state.set_automation_level(42), 42);
        assert_eq!(state.automation_level(), 42);
    }

    #[test]
    fn test_last_command_timestamp() {
        let state = ControlState::new(0);
        assert!(state.last_command_at().is_none());

        let now = Utc::now();
        state.record_command_processed(now);
        assert_eq!(state.snapshot().last_command_at, Some(now));
        assert_eq!(state.snapshot().automation_level, 0);
    }
}
