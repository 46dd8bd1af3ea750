//! # Dispatch Configuration System
//!
//! Layered configuration for the dispatch engine: serde defaults, then an
//! optional TOML file, then `DISPATCH_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dispatch_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let tick = manager.config().tick_interval();
//! let capacity = manager.config().history_capacity;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::system;
use crate::error::{DispatchError, Result};

pub use loader::ConfigManager;

/// Root configuration for a `CommandDispatcher`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Interval between dispatch loop ticks
    pub tick_interval_ms: u64,

    /// Maximum number of terminal commands kept in the execution history
    pub history_capacity: usize,

    /// Upper bound on a single handler invocation. `None` lets a handler run
    /// indefinitely, which stalls the loop until it settles.
    pub handler_timeout_ms: Option<u64>,

    /// Automation level the control state starts at
    pub initial_automation_level: u8,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: system::DEFAULT_TICK_INTERVAL_MS,
            history_capacity: system::DEFAULT_HISTORY_CAPACITY,
            handler_timeout_ms: None,
            initial_automation_level: system::MAX_AUTOMATION_LEVEL,
        }
    }
}

impl DispatchConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    /// Builder-style override of the tick interval
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Builder-style override of the history capacity
    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }

    /// Builder-style override of the handler timeout
    pub fn with_handler_timeout_ms(mut self, handler_timeout_ms: u64) -> Self {
        self.handler_timeout_ms = Some(handler_timeout_ms);
        self
    }

    /// Reject values the dispatch loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(DispatchError::Configuration(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(DispatchError::Configuration(
                "history_capacity must be greater than zero".to_string(),
            ));
        }
        if self.handler_timeout_ms == Some(0) {
            return Err(DispatchError::Configuration(
                "handler_timeout_ms cannot be zero".to_string(),
            ));
        }
        if self.initial_automation_level > system::MAX_AUTOMATION_LEVEL {
            return Err(DispatchError::Configuration(format!(
                "initial_automation_level must be within 0..={}, got {}",
                system::MAX_AUTOMATION_LEVEL,
                self.initial_automation_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_behavior() {
        let config = DispatchConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.history_capacity, 100);
        assert!(config.handler_timeout().is_none());
        assert_eq!(config.initial_automation_level, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_unusable_values() {
        assert!(DispatchConfig::default()
            .with_tick_interval_ms(0)
            .validate()
            .is_err());
        assert!(DispatchConfig::default()
            .with_history_capacity(0)
            .validate()
            .is_err());
        assert!(DispatchConfig::default()
            .with_handler_timeout_ms(0)
            .validate()
            .is_err());

        let config = DispatchConfig {
            initial_automation_level: 101,
            ..DispatchConfig::default()
        };
        match config.validate() {
            Err(DispatchError::Configuration(msg)) => {
                assert!(msg.contains("initial_automation_level"))
            }
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"history_capacity": 5}"#).unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.tick_interval_ms, 1000);
    }
}
