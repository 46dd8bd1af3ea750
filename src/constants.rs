//! # System Constants
//!
//! Core constants that define the operational boundaries of the dispatch engine.

/// Built-in command names understood by the default handler set
pub mod commands {
    pub const SYSTEM_STATUS: &str = "SYSTEM_STATUS";
    pub const AUTOMATION_CONTROL: &str = "AUTOMATION_CONTROL";
    pub const EMERGENCY_STOP: &str = "EMERGENCY_STOP";
}

/// Actions accepted by the `AUTOMATION_CONTROL` command
pub mod automation_actions {
    pub const SET_LEVEL: &str = "SET_LEVEL";
    pub const PAUSE: &str = "PAUSE";
    pub const RESUME: &str = "RESUME";
}

/// System-wide defaults
pub mod system {
    /// Default dispatch cadence (one tick per second)
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

    /// Default number of terminal commands retained in the execution history
    pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

    /// Lower bound of the automation level percentage
    pub const MIN_AUTOMATION_LEVEL: u8 = 0;

    /// Upper bound of the automation level percentage
    pub const MAX_AUTOMATION_LEVEL: u8 = 100;

    /// Default config file consulted by `ConfigManager::load`
    pub const DEFAULT_CONFIG_PATH: &str = "config/dispatch.toml";

    /// Prefix for environment variable overrides
    pub const ENV_PREFIX: &str = "DISPATCH";
}
