//! Command Handlers Module
//!
//! Built-in handlers wired into every `CommandRegistry::with_builtin_handlers`.
//! Each is independent and idempotent.

pub mod automation_control_handler;
pub mod emergency_stop_handler;
pub mod system_status_handler;

use std::sync::Arc;

use crate::execution::command::CommandName;
use crate::execution::command_router::CommandRegistry;

// Re-export handlers for convenience
pub use automation_control_handler::AutomationControlHandler;
pub use emergency_stop_handler::EmergencyStopHandler;
pub use system_status_handler::SystemStatusHandler;

/// Register the default handler set
pub fn register_builtin_handlers(registry: &mut CommandRegistry) {
    registry.register(CommandName::SystemStatus, Arc::new(SystemStatusHandler::new()));
    registry.register(
        CommandName::AutomationControl,
        Arc::new(AutomationControlHandler::new()),
    );
    registry.register(CommandName::EmergencyStop, Arc::new(EmergencyStopHandler::new()));
}
