//! System Status Handler

use async_trait::async_trait;
use serde_json::json;

use crate::execution::command::CommandParameters;
use crate::execution::command_router::{CommandHandler, CommandHandlerError, HandlerContext};

/// Reports queue and history sizes, uptime and control state. Always succeeds.
#[derive(Debug, Default)]
pub struct SystemStatusHandler;

impl SystemStatusHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for SystemStatusHandler {
    async fn handle(
        &self,
        _parameters: &CommandParameters,
        context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        let control = context.control().snapshot();

        Ok(json!({
            "status": "healthy",
            "queueDepth": context.queue_depth(),
            "historySize": context.history_size(),
            "historyCapacity": context.history_capacity(),
            "uptimeSeconds": control.uptime_seconds,
            "startedAt": control.started_at.to_rfc3339(),
            "automationLevel": control.automation_level,
            "lastCommandAt": control.last_command_at.map(|at| at.to_rfc3339()),
        }))
    }

    fn handler_name(&self) -> &str {
        "system_status_handler"
    }
}
