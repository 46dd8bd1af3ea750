//! Emergency Stop Handler
//!
//! The only handler that touches the priority queue: every pending command is
//! discarded (recorded as `Failed` with kind `cancelled`) and the automation
//! level drops to 0. The command currently executing is the stop itself.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::constants::system::MIN_AUTOMATION_LEVEL;
use crate::execution::command::CommandParameters;
use crate::execution::command_router::{CommandHandler, CommandHandlerError, HandlerContext};

#[derive(Debug, Default)]
pub struct EmergencyStopHandler;

impl EmergencyStopHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for EmergencyStopHandler {
    async fn handle(
        &self,
        parameters: &CommandParameters,
        context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        let reason = parameters
            .get("reason")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unspecified");

        let drained = context.queue().drain();
        let level = context
            .control()
            .set_automation_level(i64::from(MIN_AUTOMATION_LEVEL));

        let cancelled_ids: Vec<String> = drained.iter().map(|c| c.id().to_string()).collect();
        for mut command in drained {
            command.cancel(format!("cancelled by EMERGENCY_STOP: {reason}"));
            context.history().record(command);
        }

        warn!(
            cancelled = cancelled_ids.len(),
            reason, "EMERGENCY STOP: pending commands cancelled, automation halted"
        );

        Ok(json!({
            "cancelledCount": cancelled_ids.len(),
            "cancelledIds": cancelled_ids,
            "automationLevel": level,
            "stoppedAt": Utc::now().to_rfc3339(),
        }))
    }

    fn handler_name(&self) -> &str {
        "emergency_stop_handler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::command::{
        Command, CommandRequest, CommandState, CommandType, FailureKind,
    };
    use crate::execution::command_queue::CommandQueue;
    use crate::execution::control_state::ControlState;
    use crate::execution::history::ExecutionHistory;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_clears_queue_and_halts_automation() {
        let queue = Arc::new(CommandQueue::new());
        let history = Arc::new(ExecutionHistory::new(10));
        let context = HandlerContext::new(
            Arc::new(ControlState::new(80)),
            Arc::clone(&queue),
            Arc::clone(&history),
        );

        for name in ["A", "B", "C"] {
            queue.push(Command::from_request(CommandRequest::new(
                CommandType::Business,
                name,
            )));
        }

        let result = EmergencyStopHandler::new()
            .handle(&CommandParameters::new(), &context)
            .await
            .unwrap();

        assert_eq!(result["cancelledCount"], 3);
        assert_eq!(result["automationLevel"], 0);
        assert!(queue.is_empty());
        assert_eq!(context.control().automation_level(), 0);

        let cancelled = history.recent(10);
        assert_eq!(cancelled.len(), 3);
        for command in cancelled {
            assert_eq!(command.state(), CommandState::Failed);
            assert_eq!(command.execution_duration_ms(), Some(0));
            assert_eq!(
                command.result().and_then(|r| r.failure_kind()),
                Some(FailureKind::Cancelled)
            );
        }
    }

    #[tokio::test]
    async fn test_empty_queue_still_succeeds() {
        let context = HandlerContext::new(
            Arc::new(ControlState::default()),
            Arc::new(CommandQueue::new()),
            Arc::new(ExecutionHistory::new(10)),
        );

        let result = EmergencyStopHandler::new()
            .handle(&CommandParameters::new(), &context)
            .await
            .unwrap();
        assert_eq!(result["cancelledCount"], 0);
        assert_eq!(context.history_size(), 0);
    }
}
