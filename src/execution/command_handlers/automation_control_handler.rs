//! Automation Control Handler
//!
//! Moves the shared automation level. Accepted parameters:
//!
//! - `{"action": "SET_LEVEL", "level": <number>}` clamps `level` into `[0, 100]`
//! - `{"action": "PAUSE"}` forces the level to 0
//! - `{"action": "RESUME"}` forces the level to 100

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::constants::automation_actions;
use crate::constants::system::{MAX_AUTOMATION_LEVEL, MIN_AUTOMATION_LEVEL};
use crate::execution::command::CommandParameters;
use crate::execution::command_router::{CommandHandler, CommandHandlerError, HandlerContext};

#[derive(Debug, Default)]
pub struct AutomationControlHandler;

impl AutomationControlHandler {
    pub fn new() -> Self {
        Self
    }

    fn requested_level(parameters: &CommandParameters) -> Result<i64, CommandHandlerError> {
        match parameters.get("level") {
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|level| level.round() as i64))
                .ok_or_else(|| {
                    CommandHandlerError::invalid_parameters(format!(
                        "level is not representable: {number}"
                    ))
                }),
            Some(other) => Err(CommandHandlerError::invalid_parameters(format!(
                "level must be a number, got {other}"
            ))),
            None => Err(CommandHandlerError::invalid_parameters(
                "SET_LEVEL requires a level parameter",
            )),
        }
    }
}

#[async_trait]
impl CommandHandler for AutomationControlHandler {
    async fn handle(
        &self,
        parameters: &CommandParameters,
        context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        let action = parameters
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| CommandHandlerError::invalid_parameters("missing action parameter"))?;

        let control = context.control();
        let previous = control.automation_level();

        let level = match action {
            automation_actions::SET_LEVEL => {
                control.set_automation_level(Self::requested_level(parameters)?)
            }
            automation_actions::PAUSE => {
                control.set_automation_level(i64::from(MIN_AUTOMATION_LEVEL))
            }
            automation_actions::RESUME => {
                control.set_automation_level(i64::from(MAX_AUTOMATION_LEVEL))
            }
            unknown => {
                return Err(CommandHandlerError::invalid_parameters(format!(
                    "unknown automation action: {unknown}"
                )))
            }
        };

        info!(action, previous, level, "Automation level updated");

        Ok(json!({
            "action": action,
            "previousLevel": previous,
            "automationLevel": level,
        }))
    }

    fn handler_name(&self) -> &str {
        "automation_control_handler"
    }
}
