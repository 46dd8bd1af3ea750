//! Handler Registry
//!
//! Maps a `CommandName` to the handler that performs the command's work. The
//! registry is populated at startup and read-only once the dispatcher owns it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::execution::command::{CommandName, CommandParameters, FailureKind};
use crate::execution::command_handlers;
use crate::execution::command_queue::CommandQueue;
use crate::execution::control_state::ControlState;
use crate::execution::history::ExecutionHistory;

/// Trait for command handlers
///
/// A handler validates its own parameters and reports bad input as
/// `CommandHandlerError::InvalidParameters` rather than panicking.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Perform the command's work
    async fn handle(
        &self,
        parameters: &CommandParameters,
        context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError>;

    /// Get handler name for debugging
    fn handler_name(&self) -> &str;
}

/// Errors a handler may return
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandHandlerError {
    #[error("Invalid parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },
}

impl CommandHandlerError {
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::InvalidParameters { .. } => FailureKind::InvalidParameters,
            Self::ExecutionFailed { .. } => FailureKind::ExecutionFailed,
        }
    }
}

/// Engine state visible to a handler during one invocation
///
/// Every handler can read queue and history sizes and the control state.
/// Mutating accessors are crate-internal so only the built-in handlers use them.
#[derive(Clone)]
pub struct HandlerContext {
    control: Arc<ControlState>,
    queue: Arc<CommandQueue>,
    history: Arc<ExecutionHistory>,
}

impl HandlerContext {
    pub(crate) fn new(
        control: Arc<ControlState>,
        queue: Arc<CommandQueue>,
        history: Arc<ExecutionHistory>,
    ) -> Self {
        Self {
            control,
            queue,
            history,
        }
    }

    pub fn control(&self) -> &ControlState {
        &self.control
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub(crate) fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub(crate) fn history(&self) -> &ExecutionHistory {
        &self.history
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("queue_depth", &self.queue_depth())
            .field("history_size", &self.history_size())
            .finish_non_exhaustive()
    }
}

/// Registry of command handlers by command name
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<CommandName, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry wired with `SYSTEM_STATUS`, `AUTOMATION_CONTROL` and `EMERGENCY_STOP`
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        command_handlers::register_builtin_handlers(&mut registry);
        registry
    }

    /// Register a handler; the last registration for a name wins
    pub fn register(
        &mut self,
        name: impl Into<CommandName>,
        handler: Arc<dyn CommandHandler>,
    ) -> Option<Arc<dyn CommandHandler>> {
        let name = name.into();
        let handler_name = handler.handler_name().to_string();
        let previous = self.handlers.insert(name.clone(), handler);

        match &previous {
            Some(replaced) => warn!(
                command_name = %name,
                replaced = replaced.handler_name(),
                handler = %handler_name,
                "Replacing existing command handler"
            ),
            None => info!(command_name = %name, handler = %handler_name, "Registered command handler"),
        }

        previous
    }

    /// Resolve the handler for a command name
    pub fn resolve(&self, name: &CommandName) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Get registered command names, sorted for stable output
    pub fn registered_commands(&self) -> Vec<CommandName> {
        let mut names: Vec<CommandName> = self.handlers.keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.registered_commands())
            .finish()
    }
}
