//! Command Record
//!
//! A `Command` is created only through `CommandDispatcher::submit`. Its
//! lifecycle fields are written by the dispatch loop and never exposed through
//! public setters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::constants::commands;

/// Opaque parameter map handed verbatim to the handler
pub type CommandParameters = serde_json::Map<String, serde_json::Value>;

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One unit of schedulable work
///
/// Equality is by `id`.
///
/// # Examples
///
/// ```rust
/// use dispatch_core::execution::command::*;
///
/// let request = CommandRequest::new(CommandType::System, CommandName::SystemStatus)
///     .with_priority(CommandPriority::High);
///
/// assert_eq!(request.priority, Some(CommandPriority::High));
/// ```
///
/// Commands are only created by submission. They serialize for observers but
/// cannot be rebuilt from JSON:
///
/// ```rust,compile_fail
/// use dispatch_core::execution::command::Command;
///
/// let _: Command = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Unique identifier generated at submission
    pub(crate) id: String,

    /// Informational category, does not affect scheduling
    #[serde(rename = "type")]
    pub(crate) command_type: CommandType,

    /// Key used to resolve a handler
    pub(crate) name: CommandName,

    pub(crate) parameters: CommandParameters,

    pub(crate) priority: CommandPriority,

    pub(crate) submitted_at: DateTime<Utc>,

    /// Monotonic submission counter; orders commands submitted within the same instant
    #[serde(skip)]
    pub(crate) sequence: u64,

    pub(crate) state: CommandState,

    pub(crate) result: Option<CommandOutcome>,

    pub(crate) execution_duration_ms: Option<u64>,
}

impl Command {
    /// Build a new pending command from a caller request
    pub(crate) fn from_request(request: CommandRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            command_type: request.command_type,
            name: request.name,
            parameters: request.parameters,
            priority: request.priority.unwrap_or_default(),
            submitted_at: Utc::now(),
            sequence: SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            state: CommandState::Pending,
            result: None,
            execution_duration_ms: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn name(&self) -> &CommandName {
        &self.name
    }

    pub fn parameters(&self) -> &CommandParameters {
        &self.parameters
    }

    pub fn priority(&self) -> CommandPriority {
        self.priority
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn result(&self) -> Option<&CommandOutcome> {
        self.result.as_ref()
    }

    pub fn execution_duration_ms(&self) -> Option<u64> {
        self.execution_duration_ms
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// `Pending -> Executing`
    pub(crate) fn mark_executing(&mut self) {
        debug_assert_eq!(self.state, CommandState::Pending);
        self.state = CommandState::Executing;
    }

    /// Move into a terminal state, recording outcome and duration.
    ///
    /// Terminal commands are never mutated again.
    pub(crate) fn finish(&mut self, outcome: CommandOutcome, duration_ms: u64) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if outcome.is_success() {
            CommandState::Completed
        } else {
            CommandState::Failed
        };
        self.result = Some(outcome);
        self.execution_duration_ms = Some(duration_ms);
    }

    /// `Pending -> Failed` for work discarded before it ever ran
    pub(crate) fn cancel(&mut self, reason: impl Into<String>) {
        debug_assert_eq!(self.state, CommandState::Pending);
        self.finish(CommandOutcome::error(FailureKind::Cancelled, reason), 0);
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Command {}

/// Caller-supplied description of a command to submit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(rename = "type")]
    pub command_type: CommandType,
    pub name: CommandName,
    #[serde(default)]
    pub parameters: CommandParameters,
    /// Defaults to `Medium` when omitted
    #[serde(default)]
    pub priority: Option<CommandPriority>,
}

impl CommandRequest {
    pub fn new(command_type: CommandType, name: impl Into<CommandName>) -> Self {
        Self {
            command_type,
            name: name.into(),
            parameters: CommandParameters::new(),
            priority: None,
        }
    }

    /// Set command priority
    pub fn with_priority(mut self, priority: CommandPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Add a single parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Replace the whole parameter map
    pub fn with_parameters(mut self, parameters: CommandParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Informational command category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    System,
    Automation,
    Business,
    Data,
    Control,
}

/// Command priority levels; `Critical` is highest
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CommandPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Command lifecycle: `Pending -> Executing -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandState {
    Pending,
    Executing,
    Completed,
    Failed,
}

impl CommandState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Executing => write!(f, "executing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Handler lookup key
///
/// Built-in commands are typed variants; anything else is carried as
/// `Custom` and resolves only if a handler was registered under that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandName {
    SystemStatus,
    AutomationControl,
    EmergencyStop,
    Custom(String),
}

impl CommandName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SystemStatus => commands::SYSTEM_STATUS,
            Self::AutomationControl => commands::AUTOMATION_CONTROL,
            Self::EmergencyStop => commands::EMERGENCY_STOP,
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for CommandName {
    fn from(name: &str) -> Self {
        match name {
            commands::SYSTEM_STATUS => Self::SystemStatus,
            commands::AUTOMATION_CONTROL => Self::AutomationControl,
            commands::EMERGENCY_STOP => Self::EmergencyStop,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for CommandName {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<CommandName> for String {
    fn from(name: CommandName) -> Self {
        match name {
            CommandName::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result stored on a terminal command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Handler returned normally
    Success { value: serde_json::Value },

    /// Command failed; `kind` classifies why
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl CommandOutcome {
    pub fn success(value: serde_json::Value) -> Self {
        Self::Success { value }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }
}

/// Why a command ended up `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownCommand,
    InvalidParameters,
    ExecutionFailed,
    TimedOut,
    Panicked,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_creation_defaults() {
        let command = Command::from_request(CommandRequest::new(
            CommandType::System,
            CommandName::SystemStatus,
        ));

        assert!(!command.id().is_empty());
        assert_eq!(command.priority(), CommandPriority::Medium);
        assert_eq!(command.state(), CommandState::Pending);
        assert!(command.result().is_none());
        assert!(command.execution_duration_ms().is_none());
    }

    #[test]
    fn test_ids_and_sequences_are_unique() {
        let a = Command::from_request(CommandRequest::new(CommandType::Data, "A"));
        let b = Command::from_request(CommandRequest::new(CommandType::Data, "A"));
        assert_ne!(a.id(), b.id());
        assert!(b.sequence > a.sequence);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_priority_total_order() {
        assert!(CommandPriority::Critical > CommandPriority::High);
        assert!(CommandPriority::High > CommandPriority::Medium);
        assert!(CommandPriority::Medium > CommandPriority::Low);
    }

    #[test]
    fn test_lifecycle_is_forward_only() {
        let mut command =
            Command::from_request(CommandRequest::new(CommandType::Control, "NOOP"));
        command.mark_executing();
        assert_eq!(command.state(), CommandState::Executing);
        assert!(command.result().is_none());

        command.finish(CommandOutcome::success(json!({"ok": true})), 4);
        assert_eq!(command.state(), CommandState::Completed);
        assert_eq!(command.execution_duration_ms(), Some(4));

        // Terminal commands ignore further writes
        command.finish(CommandOutcome::error(FailureKind::ExecutionFailed, "late"), 9);
        assert_eq!(command.state(), CommandState::Completed);
        assert_eq!(command.execution_duration_ms(), Some(4));
    }

    #[test]
    fn test_command_name_parsing() {
        assert_eq!(CommandName::from("SYSTEM_STATUS"), CommandName::SystemStatus);
        assert_eq!(
            CommandName::from("EMERGENCY_STOP"),
            CommandName::EmergencyStop
        );
        assert_eq!(
            CommandName::from("DOES_NOT_EXIST"),
            CommandName::Custom("DOES_NOT_EXIST".to_string())
        );
        assert_eq!(CommandName::AutomationControl.to_string(), "AUTOMATION_CONTROL");
    }

    #[test]
    fn test_command_serialization_uses_camel_case() {
        let mut command = Command::from_request(
            CommandRequest::new(CommandType::Automation, CommandName::AutomationControl)
                .with_parameter("action", json!("PAUSE"))
                .with_priority(CommandPriority::High),
        );
        command.mark_executing();
        command.finish(CommandOutcome::success(json!({"level": 0})), 2);

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["type"], "Automation");
        assert_eq!(value["name"], "AUTOMATION_CONTROL");
        assert_eq!(value["priority"], "High");
        assert_eq!(value["state"], "Completed");
        assert_eq!(value["executionDurationMs"], 2);
        assert_eq!(value["result"]["status"], "success");
        assert!(value.get("submittedAt").is_some());
        assert!(value.get("sequence").is_none());
    }

    #[test]
    fn test_request_deserialization_defaults_priority() {
        let request: CommandRequest =
            serde_json::from_value(json!({"type": "Business", "name": "INVOICE_SYNC"}))
                .unwrap();
        assert_eq!(request.name, CommandName::Custom("INVOICE_SYNC".to_string()));
        assert!(request.priority.is_none());
        assert!(request.parameters.is_empty());
    }
}
