//! # Command Execution
//!
//! Priority-ordered command queue, handler registry, dispatch loop and
//! execution history.

pub mod command;
pub mod command_handlers;
pub mod command_queue;
pub mod command_router;
pub mod control_state;
pub mod dispatcher;
pub mod history;

pub use command::{
    Command, CommandName, CommandOutcome, CommandParameters, CommandPriority, CommandRequest,
    CommandState, CommandType, FailureKind,
};
pub use command_queue::CommandQueue;
pub use command_router::{CommandHandler, CommandHandlerError, CommandRegistry, HandlerContext};
pub use control_state::{ControlSnapshot, ControlState};
pub use dispatcher::CommandDispatcher;
pub use history::{DispatchMetrics, ExecutionHistory, HistorySummary};
