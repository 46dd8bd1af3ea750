#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Dispatch Core Rust
//!
//! In-process command dispatch engine: a stable priority queue of typed
//! commands drained by a single dispatch loop through pluggable handlers.
//!
//! ## Overview
//!
//! Administrative and automation operations are serialized behind one logical
//! execution thread while submissions arrive concurrently from many callers.
//! Every submitted command ends up `Completed` or `Failed` in a bounded
//! execution history, from which success rate and latency are derived.
//!
//! ## Module Organization
//!
//! - [`execution`] - Commands, priority queue, handler registry, dispatch loop, history
//! - [`config`] - Layered configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//! - [`constants`] - Built-in command names and system defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dispatch_core::{CommandDispatcher, DispatchConfig};
//! use dispatch_core::execution::{CommandName, CommandPriority, CommandRequest, CommandType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! dispatch_core::logging::init_structured_logging();
//!
//! let dispatcher = CommandDispatcher::with_builtin_handlers(DispatchConfig::default())?;
//! let _loop_handle = dispatcher.start()?;
//!
//! dispatcher.submit(
//!     CommandRequest::new(CommandType::Control, CommandName::EmergencyStop)
//!         .with_priority(CommandPriority::Critical),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod logging;

pub use crate::config::{ConfigManager, DispatchConfig};
pub use error::{DispatchError, Result};
pub use execution::{
    Command, CommandDispatcher, CommandHandler, CommandHandlerError, CommandRegistry,
    DispatchMetrics,
};
