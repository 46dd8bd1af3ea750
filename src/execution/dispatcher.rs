//! # Command Dispatcher
//!
//! Single-consumer dispatch loop over the priority queue.
//!
//! ## Architecture
//!
//! ```text
//! submit() -> CommandQueue -> tick -> CommandRegistry::resolve -> handler -> ExecutionHistory
//! ```
//!
//! - **Concurrent submission**: `submit` is synchronous and callable from any task
//! - **Single flight**: at most one command is `Executing`; the running command
//!   always finishes before the next pop
//! - **Contained failures**: unknown names, handler errors, panics and timeouts
//!   become `Failed` commands, never loop termination
//! - **Poll-based**: callers observe results via `get_history`, `find_command`
//!   and `get_metrics`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dispatch_core::config::DispatchConfig;
//! use dispatch_core::execution::command::{CommandName, CommandRequest, CommandType};
//! use dispatch_core::execution::dispatcher::CommandDispatcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = CommandDispatcher::with_builtin_handlers(DispatchConfig::default())?;
//! let handle = dispatcher.start()?;
//!
//! let command = dispatcher.submit(CommandRequest::new(
//!     CommandType::System,
//!     CommandName::SystemStatus,
//! ))?;
//! println!("submitted {}", command.id());
//!
//! let metrics = dispatcher.get_metrics();
//! println!("success rate: {:.1}%", metrics.success_rate);
//!
//! dispatcher.shutdown();
//! handle.await?;
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result};
use crate::execution::command::{
    Command, CommandName, CommandOutcome, CommandParameters, CommandPriority, CommandRequest,
    CommandType, FailureKind,
};
use crate::execution::command_queue::CommandQueue;
use crate::execution::command_router::{CommandRegistry, HandlerContext};
use crate::execution::control_state::ControlState;
use crate::execution::history::{DispatchMetrics, ExecutionHistory};
use crate::logging::log_command_operation;

/// Cheaply cloneable handle to a dispatch engine
#[derive(Clone)]
pub struct CommandDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    config: DispatchConfig,
    registry: Arc<CommandRegistry>,
    queue: Arc<CommandQueue>,
    history: Arc<ExecutionHistory>,
    control: Arc<ControlState>,
    /// Snapshot of the command currently in flight
    executing: Mutex<Option<Command>>,
    /// Held for the whole pop-execute-record cycle
    execution_lock: tokio::sync::Mutex<()>,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl CommandDispatcher {
    /// Create a dispatcher over an already-populated registry
    pub fn new(config: DispatchConfig, registry: CommandRegistry) -> Result<Self> {
        config.validate()?;

        let (shutdown_tx, _) = watch::channel(false);
        let control = Arc::new(ControlState::new(config.initial_automation_level));

        info!(
            tick_interval_ms = config.tick_interval_ms,
            history_capacity = config.history_capacity,
            handler_timeout_ms = config.handler_timeout_ms,
            registered_handlers = registry.len(),
            "Command dispatcher created"
        );

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                history: Arc::new(ExecutionHistory::new(config.history_capacity)),
                queue: Arc::new(CommandQueue::new()),
                registry: Arc::new(registry),
                control,
                executing: Mutex::new(None),
                execution_lock: tokio::sync::Mutex::new(()),
                running: AtomicBool::new(false),
                shutdown_tx,
                config,
            }),
        })
    }

    /// Create a dispatcher with the built-in handler set
    pub fn with_builtin_handlers(config: DispatchConfig) -> Result<Self> {
        Self::new(config, CommandRegistry::with_builtin_handlers())
    }

    /// Enqueue a new `Pending` command and return a snapshot of it
    ///
    /// The returned snapshot does not track later transitions; poll
    /// `find_command` or `get_history` for the outcome.
    pub fn submit(&self, request: CommandRequest) -> Result<Command> {
        if self.is_shut_down() {
            return Err(DispatchError::Shutdown);
        }
        if request.name.as_str().trim().is_empty() {
            return Err(DispatchError::Validation(
                "command name must not be empty".to_string(),
            ));
        }

        let command = Command::from_request(request);
        let snapshot = command.clone();
        self.inner.queue.push(command);

        debug!(
            command_id = %snapshot.id(),
            command_name = %snapshot.name(),
            priority = ?snapshot.priority(),
            queue_depth = self.inner.queue.len(),
            "Command submitted"
        );

        Ok(snapshot)
    }

    /// Positional form of `submit`; `priority` defaults to `Medium`
    pub fn submit_command(
        &self,
        command_type: CommandType,
        name: impl Into<CommandName>,
        parameters: CommandParameters,
        priority: Option<CommandPriority>,
    ) -> Result<Command> {
        self.submit(CommandRequest {
            command_type,
            name: name.into(),
            parameters,
            priority,
        })
    }

    /// Terminal commands, most recent first, at most `limit`
    pub fn get_history(&self, limit: usize) -> Vec<Command> {
        self.inner.history.recent(limit)
    }

    /// Aggregate metrics recomputed from the current history
    pub fn get_metrics(&self) -> DispatchMetrics {
        // Holding the in-flight slot keeps the three counts from straddling a pop
        let executing = self.inner.executing.lock();
        let summary = self.inner.history.summary();
        DispatchMetrics {
            success_rate: summary.success_rate,
            average_execution_duration_ms: summary.average_execution_duration_ms,
            queue_depth: self.inner.queue.len(),
            active_count: usize::from(executing.is_some()),
            history_size: self.inner.history.len(),
            completed_count: summary.completed_count,
            failed_count: summary.failed_count,
        }
    }

    /// Look up a command wherever it currently lives
    pub fn find_command(&self, id: &str) -> Option<Command> {
        let executing = self.inner.executing.lock();
        if let Some(command) = executing.as_ref().filter(|command| command.id() == id) {
            return Some(command.clone());
        }
        self.inner
            .queue
            .find(id)
            .or_else(|| self.inner.history.find(id))
    }

    /// Run one tick: pop the highest-ranked command, execute it and record the outcome.
    ///
    /// Returns the terminal command, or `None` when the queue was empty.
    ///
    /// Dropping the returned future while a handler is running settles the
    /// command as `Failed` with kind `cancelled`, so it still reaches the history.
    pub async fn dispatch_next(&self) -> Option<Command> {
        let _guard = self.inner.execution_lock.lock().await;

        let command = {
            let mut executing = self.inner.executing.lock();
            let mut command = self.inner.queue.pop()?;
            command.mark_executing();
            *executing = Some(command.clone());
            command
        };
        let mut in_flight = InFlight::new(&self.inner, command.clone());

        debug!(
            command_id = %command.id(),
            command_name = %command.name(),
            priority = ?command.priority(),
            "Dispatching command"
        );

        let outcome = self.execute(&command).await;
        in_flight.settle(outcome)
    }

    async fn execute(&self, command: &Command) -> CommandOutcome {
        let Some(handler) = self.inner.registry.resolve(command.name()) else {
            warn!(
                command_id = %command.id(),
                command_name = %command.name(),
                "No handler registered for command"
            );
            return CommandOutcome::error(
                FailureKind::UnknownCommand,
                format!("unknown command: {}", command.name()),
            );
        };

        let context = HandlerContext::new(
            Arc::clone(&self.inner.control),
            Arc::clone(&self.inner.queue),
            Arc::clone(&self.inner.history),
        );
        let invocation = AssertUnwindSafe(handler.handle(command.parameters(), &context))
            .catch_unwind();

        let result = match self.inner.config.handler_timeout() {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(result) => result,
                Err(_) => {
                    error!(
                        command_id = %command.id(),
                        command_name = %command.name(),
                        timeout_ms = millis(limit),
                        "Command handler timed out"
                    );
                    return CommandOutcome::error(
                        FailureKind::TimedOut,
                        format!("handler exceeded {}ms", millis(limit)),
                    );
                }
            },
            None => invocation.await,
        };

        match result {
            Ok(Ok(value)) => CommandOutcome::success(value),
            Ok(Err(e)) => {
                error!(
                    command_id = %command.id(),
                    command_name = %command.name(),
                    handler = handler.handler_name(),
                    error = %e,
                    "Command execution failed"
                );
                CommandOutcome::error(e.failure_kind(), e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    command_id = %command.id(),
                    command_name = %command.name(),
                    handler = handler.handler_name(),
                    panic = %message,
                    "Command handler panicked"
                );
                CommandOutcome::error(FailureKind::Panicked, format!("handler panicked: {message}"))
            }
        }
    }

    /// Spawn the dispatch loop onto the current tokio runtime
    pub fn start(&self) -> Result<JoinHandle<()>> {
        if self.is_shut_down() {
            return Err(DispatchError::Shutdown);
        }
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DispatchError::AlreadyRunning);
        }

        let dispatcher = self.clone();
        Ok(tokio::spawn(async move {
            dispatcher.run_loop().await;
            dispatcher.inner.running.store(false, Ordering::Release);
        }))
    }

    /// Tick until shutdown. Each tick dispatches at most one command; an
    /// in-flight command always settles before shutdown is observed.
    async fn run_loop(&self) {
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        let mut ticker = interval(self.inner.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_interval_ms = self.inner.config.tick_interval_ms,
            "Starting command dispatch loop"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            self.dispatch_next().await;
        }

        info!(
            queue_depth = self.inner.queue.len(),
            history_size = self.inner.history.len(),
            "Command dispatch loop stopped"
        );
    }

    /// Stop accepting submissions and signal the loop to exit
    pub fn shutdown(&self) {
        self.inner.shutdown_tx.send_replace(true);
        info!("Command dispatcher shutdown requested");
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown_tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub fn is_executing(&self) -> bool {
        self.inner.executing.lock().is_some()
    }

    pub fn queue_depth(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn automation_level(&self) -> u8 {
        self.inner.control.automation_level()
    }

    pub fn control(&self) -> &ControlState {
        &self.inner.control
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    pub fn registered_commands(&self) -> Vec<CommandName> {
        self.inner.registry.registered_commands()
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("config", &self.inner.config)
            .field("queue_depth", &self.queue_depth())
            .field("executing", &self.is_executing())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// The command currently owned by a `dispatch_next` call
///
/// Settling is mandatory: if the tick future is dropped before the handler
/// returns, `Drop` records the command as cancelled and frees the slot.
struct InFlight<'a> {
    inner: &'a DispatcherInner,
    command: Option<Command>,
    started: Instant,
}

impl<'a> InFlight<'a> {
    fn new(inner: &'a DispatcherInner, command: Command) -> Self {
        Self {
            inner,
            command: Some(command),
            started: Instant::now(),
        }
    }

    fn settle(&mut self, outcome: CommandOutcome) -> Option<Command> {
        let mut command = self.command.take()?;
        command.finish(outcome, millis(self.started.elapsed()));
        log_command_operation(
            "dispatch",
            command.id(),
            command.name().as_str(),
            &command.state().to_string(),
            command.execution_duration_ms(),
            None,
        );

        {
            let mut executing = self.inner.executing.lock();
            self.inner.history.record(command.clone());
            *executing = None;
        }
        self.inner.control.record_command_processed(Utc::now());

        Some(command)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(command) = self.command.as_ref() else {
            return;
        };
        warn!(
            command_id = %command.id(),
            command_name = %command.name(),
            "Dispatch abandoned before the handler settled"
        );
        self.settle(CommandOutcome::error(
            FailureKind::Cancelled,
            "dispatch abandoned before the handler settled",
        ));
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
