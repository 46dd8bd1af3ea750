use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dispatch_core::execution::{
    CommandHandler, CommandHandlerError, CommandParameters, HandlerContext,
};

/// Succeeds immediately, echoing its parameters
pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(
        &self,
        parameters: &CommandParameters,
        _context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        Ok(serde_json::Value::Object(parameters.clone()))
    }

    fn handler_name(&self) -> &str {
        "echo_handler"
    }
}

/// Always fails with an execution error
pub struct AlwaysFailHandler;

#[async_trait]
impl CommandHandler for AlwaysFailHandler {
    async fn handle(
        &self,
        _parameters: &CommandParameters,
        _context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        Err(CommandHandlerError::execution_failed("downstream unavailable"))
    }

    fn handler_name(&self) -> &str {
        "always_fail_handler"
    }
}

/// Sleeps while tracking how many invocations overlap
#[derive(Default)]
pub struct ConcurrencyProbe {
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub invocations: AtomicUsize,
}

pub struct ProbeHandler {
    pub probe: Arc<ConcurrencyProbe>,
    pub delay: Duration,
}

#[async_trait]
impl CommandHandler for ProbeHandler {
    async fn handle(
        &self,
        _parameters: &CommandParameters,
        _context: &HandlerContext,
    ) -> Result<serde_json::Value, CommandHandlerError> {
        let now_active = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_active.fetch_max(now_active, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.probe.active.fetch_sub(1, Ordering::SeqCst);
        self.probe.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "overlap": now_active }))
    }

    fn handler_name(&self) -> &str {
        "probe_handler"
    }
}
