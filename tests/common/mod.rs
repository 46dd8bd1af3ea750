#![allow(dead_code)]

pub mod handlers;
pub mod strategies;

pub use handlers::*;
pub use strategies::*;

use std::time::Duration;

use dispatch_core::execution::{Command, CommandParameters};
use dispatch_core::CommandDispatcher;

/// Build a parameter map from a JSON object literal
pub fn params(value: serde_json::Value) -> CommandParameters {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("parameters must be a JSON object, got {other}"),
    }
}

/// Poll the history until it holds `expected` entries or the deadline passes
pub async fn wait_for_history(
    dispatcher: &CommandDispatcher,
    expected: usize,
    deadline: Duration,
) -> Vec<Command> {
    let result = tokio::time::timeout(deadline, async {
        loop {
            let history = dispatcher.get_history(usize::MAX);
            if history.len() >= expected {
                return history;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    match result {
        Ok(history) => history,
        Err(_) => panic!(
            "timed out waiting for {expected} history entries, have {}",
            dispatcher.get_history(usize::MAX).len()
        ),
    }
}
