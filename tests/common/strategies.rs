use proptest::prelude::*;

use dispatch_core::execution::CommandPriority;

/// Strategy for generating command priorities
pub fn priority_strategy() -> impl Strategy<Value = CommandPriority> {
    prop_oneof![
        Just(CommandPriority::Low),
        Just(CommandPriority::Medium),
        Just(CommandPriority::High),
        Just(CommandPriority::Critical),
    ]
}

/// Strategy for generating a batch of submissions with arbitrary priorities
pub fn priority_batch_strategy() -> impl Strategy<Value = Vec<CommandPriority>> {
    prop::collection::vec(priority_strategy(), 1..60)
}

/// Strategy for generating success/failure outcomes of a command stream
pub fn outcome_stream_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..40)
}
