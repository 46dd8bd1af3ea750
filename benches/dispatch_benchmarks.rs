use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dispatch_core::execution::{CommandName, CommandPriority, CommandRequest, CommandType};
use dispatch_core::{CommandDispatcher, DispatchConfig};

const PRIORITIES: [CommandPriority; 4] = [
    CommandPriority::Low,
    CommandPriority::Medium,
    CommandPriority::High,
    CommandPriority::Critical,
];

fn benchmark_config_creation(c: &mut Criterion) {
    c.bench_function("config_creation", |b| b.iter(DispatchConfig::default));
}

fn benchmark_submit(c: &mut Criterion) {
    let dispatcher = CommandDispatcher::with_builtin_handlers(
        DispatchConfig::default().with_history_capacity(1000),
    )
    .expect("valid config");

    c.bench_function("submit_mixed_priorities", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            black_box(
                dispatcher.submit(
                    CommandRequest::new(CommandType::System, "UNREGISTERED")
                        .with_priority(PRIORITIES[i % PRIORITIES.len()]),
                ),
            )
        })
    });
}

fn benchmark_submit_and_drain(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");

    c.bench_function("submit_and_drain_100_status_commands", |b| {
        b.iter(|| {
            let dispatcher =
                CommandDispatcher::with_builtin_handlers(DispatchConfig::default())
                    .expect("valid config");
            for i in 0..100 {
                dispatcher
                    .submit(
                        CommandRequest::new(CommandType::System, CommandName::SystemStatus)
                            .with_priority(PRIORITIES[i % PRIORITIES.len()]),
                    )
                    .expect("submit");
            }
            rt.block_on(async {
                while dispatcher.dispatch_next().await.is_some() {}
            });
            black_box(dispatcher.get_metrics())
        })
    });
}

criterion_group!(
    benches,
    benchmark_config_creation,
    benchmark_submit,
    benchmark_submit_and_drain
);
criterion_main!(benches);
