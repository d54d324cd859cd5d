//! Benchmarks for stage ordering and execution.

use compile_testing::context::{ModelSpec, SharedModel};
use compile_testing::pipeline::{StageDescriptor, StepRegistry};
use compile_testing::stages::NoOpStage;
use compile_testing::testing::fixtures::test_env;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

/// A chain where every stage runs after its predecessor, registered in
/// reverse so the scheduler cannot rely on registration order.
fn chain(len: usize) -> StepRegistry {
    let mut registry: StepRegistry = StepRegistry::new();
    for i in (0..len).rev() {
        let id = format!("stage-{i}");
        let mut descriptor = StageDescriptor::new(id.as_str());
        if i > 0 {
            descriptor = descriptor.run_after(format!("stage-{}", i - 1));
        }
        if let Err(err) = registry.register(descriptor, Box::new(NoOpStage::new(id))) {
            panic!("benchmark setup failed: {err}");
        }
    }
    registry
}

fn pipeline_benchmark(c: &mut Criterion) {
    let registry = chain(200);

    c.bench_function("execution_order_chain_200", |b| {
        b.iter(|| black_box(registry.execution_order()))
    });

    let (env, _) = test_env();
    let model: SharedModel = Arc::new(ModelSpec::new("/bench"));
    c.bench_function("execute_chain_200", |b| {
        b.iter(|| black_box(registry.execute(&env, Arc::clone(&model))))
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
