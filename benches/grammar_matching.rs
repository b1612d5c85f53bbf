//! Grammar matcher throughput across instruction shapes and registry size.

use ai_step_engine::intent::catalog::default_registry;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_instructions() -> Vec<&'static str> {
    vec![
        "click the Submit button",
        "type 'alice@example.test' into the Email field",
        "the Welcome heading should be visible",
        "wait for 3 seconds",
        "navigate to 'https://example.test/login'",
        "get the page title",
        "select 'United States' from the Country dropdown",
        "the page url should contain '/dashboard'",
    ]
}

fn bench_single_instruction(c: &mut Criterion) {
    let registry = default_registry().unwrap();
    c.bench_function("parse_click_instruction", |b| {
        b.iter(|| registry.parse("click the Submit button").unwrap());
    });
}

fn bench_instruction_shapes(c: &mut Criterion) {
    let registry = default_registry().unwrap();
    let mut group = c.benchmark_group("instruction_shapes");

    for (i, instruction) in sample_instructions().into_iter().enumerate() {
        group.bench_with_input(BenchmarkId::from_parameter(i), instruction, |b, instruction| {
            b.iter(|| registry.parse(instruction));
        });
    }

    group.finish();
}

fn bench_batch_parsing(c: &mut Criterion) {
    let registry = default_registry().unwrap();
    let instructions = sample_instructions();

    c.bench_function("batch_parse_8_instructions_x_100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                for instruction in &instructions {
                    let _ = registry.parse(instruction);
                }
            }
        });
    });
}

fn bench_registry_construction(c: &mut Criterion) {
    c.bench_function("default_registry_construction", |b| {
        b.iter(|| default_registry().unwrap());
    });
}

criterion_group!(
    benches,
    bench_single_instruction,
    bench_instruction_shapes,
    bench_batch_parsing,
    bench_registry_construction,
);

criterion_main!(benches);
