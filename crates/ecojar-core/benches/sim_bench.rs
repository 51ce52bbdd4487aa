//! Criterion benchmarks for the ecojar simulation engine.
//!
//! Two benchmark groups:
//! - `single_step`: one fixed tick of the default jar -- the live-play cost.
//! - `skip_ahead`: one simulated hour in a tight loop -- the time-warp cost
//!   that the per-step caps and the unthrottled scheduler path exist for.

use criterion::{Criterion, criterion_group, criterion_main};
use ecojar_core::fixed::Fixed64;
use ecojar_core::test_utils::*;

fn bench_single_step(c: &mut Criterion) {
    c.bench_function("single_step_default_jar", |b| {
        let mut jar = sealed_jar();
        b.iter(|| {
            jar.advance_simulation(Fixed64::ONE);
        });
    });
}

fn bench_skip_ahead_hour(c: &mut Criterion) {
    c.bench_function("skip_ahead_one_hour", |b| {
        b.iter(|| {
            let mut jar = sealed_jar();
            let mut scheduler = second_scheduler();
            let report = scheduler.skip_ahead(&mut jar, fixed(3600.0));
            assert_eq!(report.steps_run, 3600);
        });
    });
}

criterion_group!(benches, bench_single_step, bench_skip_ahead_hour);
criterion_main!(benches);
