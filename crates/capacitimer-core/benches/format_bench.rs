//! Criterion benchmarks for variable export.
//!
//! Every applied snapshot reformats all exported variables, so this runs once
//! per second per connected surface (more during bursts of push frames).
//!
//! Run with:
//! ```bash
//! cargo bench --package capacitimer-core --bench format_bench
//! ```

use capacitimer_core::{export_variables, format_time, Settings, TimerState};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_format_time(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_time");
    let all = Settings::default();
    let no_hours = Settings {
        show_hours: false,
        ..Settings::default()
    };

    for seconds in [0_i64, -75, 3725, 359_999] {
        group.bench_with_input(BenchmarkId::new("all_fields", seconds), &seconds, |b, s| {
            b.iter(|| format_time(black_box(*s), &all))
        });
        group.bench_with_input(BenchmarkId::new("hours_hidden", seconds), &seconds, |b, s| {
            b.iter(|| format_time(black_box(*s), &no_hours))
        });
    }
    group.finish();
}

fn bench_export_variables(c: &mut Criterion) {
    let timer = TimerState {
        time_remaining: -75,
        is_running: true,
        last_set_time: 300,
        ..TimerState::default()
    };
    let settings = Settings::default();

    c.bench_function("export_variables", |b| {
        b.iter(|| export_variables(black_box(&timer), black_box(&settings)))
    });
}

criterion_group!(benches, bench_format_time, bench_export_variables);
criterion_main!(benches);
