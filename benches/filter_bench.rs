use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haul_truck_control::truck_core::filter::MovingAverageFilter;

fn filter_steady_state_bench(c: &mut Criterion) {
    let mut filter = MovingAverageFilter::new(5);
    for i in 0..5 {
        filter.filter(i as f64);
    }

    c.bench_function("moving_average_filter_step", |b| {
        b.iter(|| black_box(filter.filter(black_box(3.0))))
    });
}

fn filter_large_window_bench(c: &mut Criterion) {
    let mut filter = MovingAverageFilter::new(200);
    for i in 0..200 {
        filter.filter(i as f64);
    }

    c.bench_function("moving_average_filter_step_wide_window", |b| {
        b.iter(|| black_box(filter.filter(black_box(3.0))))
    });
}

criterion_group!(benches, filter_steady_state_bench, filter_large_window_bench);
criterion_main!(benches);
