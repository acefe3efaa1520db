use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haul_truck_control::truck_core::buffer::CircularBuffer;
use haul_truck_control::truck_core::sensor_data::FilteredSample;

fn sample(v: f64) -> FilteredSample {
    FilteredSample {
        x: v,
        y: v,
        theta: 0.0,
        velocity: v,
        temperature: 20.0,
        electrical_fault: false,
        hydraulic_fault: false,
        timestamp: 0.0,
    }
}

fn write_into_full_buffer_bench(c: &mut Criterion) {
    let buffer = CircularBuffer::new(100);
    for i in 0..100 {
        buffer.write(sample(i as f64));
    }

    c.bench_function("circular_buffer_write_when_full", |b| {
        b.iter(|| buffer.write(black_box(sample(1.0))))
    });
}

fn read_latest_bench(c: &mut Criterion) {
    let buffer = CircularBuffer::new(100);
    for i in 0..100 {
        buffer.write(sample(i as f64));
    }

    c.bench_function("circular_buffer_read_latest", |b| {
        b.iter(|| black_box(buffer.read_latest()))
    });
}

fn read_last_n_bench(c: &mut Criterion) {
    let buffer = CircularBuffer::new(100);
    for i in 0..100 {
        buffer.write(sample(i as f64));
    }

    c.bench_function("circular_buffer_read_last_20", |b| {
        b.iter(|| black_box(buffer.read_last_n(20)))
    });
}

criterion_group!(benches, write_into_full_buffer_bench, read_latest_bench, read_last_n_bench);
criterion_main!(benches);
