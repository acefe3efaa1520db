use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haul_truck_control::truck_core::events::{EventChannel, EventType};
use std::time::Duration;

fn emit_bench(c: &mut Criterion) {
    let channel = EventChannel::new();
    c.bench_function("event_channel_emit", |b| {
        b.iter(|| channel.emit(black_box(EventType::ModeChanged), black_box(None)))
    });
}

fn emit_then_check_bench(c: &mut Criterion) {
    let channel = EventChannel::new();
    c.bench_function("event_channel_emit_then_check", |b| {
        b.iter(|| {
            channel.emit(EventType::TargetReached, None);
            black_box(channel.check(EventType::TargetReached))
        })
    });
}

fn wait_with_pending_event_bench(c: &mut Criterion) {
    let channel = EventChannel::new();
    c.bench_function("event_channel_wait_pending", |b| {
        b.iter(|| {
            channel.emit(EventType::NewRoute, None);
            black_box(channel.wait(&[EventType::NewRoute], Duration::ZERO))
        })
    });
}

criterion_group!(benches, emit_bench, emit_then_check_bench, wait_with_pending_event_bench);
criterion_main!(benches);
