use criterion::{black_box, criterion_group, criterion_main, Criterion};

use haul_truck_control::truck_core::pid::Pid;

fn pid_compute_bench(c: &mut Criterion) {
    let mut pid = Pid::new(0.5, 0.1, 0.05, false);
    pid.enable(0.0);

    c.bench_function("pid_compute", |b| {
        b.iter(|| black_box(pid.compute(black_box(3.0), black_box(5.0), black_box(0.05))))
    });
}

fn pid_compute_wrap_angle_bench(c: &mut Criterion) {
    let mut pid = Pid::new(1.0, 0.05, 0.2, true);
    pid.enable(0.0);

    c.bench_function("pid_compute_wrap_angle", |b| {
        b.iter(|| black_box(pid.compute(black_box(3.0), black_box(-3.0), black_box(0.05))))
    });
}

criterion_group!(benches, pid_compute_bench, pid_compute_wrap_angle_bench);
criterion_main!(benches);
