//! The seven periodic tasks and the shared periodic-loop helper they all
//! use, grounded on the teacher's `Sensor::run` loop shape (mark start
//! time, do work, sleep `max(0, period - elapsed)` via `spin_sleep`) and
//! on §9's "periodic tasks" design note (do work in a try/catch-equivalent
//! that logs and continues).

pub mod collision_avoidance;
pub mod command_logic;
pub mod data_collector;
pub mod fault_monitoring;
pub mod navigation_control;
pub mod route_planner;
pub mod sensor_processing;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{error, info};
use spin_sleep::{SpinSleeper, SpinStrategy};

/// Runs `tick` every `period` until `stop` is set, sleeping
/// `max(0, period - elapsed)` between iterations. A panicking tick is
/// caught, logged, and the loop continues at the next period — no task
/// iteration is allowed to take the process down, per §7's propagation
/// policy.
pub fn run_periodic(name: &str, period: Duration, stop: &AtomicBool, mut tick: impl FnMut()) {
    let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
    info!("{name} starting, period={period:?}");
    while !stop.load(Ordering::Relaxed) {
        let start = Instant::now();
        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(&mut tick)) {
            error!("{name} tick panicked, continuing at next period: {panic:?}");
        }
        let elapsed = start.elapsed();
        if elapsed < period {
            sleeper.sleep(period - elapsed);
        }
    }
    info!("{name} stopping");
}
