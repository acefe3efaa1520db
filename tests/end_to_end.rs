//! Black-box scenarios against the public crate API, one per numbered
//! end-to-end scenario. Every task period here is configured short (all
//! well under the default test harness timeout) so the scenarios settle
//! in real wall-clock seconds rather than the worst-case bounds named in
//! the scenario text.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use haul_truck_control::bus::{BusTransport, InProcessBus};
use haul_truck_control::config::Config;
use haul_truck_control::spawn_simulated_truck;
use haul_truck_control::truck_core::command::{Command, CommandSource, CommandType};
use haul_truck_control::truck_core::log_sink::{CsvLogSink, LogSink};
use haul_truck_control::truck_core::state::{Mode, Status};

fn fast_config() -> Config {
    let mut cfg = Config::default();
    cfg.periods.simulation_s = 0.01;
    cfg.periods.sensor_processing_s = 0.01;
    cfg.periods.control_s = 0.01;
    cfg.periods.command_logic_s = 0.01;
    cfg.periods.fault_monitoring_s = 0.02;
    cfg.periods.route_planning_s = 0.02;
    cfg.periods.collision_avoidance_s = 0.02;
    cfg.periods.data_collection_s = 0.1;
    cfg
}

fn null_sink() -> Box<dyn LogSink> {
    struct NullSink;
    impl LogSink for NullSink {
        fn append(
            &mut self,
            _entry: &haul_truck_control::truck_core::log_entry::LogEntry,
        ) -> Result<(), haul_truck_control::error::LogSinkError> {
            Ok(())
        }
    }
    Box::new(NullSink)
}

fn poll_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Scenario 1: a straight-line route is fully driven and reaches within
/// the waypoint threshold, with the final setpoint zeroed.
#[test]
fn scenario_1_straight_line_route_reaches_target() {
    let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
    let (handle, _sim) = spawn_simulated_truck(1, 50.0, 37.5, &fast_config(), null_sink(), bus);

    handle
        .commands
        .send(Command::new(
            CommandType::EnableAutomatic,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    handle.routes.send(vec![(60.0, 37.5)]).unwrap();

    let reached = poll_until(Duration::from_secs(15), || {
        let snap = handle.state.snapshot();
        snap.target_x.is_none()
            && snap.velocity_setpoint == 0.0
            && (snap.x - 60.0).hypot(snap.y - 37.5) < 2.0
    });
    assert!(reached, "truck did not reach the waypoint in time");

    handle.shutdown();
}

/// Scenario 2: EMERGENCY_STOP zeroes actuators within one control tick
/// and latches until RESET_EMERGENCY, ignoring commands meanwhile.
#[test]
fn scenario_2_emergency_latches_and_rejects_further_commands() {
    let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
    let (handle, _sim) = spawn_simulated_truck(2, 55.0, 37.5, &fast_config(), null_sink(), bus);

    handle
        .commands
        .send(Command::new(
            CommandType::EnableAutomatic,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    handle
        .commands
        .send(Command::new(
            CommandType::Accelerate,
            Some(0.8),
            CommandSource::Local,
        ))
        .unwrap();
    std::thread::sleep(Duration::from_millis(100));

    handle
        .commands
        .send(Command::new(
            CommandType::EmergencyStop,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    let latched = poll_until(Duration::from_millis(500), || {
        handle.state.snapshot().status == Status::Emergency
    });
    assert!(latched);

    std::thread::sleep(Duration::from_millis(50));
    let snap = handle.state.snapshot();
    assert_eq!(snap.acceleration_cmd, 0.0);
    assert_eq!(snap.steering_cmd, 0.0);

    handle
        .commands
        .send(Command::new(
            CommandType::Accelerate,
            Some(0.9),
            CommandSource::Remote,
        ))
        .unwrap();
    std::thread::sleep(Duration::from_millis(100));
    let snap = handle.state.snapshot();
    assert_eq!(
        snap.acceleration_cmd, 0.0,
        "command sent while emergency must be ignored"
    );

    handle.shutdown();
}

/// Scenario 3: a temperature fault forces FAULT, blocks ENABLE_AUTOMATIC,
/// clears on its own, and RESET_FAULT then allows automatic mode again.
#[test]
fn scenario_3_fault_rearm_cycle() {
    let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
    let (handle, sim) = spawn_simulated_truck(3, 20.0, 20.0, &fast_config(), null_sink(), bus);

    sim.inject_temperature(105.0);
    let faulted = poll_until(Duration::from_millis(500), || {
        handle.state.snapshot().status == Status::Fault
    });
    assert!(
        faulted,
        "temperature fault did not propagate to FAULT status"
    );

    handle
        .commands
        .send(Command::new(
            CommandType::EnableAutomatic,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(
        handle.state.snapshot().mode,
        Mode::ManualLocal,
        "automatic must stay rejected while faulted"
    );

    sim.inject_temperature(30.0);
    std::thread::sleep(Duration::from_millis(100));

    handle
        .commands
        .send(Command::new(
            CommandType::ResetFault,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    let cleared = poll_until(Duration::from_millis(500), || {
        handle.state.snapshot().status == Status::Stopped
    });
    assert!(cleared, "RESET_FAULT did not restore STOPPED");

    handle
        .commands
        .send(Command::new(
            CommandType::EnableAutomatic,
            None,
            CommandSource::Local,
        ))
        .unwrap();
    let automatic = poll_until(Duration::from_millis(500), || {
        handle.state.snapshot().mode == Mode::AutomaticRemote
    });
    assert!(
        automatic,
        "ENABLE_AUTOMATIC should succeed once the fault has cleared and been reset"
    );

    handle.shutdown();
}

/// Scenario 4: a peer inside the warning band scales velocity and
/// steers away; once the peer moves off, avoidance deactivates and the
/// planner's setpoints take over again.
#[test]
fn scenario_4_collision_slowdown_and_recovery() {
    use haul_truck_control::truck_core::state::{SharedState, VehicleState};
    use haul_truck_control::truck_core::tasks::collision_avoidance::CollisionAvoidanceTask;

    let state = Arc::new(SharedState::new(VehicleState::new(4, 50.0, 37.5), 100.0));
    state.set_mode(Mode::AutomaticRemote);
    state.set_setpoints(Some(5.0), Some(0.0));
    state.update_peer(99, 58.0, 37.5, 0.0);

    let task = CollisionAvoidanceTask::new(state.clone(), 5.0, 10.0);
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let handle = {
        let stop = stop.clone();
        std::thread::spawn(move || {
            task.run(&stop, Duration::from_millis(20));
        })
    };

    let slowed = poll_until(Duration::from_millis(500), || {
        let snap = state.snapshot();
        (snap.velocity_setpoint - 3.0).abs() < 1e-6
            && (snap.angular_setpoint + std::f64::consts::FRAC_PI_6).abs() < 1e-6
    });
    assert!(
        slowed,
        "avoidance did not scale velocity/angular setpoints for the peer in range"
    );

    state.remove_peer(99);
    // Re-assert the original planner-style setpoint; avoidance should
    // leave it alone once the peer is gone.
    state.set_setpoints(Some(5.0), Some(0.0));
    let recovered = poll_until(Duration::from_millis(500), || {
        let snap = state.snapshot();
        snap.velocity_setpoint == 5.0
    });
    assert!(
        recovered,
        "setpoints were not restored once the peer moved away"
    );

    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    let _ = handle.join();
}

/// Scenario 5: switching MANUAL->AUTOMATIC with setpoints mirroring the
/// current measurement reproduces the prior manual actuator command on
/// the very first automatic tick (bumpless transfer).
#[test]
fn scenario_5_bumpless_transfer_reproduces_prior_command() {
    use haul_truck_control::truck_core::events::EventChannel;
    use haul_truck_control::truck_core::pid::Pid;
    use haul_truck_control::truck_core::state::{SharedState, VehicleState};
    use haul_truck_control::truck_core::tasks::navigation_control::NavigationControlTask;

    let state = Arc::new(SharedState::new(VehicleState::new(5, 0.0, 0.0), 100.0));
    state.update_actuators(0.4, 0.0);
    state.update_pose(0.0, 0.0, 0.0, 2.0);
    state.set_setpoints(Some(2.0), Some(0.0));

    let events = Arc::new(EventChannel::new());
    let mut task = NavigationControlTask::new(
        state.clone(),
        events,
        Pid::new(0.5, 0.1, 0.05, false),
        Pid::new(1.0, 0.05, 0.2, true),
        0.05,
    );

    state.set_mode(Mode::AutomaticRemote);
    // Drive one tick manually via the public run() on a single-shot stop
    // flag flipped immediately after the first iteration would race, so
    // instead exercise the task directly through its Drop-free `run`
    // helper is not available publicly; emulate one control tick with a
    // short-lived thread bounded to a single period.
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let stop_clone = stop.clone();
    let handle = std::thread::spawn(move || {
        task.run(&stop_clone, Duration::from_millis(10));
    });
    std::thread::sleep(Duration::from_millis(15));
    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    let _ = handle.join();

    let snap = state.snapshot();
    assert!(
        (snap.acceleration_cmd - 0.4).abs() < 0.001,
        "bumpless transfer did not hold: got {}",
        snap.acceleration_cmd
    );
}

/// Scenario 6: the order-5 moving-average filter converges exactly as
/// the worked examples specify.
#[test]
fn scenario_6_filter_convergence() {
    use haul_truck_control::truck_core::filter::MovingAverageFilter;

    let mut filter = MovingAverageFilter::new(5);
    let outputs: Vec<f64> = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        .iter()
        .map(|&x| filter.filter(x))
        .collect();
    assert_eq!(outputs, vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

    filter.reset();
    let mut last = 0.0;
    for x in [0.0, 0.0, 0.0, 0.0, 0.0, 10.0] {
        last = filter.filter(x);
    }
    assert_eq!(last, 2.0);
}

/// Sanity check that a truck can log to a real CSV sink end-to-end.
#[test]
fn csv_log_sink_is_created_and_appended_to_by_a_running_truck() {
    let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
    let dir = std::env::temp_dir().join(format!("haul-truck-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("truck_9.csv");
    let sink = Box::new(CsvLogSink::create(&path).unwrap());

    let (handle, _sim) = spawn_simulated_truck(9, 5.0, 5.0, &fast_config(), sink, bus);
    std::thread::sleep(Duration::from_millis(250));
    handle.shutdown();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(
        contents.lines().count() > 1,
        "expected at least a header and one data row"
    );
    let _ = std::fs::remove_dir_all(&dir);
    let _ = Path::new(&path);
}
