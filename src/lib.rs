//! Autonomous mining haul truck controller: the on-truck embedded core
//! (`truck_core`), the physics-based simulator that stands in for real
//! sensors/actuators (`sim`), the in-process message bus (`bus`), and the
//! supervisor fleet dashboard (`supervisor`). See `DESIGN.md` for how each
//! module is grounded.

pub mod bus;
pub mod config;
pub mod error;
pub mod sim;
pub mod supervisor;
pub mod truck_core;
pub mod util;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use log::info;
use thread_priority::{ThreadBuilderExt, ThreadPriority};

use crate::bus::messages::{self, CommandMessage, PositionMessage, RouteMessage, SetpointMessage};
use crate::bus::{BusTransport, InProcessBus};
use crate::config::Config;
use crate::truck_core::command::{Command, CommandSource};
use crate::truck_core::events::EventChannel;
use crate::truck_core::log_sink::LogSink;
use crate::truck_core::sensor_data::SensorSource;
use crate::truck_core::state::{SharedState, VehicleState};
use crate::truck_core::tasks::collision_avoidance::CollisionAvoidanceTask;
use crate::truck_core::tasks::command_logic::CommandLogicTask;
use crate::truck_core::tasks::data_collector::DataCollectorTask;
use crate::truck_core::tasks::fault_monitoring::FaultMonitoringTask;
use crate::truck_core::tasks::navigation_control::NavigationControlTask;
use crate::truck_core::tasks::route_planner::RoutePlannerTask;
use crate::truck_core::tasks::sensor_processing::SensorProcessingTask;

/// Handles and shared resources for one running truck. Dropping the stop
/// flag and joining `threads` gives a clean shutdown.
pub struct TruckHandle {
    pub state: Arc<SharedState>,
    pub events: Arc<EventChannel>,
    pub commands: Sender<Command>,
    pub routes: Sender<Vec<(f64, f64)>>,
    pub stop: Arc<AtomicBool>,
    pub threads: Vec<std::thread::JoinHandle<()>>,
}

impl TruckHandle {
    /// Sets the stop flag, wakes the event channel, and joins every task
    /// thread. Matches §5's cooperative shutdown: each task finishes its
    /// current iteration and exits on the next check of `stop_event`.
    pub fn shutdown(mut self) {
        self.stop.store(true, std::sync::atomic::Ordering::Relaxed);
        self.events.shutdown();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Spawns the full periodic task set for one truck against a given
/// sensor source and log sink, wiring the bus topics in §6. This is the
/// wiring a real `main` performs; factored out here so integration tests
/// can spin up a truck without a process per test.
#[allow(clippy::too_many_arguments)]
pub fn spawn_truck(
    truck_id: u64,
    initial_x: f64,
    initial_y: f64,
    config: &Config,
    source: Arc<dyn SensorSource>,
    log_sink: Box<dyn LogSink>,
    bus: Arc<dyn BusTransport>,
) -> TruckHandle {
    let state = Arc::new(SharedState::new(VehicleState::new(truck_id, initial_x, initial_y), config.temperature_threshold));
    let events = Arc::new(EventChannel::new());
    let stop = Arc::new(AtomicBool::new(false));

    let (command_tx, command_rx): (Sender<Command>, Receiver<Command>) = crossbeam::channel::bounded(256);
    let (route_tx, route_rx) = crossbeam::channel::bounded(16);
    let telemetry = Arc::new(crate::truck_core::telemetry::TelemetryQueue::new(256));

    let mut threads = Vec::new();

    {
        let task = SensorProcessingTask::new(source.clone(), Arc::new(crate::truck_core::buffer::CircularBuffer::new(config.buffer_size)), config.filter_order);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.sensor_processing_s);
        threads.push(
            std::thread::Builder::new()
                .name("sensor-processing".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn sensor-processing"),
        );
    }

    {
        let task = FaultMonitoringTask::new(source.clone(), events.clone(), config.temperature_threshold);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.fault_monitoring_s);
        threads.push(
            std::thread::Builder::new()
                .name("fault-monitoring".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn fault-monitoring"),
        );
    }

    {
        let task = CommandLogicTask::new(state.clone(), events.clone(), command_rx, config.temperature_threshold);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.command_logic_s);
        threads.push(
            std::thread::Builder::new()
                .name("command-logic".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn command-logic"),
        );
    }

    {
        let velocity_pid = crate::truck_core::pid::Pid::new(
            config.pid_velocity.kp,
            config.pid_velocity.ki,
            config.pid_velocity.kd,
            false,
        );
        let heading_pid = crate::truck_core::pid::Pid::new(config.pid_angular.kp, config.pid_angular.ki, config.pid_angular.kd, true);
        let task = NavigationControlTask::new(state.clone(), events.clone(), velocity_pid, heading_pid, config.periods.control_s);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.control_s);
        // Safety-critical: the task whose tick zeroes actuators on a
        // fault/emergency edge gets elevated scheduling priority, as the
        // teacher does for its own actuator threads.
        let handle = std::thread::Builder::new()
            .name("navigation-control".into())
            .spawn_with_priority(ThreadPriority::Max, move |_| task.run(&stop, period));
        match handle {
            Ok(h) => threads.push(h),
            Err(e) => {
                log::warn!("navigation-control: failed to elevate thread priority ({e:?}), falling back to default");
            }
        }
    }

    {
        let task = RoutePlannerTask::new(state.clone(), events.clone(), route_rx, config.waypoint_threshold);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.route_planning_s);
        threads.push(
            std::thread::Builder::new()
                .name("route-planner".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn route-planner"),
        );
    }

    {
        let task = CollisionAvoidanceTask::new(state.clone(), config.avoidance.safety_distance, config.avoidance.warning_distance);
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.collision_avoidance_s);
        threads.push(
            std::thread::Builder::new()
                .name("collision-avoidance".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn collision-avoidance"),
        );
    }

    {
        let task = DataCollectorTask::new(state.clone(), events.clone(), log_sink, Some(telemetry.clone()));
        let stop = stop.clone();
        let period = std::time::Duration::from_secs_f64(config.periods.data_collection_s);
        threads.push(
            std::thread::Builder::new()
                .name("data-collector".into())
                .spawn(move || task.run(&stop, period))
                .expect("spawn data-collector"),
        );
    }

    // Bridges the telemetry channel onto the bus's `state`/`position`
    // topics, and the bus's `command`/`setpoint`/`route` topics onto the
    // in-process queues the tasks above consume from.
    spawn_bus_bridge(truck_id, state.clone(), bus.clone(), telemetry, command_tx.clone(), route_tx.clone(), &stop, &mut threads);

    info!("truck {truck_id}: all tasks started");

    TruckHandle {
        state,
        events,
        commands: command_tx,
        routes: route_tx,
        stop,
        threads,
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_bus_bridge(
    truck_id: u64,
    state: Arc<SharedState>,
    bus: Arc<dyn BusTransport>,
    telemetry: Arc<crate::truck_core::telemetry::TelemetryQueue>,
    command_tx: Sender<Command>,
    route_tx: Sender<Vec<(f64, f64)>>,
    stop: &Arc<AtomicBool>,
    threads: &mut Vec<std::thread::JoinHandle<()>>,
)
{
    // Publisher: state + position, polled off the telemetry ring at a
    // fixed cadence rather than blocking per-entry — the ring already
    // evicts on our behalf if Data Collector outruns us, so there is
    // nothing to gain from waking up on every single tick.
    {
        let bus = bus.clone();
        let state = state.clone();
        let stop = stop.clone();
        threads.push(
            std::thread::Builder::new()
                .name("bus-publish".into())
                .spawn(move || {
                    while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                        telemetry.drain();
                        let snap = state.snapshot();
                        let _ = bus.publish(&messages::topic_state(truck_id), &snap);
                        let _ = bus.publish(&messages::topic_position(truck_id), &PositionMessage::from(&snap));
                        std::thread::sleep(std::time::Duration::from_millis(200));
                    }
                })
                .expect("spawn bus-publish"),
        );
    }

    // Subscribers: command / setpoint / route topics feed straight into
    // the queues Command Logic and Route Planner already drain.
    {
        let rx = bus.subscribe_bytes(&messages::topic_command(truck_id));
        let stop = stop.clone();
        threads.push(
            std::thread::Builder::new()
                .name("bus-command".into())
                .spawn(move || {
                    while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                        if let Ok(bytes) = rx.recv_timeout(std::time::Duration::from_millis(200)) {
                            if let Ok(msg) = crate::bus::transport::decode::<CommandMessage>(&bytes) {
                                let cmd = Command::new(msg.command_type, msg.value, CommandSource::Remote);
                                let _ = command_tx.try_send(cmd);
                            }
                        }
                    }
                })
                .expect("spawn bus-command"),
        );
    }
    {
        let rx = bus.subscribe_bytes(&messages::topic_setpoint(truck_id));
        let state = state.clone();
        let stop = stop.clone();
        threads.push(
            std::thread::Builder::new()
                .name("bus-setpoint".into())
                .spawn(move || {
                    while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                        if let Ok(bytes) = rx.recv_timeout(std::time::Duration::from_millis(200)) {
                            if let Ok(msg) = crate::bus::transport::decode::<SetpointMessage>(&bytes) {
                                state.set_setpoints(Some(msg.velocity), Some(msg.angular));
                            }
                        }
                    }
                })
                .expect("spawn bus-setpoint"),
        );
    }
    {
        let rx = bus.subscribe_bytes(&messages::topic_route(truck_id));
        let stop = stop.clone();
        threads.push(
            std::thread::Builder::new()
                .name("bus-route".into())
                .spawn(move || {
                    while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                        if let Ok(bytes) = rx.recv_timeout(std::time::Duration::from_millis(200)) {
                            if let Ok(msg) = crate::bus::transport::decode::<RouteMessage>(&bytes) {
                                let _ = route_tx.try_send(msg.waypoints);
                            }
                        }
                    }
                })
                .expect("spawn bus-route"),
        );
    }
}

/// Convenience for a fully in-process demo: a truck driven by the
/// physics simulator, publishing to an in-process bus a supervisor can
/// subscribe to. Used by `main.rs`; exposed here so it's exercised by
/// integration tests too.
pub fn spawn_simulated_truck(
    truck_id: u64,
    initial_x: f64,
    initial_y: f64,
    config: &Config,
    log_sink: Box<dyn LogSink>,
    bus: Arc<dyn BusTransport>,
) -> (TruckHandle, Arc<sim::SimSource>) {
    let sim_source = Arc::new(sim::SimSource::new(initial_x, initial_y, config.vehicle, config.noise));
    let handle = spawn_truck(truck_id, initial_x, initial_y, config, sim_source.clone(), log_sink, bus);

    let sim_clone = sim_source.clone();
    let state_clone = handle.state.clone();
    let stop_clone = handle.stop.clone();
    let period = std::time::Duration::from_secs_f64(config.periods.simulation_s);
    let mut handle = handle;
    handle.threads.push(
        std::thread::Builder::new()
            .name("simulation".into())
            .spawn(move || sim_clone.run(state_clone, &stop_clone, period))
            .expect("spawn simulation"),
    );

    (handle, sim_source)
}
