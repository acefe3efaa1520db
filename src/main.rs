//! Mine fleet entry point: boots a small fleet of simulated haul trucks,
//! each running the full on-truck task set against the physics simulator
//! in [`haul_truck_control::sim`], wires them onto an in-process bus, and
//! serves a fleet dashboard for the supervisor station. Runs for a fixed
//! demo duration and shuts down cooperatively, the way the teacher's own
//! `main` runs a fixed-duration experiment then joins every thread.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;

use haul_truck_control::bus::{BusTransport, InProcessBus};
use haul_truck_control::config::Config;
use haul_truck_control::supervisor::{Dashboard, FleetWatcher};
use haul_truck_control::truck_core::log_sink::CsvLogSink;
use haul_truck_control::{spawn_simulated_truck, TruckHandle};

const SIMULATION_DURATION_SECS: u64 = 30;
const TRUCK_START_POSITIONS: &[(u64, f64, f64)] = &[(1, 10.0, 10.0), (2, 80.0, 60.0), (3, 10.0, 60.0)];
const DEMO_ROUTE: &[(f64, f64)] = &[(50.0, 37.5), (90.0, 70.0), (90.0, 5.0)];

fn main() {
    env_logger::init();
    info!("mine fleet: starting {} trucks", TRUCK_START_POSITIONS.len());

    std::fs::create_dir_all("data/logs").expect("create data/logs");

    let config = Config::default();
    let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());

    let mut trucks: Vec<TruckHandle> = Vec::new();
    for &(truck_id, x, y) in TRUCK_START_POSITIONS {
        let log_path = format!("data/logs/truck_{truck_id}.csv");
        let sink = Box::new(CsvLogSink::create(Path::new(&log_path)).expect("create log sink"));
        let (handle, _sim) = spawn_simulated_truck(truck_id, x, y, &config, sink, bus.clone());
        handle.commands.try_send(enable_automatic()).ok();
        handle.routes.try_send(DEMO_ROUTE.to_vec()).ok();
        trucks.push(handle);
    }

    let watcher = Arc::new(FleetWatcher::new(bus.clone()));
    let watcher_stop = Arc::new(AtomicBool::new(false));
    let truck_ids: Vec<u64> = TRUCK_START_POSITIONS.iter().map(|&(id, _, _)| id).collect();
    let watcher_for_thread = watcher.clone();
    let watcher_stop_clone = watcher_stop.clone();
    let watcher_handle = std::thread::Builder::new()
        .name("fleet-watcher".into())
        .spawn(move || watcher_for_thread.run(move || truck_ids.clone(), &watcher_stop_clone, Duration::from_millis(500)))
        .expect("spawn fleet-watcher");

    let dashboard = Arc::new(Dashboard::new(watcher.fleet(), Path::new("data/dashboard").to_path_buf()));
    let dashboard_stop = Arc::new(AtomicBool::new(false));
    info!("dashboard available at http://127.0.0.1:8080");
    let dashboard_handles = dashboard.spawn("127.0.0.1:8080".to_string(), dashboard_stop.clone(), Duration::from_millis(500));

    info!("mine fleet: running for {SIMULATION_DURATION_SECS}s");
    std::thread::sleep(Duration::from_secs(SIMULATION_DURATION_SECS));

    info!("mine fleet: shutting down");
    dashboard_stop.store(true, Ordering::Relaxed);
    watcher_stop.store(true, Ordering::Relaxed);
    for handle in dashboard_handles {
        let _ = handle.join();
    }
    let _ = watcher_handle.join();
    for truck in trucks {
        truck.shutdown();
    }

    info!("mine fleet: stopped");
}

fn enable_automatic() -> haul_truck_control::truck_core::command::Command {
    use haul_truck_control::truck_core::command::{Command, CommandSource, CommandType};
    Command::new(CommandType::EnableAutomatic, None, CommandSource::Local)
}
