//! Fleet-wide state cache the dashboard renders from. Subscribes to
//! `mine/truck/+/state` and `mine/truck/+/position` — since the
//! in-process router has no real wildcard matching, "subscribing to a
//! wildcard" means polling [`BusTransport::subscribe_bytes`] for every
//! topic the router currently knows about, as SPEC_FULL.md's supervisor
//! section describes. Grounded on the teacher's `advanced/dashboard.rs`
//! render loop, which snapshots shared metrics under a lock each tick
//! rather than reacting per-sample; here a `DashMap` keyed by truck id
//! plays that role.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use log::info;

use crate::bus::messages::PositionMessage;
use crate::bus::transport::decode;
use crate::bus::BusTransport;
use crate::truck_core::state::VehicleState;
use crate::truck_core::tasks::run_periodic;

/// One truck's last-known state as seen by the supervisor.
#[derive(Debug, Clone)]
pub struct TruckSnapshot {
    pub truck_id: u64,
    pub position: PositionMessage,
    pub state: Option<VehicleState>,
}

/// Fleet-wide cache, refreshed by polling the bus's known topics.
/// Cheap to clone (`Arc` internally) so the dashboard's HTTP handler
/// threads can each hold a copy.
#[derive(Clone)]
pub struct FleetState {
    trucks: Arc<DashMap<u64, TruckSnapshot>>,
}

impl FleetState {
    pub fn new() -> Self {
        Self { trucks: Arc::new(DashMap::new()) }
    }

    pub fn snapshot(&self) -> Vec<TruckSnapshot> {
        self.trucks.iter().map(|e| e.value().clone()).collect()
    }

    fn update_position(&self, truck_id: u64, position: PositionMessage) {
        self.trucks
            .entry(truck_id)
            .and_modify(|t| t.position = position)
            .or_insert(TruckSnapshot { truck_id, position, state: None });
    }

    fn update_state(&self, truck_id: u64, state: VehicleState) {
        self.trucks
            .entry(truck_id)
            .and_modify(|t| t.state = Some(state.clone()))
            .or_insert(TruckSnapshot {
                truck_id,
                position: PositionMessage { x: state.x, y: state.y, theta: state.theta, velocity: state.velocity },
                state: Some(state),
            });
    }
}

impl Default for FleetState {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers known truck ids so their topics get subscribed to. A real
/// broker's wildcard subscription needs no such registration; the
/// in-process router does, since topics are created lazily on first
/// publish/subscribe.
pub struct FleetWatcher {
    fleet: FleetState,
    bus: Arc<dyn BusTransport>,
    known: std::sync::Mutex<HashSet<u64>>,
}

impl FleetWatcher {
    pub fn new(bus: Arc<dyn BusTransport>) -> Self {
        Self { fleet: FleetState::new(), bus, known: std::sync::Mutex::new(HashSet::new()) }
    }

    pub fn fleet(&self) -> FleetState {
        self.fleet.clone()
    }

    pub fn watch(&self, truck_id: u64) {
        let mut known = self.known.lock().expect("fleet watcher mutex poisoned");
        if known.insert(truck_id) {
            info!("supervisor: watching truck {truck_id}");
            let position_rx = self.bus.subscribe_bytes(&crate::bus::messages::topic_position(truck_id));
            let state_rx = self.bus.subscribe_bytes(&crate::bus::messages::topic_state(truck_id));
            let fleet = self.fleet.clone();
            std::thread::Builder::new()
                .name(format!("fleet-watch-position-{truck_id}"))
                .spawn(move || {
                    while let Ok(bytes) = position_rx.recv() {
                        if let Ok(msg) = decode::<PositionMessage>(&bytes) {
                            fleet.update_position(truck_id, msg);
                        }
                    }
                })
                .expect("spawn fleet-watch-position");
            let fleet = self.fleet.clone();
            std::thread::Builder::new()
                .name(format!("fleet-watch-state-{truck_id}"))
                .spawn(move || {
                    while let Ok(bytes) = state_rx.recv() {
                        if let Ok(msg) = decode::<VehicleState>(&bytes) {
                            fleet.update_state(truck_id, msg);
                        }
                    }
                })
                .expect("spawn fleet-watch-state");
        }
    }

    /// Keeps `watch` current with a fleet whose membership can grow at
    /// runtime, polling every `period`. No-op once every truck id in
    /// `truck_ids()` has already been registered.
    pub fn run(self: Arc<Self>, truck_ids: impl Fn() -> Vec<u64> + Send + 'static, stop: &AtomicBool, period: Duration) {
        run_periodic("fleet-watcher", period, stop, || {
            for id in truck_ids() {
                self.watch(id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InProcessBus;

    #[test]
    fn watcher_picks_up_published_position() {
        let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
        let watcher = Arc::new(FleetWatcher::new(bus.clone()));
        watcher.watch(1);
        bus.publish(&crate::bus::messages::topic_position(1), &PositionMessage { x: 5.0, y: 6.0, theta: 0.1, velocity: 2.0 })
            .unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let snap = watcher.fleet().snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].truck_id, 1);
        assert_eq!(snap[0].position.x, 5.0);
    }

    #[test]
    fn watching_the_same_truck_twice_does_not_duplicate_subscriptions() {
        let bus: Arc<dyn BusTransport> = Arc::new(InProcessBus::new());
        let watcher = FleetWatcher::new(bus.clone());
        watcher.watch(2);
        watcher.watch(2);
        bus.publish(&crate::bus::messages::topic_position(2), &PositionMessage { x: 1.0, y: 1.0, theta: 0.0, velocity: 0.0 })
            .unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(watcher.fleet().snapshot().len(), 1);
    }
}
