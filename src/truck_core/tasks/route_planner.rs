//! Route Planner Task, §4.10. Period 500 ms. Consumes full waypoint
//! lists (each queue entry replaces the current route and resets the
//! index) and advances straight-line setpoints toward the current
//! target. Grounded on
//! `original_source/src/embedded/tasks/route_planner.py`: the waypoint
//! advance and the recomputed target/distance happen in the *same*
//! tick, which avoids a one-tick stall exactly at a waypoint boundary —
//! the distilled table's "Else set..." clause is read as applying both
//! to the no-advance case and to the just-advanced case, per the
//! original's `_update_setpoints`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;
use log::info;

use crate::truck_core::events::{EventChannel, EventType};
use crate::truck_core::state::SharedState;

use super::run_periodic;

pub struct RoutePlannerTask {
    state: Arc<SharedState>,
    events: Arc<EventChannel>,
    routes: Receiver<Vec<(f64, f64)>>,
    route: Vec<(f64, f64)>,
    idx: usize,
    waypoint_threshold: f64,
}

impl RoutePlannerTask {
    pub fn new(
        state: Arc<SharedState>,
        events: Arc<EventChannel>,
        routes: Receiver<Vec<(f64, f64)>>,
        waypoint_threshold: f64,
    ) -> Self {
        Self {
            state,
            events,
            routes,
            route: Vec::new(),
            idx: 0,
            waypoint_threshold,
        }
    }

    fn target_setpoints(&self, x: f64, y: f64, tx: f64, ty: f64) -> (f64, f64) {
        let d = (tx - x).hypot(ty - y);
        let velocity = (d * 0.5).clamp(0.5, 5.0);
        let angular = (ty - y).atan2(tx - x);
        (velocity, angular)
    }

    fn tick(&mut self) {
        while let Ok(route) = self.routes.try_recv() {
            self.route = route;
            self.idx = 0;
            self.events.emit(EventType::NewRoute, None);
            info!("route-planner: new route accepted, {} waypoints", self.route.len());
        }

        if !self.state.is_automatic() || self.route.is_empty() {
            return;
        }

        let snap = self.state.snapshot();
        let (tx, ty) = self.route[self.idx];
        let d = (tx - snap.x).hypot(ty - snap.y);

        if d <= self.waypoint_threshold {
            self.idx += 1;
            if self.idx >= self.route.len() {
                self.events.emit(EventType::TargetReached, None);
                self.state.set_setpoints(Some(0.0), None);
                self.state.set_target(None, None);
                self.route.clear();
                info!("route-planner: route complete, target reached");
                return;
            }
            let (tx2, ty2) = self.route[self.idx];
            let (velocity, angular) = self.target_setpoints(snap.x, snap.y, tx2, ty2);
            self.state.set_setpoints(Some(velocity), Some(angular));
            self.state.set_target(Some(tx2), Some(ty2));
        } else {
            let (velocity, angular) = self.target_setpoints(snap.x, snap.y, tx, ty);
            self.state.set_setpoints(Some(velocity), Some(angular));
            self.state.set_target(Some(tx), Some(ty));
        }
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("route-planner", period, stop, || self.tick());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truck_core::state::{Mode, VehicleState};

    fn setup() -> (RoutePlannerTask, Arc<SharedState>, crossbeam::channel::Sender<Vec<(f64, f64)>>) {
        let state = Arc::new(SharedState::new(VehicleState::new(1, 50.0, 37.5), 100.0));
        state.set_mode(Mode::AutomaticRemote);
        let events = Arc::new(EventChannel::new());
        let (tx, rx) = crossbeam::channel::bounded(4);
        let task = RoutePlannerTask::new(state.clone(), events, rx, 1.0);
        (task, state, tx)
    }

    #[test]
    fn waypoint_exactly_at_threshold_is_reached() {
        let (mut task, state, tx) = setup();
        tx.send(vec![(51.0, 37.5)]).unwrap();
        task.tick();
        let snap = state.snapshot();
        assert_eq!(snap.velocity_setpoint, 0.0);
        assert_eq!(snap.target_x, None);
    }

    #[test]
    fn advances_and_recomputes_in_same_tick() {
        let (mut task, state, tx) = setup();
        tx.send(vec![(50.9, 37.5), (60.0, 37.5)]).unwrap();
        task.tick();
        let snap = state.snapshot();
        assert_eq!(snap.target_x, Some(60.0));
        assert!(snap.velocity_setpoint > 0.0);
    }

    #[test]
    fn heading_points_toward_target() {
        let (mut task, state, tx) = setup();
        tx.send(vec![(60.0, 37.5)]).unwrap();
        task.tick();
        let snap = state.snapshot();
        assert!((snap.angular_setpoint - 0.0).abs() < 1e-9);
    }
}
