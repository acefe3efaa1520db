//! Navigation Control Task, §4.9. Period 50 ms. Runs the velocity and
//! heading PIDs, manages bumpless transfer across the mode edge, and is
//! the writer of actuators (automatic) / setpoints (manual, mirroring
//! measurement). Grounded on
//! `original_source/src/embedded/tasks/navigation_control.py`'s
//! `_prev_mode_automatic` edge flag and `_enable_controllers`/
//! `_disable_controllers` pair, and on the teacher's elevated-priority
//! actuator threads (`multi_actuator.rs`) for why this task alone is
//! spawned at `ThreadPriority::Max`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::truck_core::events::{EventChannel, EventType};
use crate::truck_core::pid::Pid;
use crate::truck_core::state::{Mode, SharedState, Status};

use super::run_periodic;

pub struct NavigationControlTask {
    state: Arc<SharedState>,
    events: Arc<EventChannel>,
    velocity_pid: Pid,
    heading_pid: Pid,
    dt: f64,
    prev_mode_automatic: bool,
}

impl NavigationControlTask {
    pub fn new(state: Arc<SharedState>, events: Arc<EventChannel>, velocity_pid: Pid, heading_pid: Pid, dt: f64) -> Self {
        Self {
            state,
            events,
            velocity_pid,
            heading_pid,
            dt,
            prev_mode_automatic: false,
        }
    }

    fn tick(&mut self) {
        // Consume a pending emergency-stop event immediately, before the
        // snapshot below, covering the race where the event fires mid-tick.
        if self.events.check(EventType::EmergencyStop).is_some() {
            self.state.update_actuators(0.0, 0.0);
        }

        let snap = self.state.snapshot();
        let now_automatic = snap.is_automatic();

        if now_automatic && !self.prev_mode_automatic {
            self.velocity_pid.enable(snap.acceleration_cmd);
            self.heading_pid.enable(snap.steering_cmd);
            debug!("navigation-control: manual->automatic, bumpless transfer armed");
        } else if !now_automatic && self.prev_mode_automatic {
            self.velocity_pid.disable();
            self.heading_pid.disable();
            debug!("navigation-control: automatic->manual, controllers disabled");
        }
        self.prev_mode_automatic = now_automatic;

        if matches!(snap.status, Status::Emergency) || snap.emergency_stop || self.state.has_fault() {
            self.state.update_actuators(0.0, 0.0);
            return;
        }

        match snap.mode {
            Mode::AutomaticRemote => {
                let accel = self.velocity_pid.compute(snap.velocity, snap.velocity_setpoint, self.dt);
                let steer = self.heading_pid.compute(snap.theta, snap.angular_setpoint, self.dt);
                self.state.update_actuators(accel, steer);
            }
            Mode::ManualLocal => {
                self.state.set_setpoints(Some(snap.velocity), Some(snap.theta));
            }
        }
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("navigation-control", period, stop, || self.tick());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truck_core::state::VehicleState;

    fn setup() -> (NavigationControlTask, Arc<SharedState>) {
        let state = Arc::new(SharedState::new(VehicleState::new(1, 0.0, 0.0), 100.0));
        let events = Arc::new(EventChannel::new());
        let task = NavigationControlTask::new(
            state.clone(),
            events,
            Pid::new(0.5, 0.1, 0.05, false),
            Pid::new(1.0, 0.05, 0.2, true),
            0.05,
        );
        (task, state)
    }

    #[test]
    fn manual_mode_mirrors_measurement_into_setpoints() {
        let (mut task, state) = setup();
        state.update_pose(0.0, 0.0, 0.3, 1.5);
        task.tick();
        let snap = state.snapshot();
        assert_eq!(snap.velocity_setpoint, 1.5);
        assert_eq!(snap.angular_setpoint, 0.3);
    }

    #[test]
    fn emergency_forces_actuators_to_zero() {
        let (mut task, state) = setup();
        state.update_actuators(0.8, -0.4);
        state.set_faults(None, None, Some(true));
        task.tick();
        let snap = state.snapshot();
        assert_eq!(snap.acceleration_cmd, 0.0);
        assert_eq!(snap.steering_cmd, 0.0);
    }

    #[test]
    fn fault_in_automatic_mode_zeroes_actuators_without_emergency() {
        let (mut task, state) = setup();
        state.set_mode(Mode::AutomaticRemote);
        state.update_actuators(0.8, -0.4);
        state.set_setpoints(Some(5.0), Some(0.0));
        state.set_temperature(150.0);
        task.tick();
        let snap = state.snapshot();
        assert_eq!(snap.acceleration_cmd, 0.0);
        assert_eq!(snap.steering_cmd, 0.0);
    }

    #[test]
    fn bumpless_transfer_on_mode_edge() {
        let (mut task, state) = setup();
        state.update_actuators(0.4, 0.0);
        state.update_pose(0.0, 0.0, 0.0, 2.0);
        state.set_setpoints(Some(2.0), Some(0.0));
        state.set_mode(Mode::AutomaticRemote);
        task.tick();
        let snap = state.snapshot();
        assert!((snap.acceleration_cmd - 0.4).abs() < 0.001);
    }
}
