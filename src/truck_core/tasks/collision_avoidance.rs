//! Collision Avoidance Task, §4.11. Period 100 ms, automatic mode only.
//! Reactively overrides setpoints based on the closest peer in the
//! forward heading cone. The `cross = sin(angle_to_peer - theta)` steering
//! term is grounded on
//! `original_source/src/embedded/tasks/collision_avoidance.py`; the
//! boundary case (peer dead ahead, `cross == 0`) steers `theta - pi/6`
//! rather than the original's `theta + pi/6`, matching the worked example
//! in the distilled spec's end-to-end scenario 4.

use std::f64::consts::{FRAC_PI_4, FRAC_PI_6};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::truck_core::state::{wrap_to_pi, SharedState};

use super::run_periodic;

pub struct CollisionAvoidanceTask {
    state: Arc<SharedState>,
    safety_distance: f64,
    warning_distance: f64,
    active: bool,
}

impl CollisionAvoidanceTask {
    pub fn new(state: Arc<SharedState>, safety_distance: f64, warning_distance: f64) -> Self {
        Self {
            state,
            safety_distance,
            warning_distance,
            active: false,
        }
    }

    fn in_trajectory(&self, my_x: f64, my_y: f64, my_theta: f64, peer_x: f64, peer_y: f64) -> Option<f64> {
        let d = (peer_x - my_x).hypot(peer_y - my_y);
        let angle_to_peer = (peer_y - my_y).atan2(peer_x - my_x);
        let bearing = wrap_to_pi(angle_to_peer - my_theta);
        if bearing.abs() <= FRAC_PI_4 && d < 2.0 * self.warning_distance {
            Some(d)
        } else {
            None
        }
    }

    fn tick(&mut self) {
        if !self.state.is_automatic() {
            return;
        }
        let snap = self.state.snapshot();
        let peers = self.state.peers();

        let closest = peers
            .iter()
            .filter_map(|p| {
                self.in_trajectory(snap.x, snap.y, snap.theta, p.x, p.y)
                    .map(|d| (d, p.x, p.y))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let Some((d_star, peer_x, peer_y)) = closest else {
            self.active = false;
            return;
        };

        if d_star < self.safety_distance {
            self.state.set_setpoints(Some(0.0), None);
            self.active = true;
            debug!("collision-avoidance: peer at {d_star:.2} m < safety, stopping");
        } else if d_star < self.warning_distance {
            let factor = ((d_star - self.safety_distance) / (self.warning_distance - self.safety_distance)).clamp(0.3, 1.0);
            let scaled_velocity = snap.velocity_setpoint * factor;

            let angle_to_peer = (peer_y - snap.y).atan2(peer_x - snap.x);
            let cross = wrap_to_pi(angle_to_peer - snap.theta).sin();
            let angular = if cross >= 0.0 {
                wrap_to_pi(snap.theta - FRAC_PI_6)
            } else {
                wrap_to_pi(snap.theta + FRAC_PI_6)
            };

            self.state.set_setpoints(Some(scaled_velocity), Some(angular));
            self.active = true;
            debug!("collision-avoidance: peer at {d_star:.2} m < warning, scaling to {scaled_velocity:.2}");
        } else {
            self.active = false;
        }
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("collision-avoidance", period, stop, || self.tick());
    }
}
