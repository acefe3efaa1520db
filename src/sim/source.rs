//! Glues [`dynamics::VehicleDynamics`] and [`noise::MultiChannelNoise`]
//! into the [`SensorSource`] the core reads from, and drives the physics
//! step itself by sampling the shared-state actuator commands each tick —
//! the "external driver" §6 describes for the actuator sink.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{NoiseConfig, VehicleConfig};
use crate::truck_core::sensor_data::{SensorSampleRaw, SensorSource};
use crate::truck_core::state::SharedState;
use crate::truck_core::tasks::run_periodic;
use crate::util::unix_time_secs;

use super::dynamics::VehicleDynamics;
use super::noise::MultiChannelNoise;

pub struct SimSource {
    dynamics: Mutex<VehicleDynamics>,
    noise: MultiChannelNoise,
    rng: Mutex<StdRng>,
}

impl SimSource {
    pub fn new(x: f64, y: f64, vehicle: VehicleConfig, noise: NoiseConfig) -> Self {
        Self {
            dynamics: Mutex::new(VehicleDynamics::new(x, y, vehicle)),
            noise: MultiChannelNoise::new(&noise),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Advances the physics model by `dt` using the truck's current
    /// commanded actuators, then mirrors the (noiseless) pose/velocity
    /// back into shared state — the single writer of the pose field
    /// group, analogous to Sensor Processing being the sole writer of
    /// the filtered-sample buffer.
    pub fn step(&self, state: &SharedState, dt: f64) {
        let snap = state.snapshot();
        let mut d = self.dynamics.lock();
        d.update(snap.acceleration_cmd, snap.steering_cmd, dt);
        state.update_pose(d.x, d.y, d.theta, d.velocity);
        state.set_temperature(d.temperature());
    }

    pub fn inject_electrical_fault(&self, active: bool) {
        self.dynamics.lock().inject_fault(Some(active), None, None);
    }

    pub fn inject_hydraulic_fault(&self, active: bool) {
        self.dynamics.lock().inject_fault(None, Some(active), None);
    }

    pub fn inject_temperature(&self, celsius: f64) {
        self.dynamics.lock().inject_fault(None, None, Some(celsius));
    }

    pub fn run(self: Arc<Self>, state: Arc<SharedState>, stop: &AtomicBool, period: Duration) {
        let dt = period.as_secs_f64();
        run_periodic("simulation", period, stop, || self.step(&state, dt));
    }
}

impl SensorSource for SimSource {
    fn read(&self) -> SensorSampleRaw {
        let d = self.dynamics.lock();
        let mut rng = self.rng.lock();
        SensorSampleRaw {
            x: d.x + self.noise.position.sample(&mut *rng),
            y: d.y + self.noise.position.sample(&mut *rng),
            theta: d.theta + self.noise.theta.sample(&mut *rng),
            velocity: d.velocity + self.noise.velocity.sample(&mut *rng),
            temperature: d.temperature() + self.noise.temperature.sample(&mut *rng),
            electrical_fault: d.electrical_fault(),
            hydraulic_fault: d.hydraulic_fault(),
            timestamp: unix_time_secs(),
        }
    }
}
