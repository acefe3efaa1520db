//! First-order truck dynamics, ported verbatim from
//! `original_source/src/simulation/vehicle_dynamics.py::VehicleDynamics`.
//! Commands are clamped to `[-1, 1]`; velocity and angular velocity chase
//! their commanded targets with time constants `tau_velocity`/`tau_angular`;
//! heading is re-wrapped to `[-pi, pi]` every step via `atan2(sin, cos)`.

use crate::config::VehicleConfig;
use crate::truck_core::state::wrap_to_pi;

#[derive(Debug, Clone, Copy)]
pub struct VehicleDynamics {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub velocity: f64,
    pub angular_velocity: f64,
    electrical_fault: bool,
    hydraulic_fault: bool,
    temperature: f64,
    config: VehicleConfig,
}

impl VehicleDynamics {
    pub fn new(x: f64, y: f64, config: VehicleConfig) -> Self {
        Self {
            x,
            y,
            theta: 0.0,
            velocity: 0.0,
            angular_velocity: 0.0,
            electrical_fault: false,
            hydraulic_fault: false,
            temperature: 20.0,
            config,
        }
    }

    /// Advances the model by `dt` seconds given the current actuator
    /// commands (each clamped to `[-1, 1]` before use).
    pub fn update(&mut self, acceleration_cmd: f64, steering_cmd: f64, dt: f64) {
        let accel = acceleration_cmd.clamp(-1.0, 1.0);
        let steer = steering_cmd.clamp(-1.0, 1.0);

        let target_velocity = accel * self.config.max_velocity;
        let target_angular = steer * self.config.max_angular_velocity;

        self.velocity += (target_velocity - self.velocity) * dt / self.config.tau_velocity;
        self.angular_velocity += (target_angular - self.angular_velocity) * dt / self.config.tau_angular;

        self.x += self.velocity * self.theta.cos() * dt;
        self.y += self.velocity * self.theta.sin() * dt;
        self.theta = wrap_to_pi(self.theta + self.angular_velocity * dt);
    }

    pub fn set_position(&mut self, x: f64, y: f64, theta: f64) {
        self.x = x;
        self.y = y;
        self.theta = wrap_to_pi(theta);
    }

    pub fn inject_fault(&mut self, electrical: Option<bool>, hydraulic: Option<bool>, temperature: Option<f64>) {
        if let Some(e) = electrical {
            self.electrical_fault = e;
        }
        if let Some(h) = hydraulic {
            self.hydraulic_fault = h;
        }
        if let Some(t) = temperature {
            self.temperature = t;
        }
    }

    pub fn electrical_fault(&self) -> bool {
        self.electrical_fault
    }

    pub fn hydraulic_fault(&self) -> bool {
        self.hydraulic_fault
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Zeroes velocity and angular velocity in place, leaving pose intact.
    pub fn emergency_stop(&mut self) {
        self.velocity = 0.0;
        self.angular_velocity = 0.0;
    }

    pub fn reset(&mut self, x: f64, y: f64) {
        *self = Self::new(x, y, self.config);
    }
}
