//! Discrete PID with clamp-strategy anti-windup and bumpless-transfer
//! initialization, per §4.5. Hand-rolled rather than built on the
//! teacher's `pidgeon::PidController`: bumpless transfer needs direct
//! read/write access to the integral accumulator at `enable()` time,
//! which `pidgeon`'s builder-config API does not expose. `pidgeon` and
//! `pid` are accordingly dropped from the dependency set (see DESIGN.md).

use super::state::wrap_to_pi;

#[derive(Debug, Clone)]
pub struct Pid {
    kp: f64,
    ki: f64,
    kd: f64,
    wrap_angle: bool,
    integral: f64,
    e_prev: f64,
    active: bool,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64, wrap_angle: bool) -> Self {
        Self {
            kp,
            ki,
            kd,
            wrap_angle,
            integral: 0.0,
            e_prev: 0.0,
            active: false,
        }
    }

    /// Initializes for bumpless transfer: picks the integral term so that
    /// the *next* `compute` call, given the same `measurement` and a
    /// setpoint equal to it, reproduces `previous_command`. The caller
    /// (Navigation Control) is responsible for mirroring setpoints to
    /// measurements while manual, per §4.9.5, which is what makes the
    /// first error zero and this bias exact.
    pub fn enable(&mut self, previous_command: f64) {
        self.integral = if self.ki != 0.0 { previous_command / self.ki } else { 0.0 };
        self.e_prev = 0.0;
        self.active = true;
    }

    /// Freezes output at zero; `compute` is a no-op until re-enabled.
    pub fn disable(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `u = Kp*e + Ki*integral(e*dt) + Kd*(e - e_prev)/dt`, saturated to
    /// `[-1, 1]`, with clamp-strategy anti-windup: the integral is not
    /// advanced on a step whose unsaturated output would overflow the
    /// clamp in the same direction as the error.
    pub fn compute(&mut self, measurement: f64, setpoint: f64, dt: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        let mut e = setpoint - measurement;
        if self.wrap_angle {
            e = wrap_to_pi(e);
        }
        let derivative = if dt > 0.0 { (e - self.e_prev) / dt } else { 0.0 };
        let tentative_integral = self.integral + e * dt;
        let unsaturated = self.kp * e + self.ki * tentative_integral + self.kd * derivative;
        let output = unsaturated.clamp(-1.0, 1.0);

        let winds_up = (unsaturated > 1.0 && e > 0.0) || (unsaturated < -1.0 && e < 0.0);
        if !winds_up {
            self.integral = tentative_integral;
        }
        self.e_prev = e;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumpless_transfer_reproduces_previous_command() {
        let mut pid = Pid::new(0.5, 0.1, 0.05, false);
        pid.enable(0.4);
        let output = pid.compute(2.0, 2.0, 0.05);
        assert!((output - 0.4).abs() < 0.001);
    }

    #[test]
    fn disabled_compute_is_zero() {
        let mut pid = Pid::new(1.0, 0.1, 0.1, false);
        assert_eq!(pid.compute(0.0, 5.0, 0.05), 0.0);
    }

    #[test]
    fn output_is_saturated() {
        let mut pid = Pid::new(10.0, 0.0, 0.0, false);
        pid.enable(0.0);
        let output = pid.compute(0.0, 100.0, 0.05);
        assert_eq!(output, 1.0);
    }

    #[test]
    fn anti_windup_stops_integral_growth_while_saturated() {
        let mut pid = Pid::new(0.1, 1.0, 0.0, false);
        pid.enable(0.0);
        for _ in 0..50 {
            pid.compute(0.0, 100.0, 0.05);
        }
        let integral_after_saturation = pid.integral;
        for _ in 0..50 {
            pid.compute(0.0, 100.0, 0.05);
        }
        assert_eq!(pid.integral, integral_after_saturation);
    }

    #[test]
    fn heading_error_wraps_shortest_path() {
        let mut pid = Pid::new(1.0, 0.0, 0.0, true);
        pid.enable(0.0);
        let eps = 0.01;
        let output = pid.compute(-std::f64::consts::PI + eps, std::f64::consts::PI - eps, 0.05);
        // error should be 2*eps, not (2*PI - 2*eps); kp=1 so output ~ 2*eps before clamp.
        assert!((output - 2.0 * eps).abs() < 1e-6);
    }
}
