//! Central configuration: every tunable named in the external-interfaces
//! section, with the same defaults the Python reference ships in
//! `config/settings.py`. Loadable from TOML; `Config::default()` reproduces
//! the defaults so a truck boots with no config file present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub max_velocity: f64,
    pub max_angular_velocity: f64,
    pub tau_velocity: f64,
    pub tau_angular: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_velocity: 10.0,
            max_angular_velocity: 1.0,
            tau_velocity: 0.5,
            tau_angular: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub position: f64,
    pub theta: f64,
    pub velocity: f64,
    pub temperature: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            position: 0.05,
            theta: 0.02,
            velocity: 0.1,
            temperature: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Periods {
    pub simulation_s: f64,
    pub sensor_processing_s: f64,
    pub control_s: f64,
    pub command_logic_s: f64,
    pub fault_monitoring_s: f64,
    pub data_collection_s: f64,
    pub route_planning_s: f64,
    pub collision_avoidance_s: f64,
    pub interface_update_s: f64,
}

impl Default for Periods {
    fn default() -> Self {
        Self {
            simulation_s: 0.05,
            sensor_processing_s: 0.1,
            control_s: 0.05,
            command_logic_s: 0.1,
            fault_monitoring_s: 0.5,
            data_collection_s: 1.0,
            route_planning_s: 0.5,
            collision_avoidance_s: 0.1,
            interface_update_s: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvoidanceConfig {
    pub safety_distance: f64,
    pub warning_distance: f64,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            safety_distance: 5.0,
            warning_distance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub vehicle: VehicleConfig,
    pub filter_order: usize,
    pub pid_velocity: PidGains,
    pub pid_angular: PidGains,
    pub noise: NoiseConfig,
    pub temperature_threshold: f64,
    pub periods: Periods,
    pub buffer_size: usize,
    pub waypoint_threshold: f64,
    pub avoidance: AvoidanceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            filter_order: 5,
            pid_velocity: PidGains { kp: 0.5, ki: 0.1, kd: 0.05 },
            pid_angular: PidGains { kp: 1.0, ki: 0.05, kd: 0.2 },
            noise: NoiseConfig::default(),
            temperature_threshold: 100.0,
            periods: Periods::default(),
            buffer_size: 100,
            waypoint_threshold: 1.0,
            avoidance: AvoidanceConfig::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults for anything absent.
    pub fn load(path: &std::path::Path) -> Result<Self, crate::error::ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg = toml::from_str(&text)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.vehicle.max_velocity, 10.0);
        assert_eq!(cfg.filter_order, 5);
        assert_eq!(cfg.pid_velocity.kp, 0.5);
        assert_eq!(cfg.pid_angular.kd, 0.2);
        assert_eq!(cfg.temperature_threshold, 100.0);
        assert_eq!(cfg.buffer_size, 100);
        assert_eq!(cfg.waypoint_threshold, 1.0);
        assert_eq!(cfg.avoidance.safety_distance, 5.0);
        assert_eq!(cfg.avoidance.warning_distance, 10.0);
    }
}
