//! Sensor sample shapes and the reader interface external sensor sources
//! implement, per §3 and §6. Grounded on the teacher's `SensorData` in
//! `component_a/sensor.rs` for the struct shape, and on
//! `original_source/src/embedded/tasks/sensor_processing.py` for which
//! channels are filtered vs. passed through.

use serde::{Deserialize, Serialize};

/// As read from the sensor source: numeric channels may carry noise,
/// fault booleans are the raw hardware reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorSampleRaw {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub velocity: f64,
    pub temperature: f64,
    pub electrical_fault: bool,
    pub hydraulic_fault: bool,
    pub timestamp: f64,
}

/// Identical shape to the raw sample, but numeric channels are the
/// output of independent order-M moving averages; fault booleans pass
/// through unfiltered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilteredSample {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub velocity: f64,
    pub temperature: f64,
    pub electrical_fault: bool,
    pub hydraulic_fault: bool,
    pub timestamp: f64,
}

/// A sensor source: any real or simulated reader. Must be non-blocking
/// and return the latest sample, per §6.
pub trait SensorSource: Send + Sync {
    fn read(&self) -> SensorSampleRaw;
}

/// The actuator sink: an external driver samples `acceleration`/`steering`
/// at or above the control rate. Modeled as a trait so the simulator and
/// a future real actuator driver share the same seam.
pub trait ActuatorSink: Send {
    fn write(&self, acceleration: f64, steering: f64);
}
