//! Fault Monitoring Task, §4.7. Period 500 ms. Edge-detects the three
//! fault conditions and emits events on both rising and falling edges. It
//! does **not** mutate shared-state fault bits — Command Logic is the
//! sole writer, per §9's Open Question resolution. Grounded on
//! `original_source/src/embedded/tasks/fault_monitoring.py`'s
//! `_prev_temp_fault`/`_prev_elec_fault`/`_prev_hydr_fault` booleans.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::truck_core::events::{EventChannel, EventType};
use crate::truck_core::sensor_data::SensorSource;

use super::run_periodic;

pub struct FaultMonitoringTask {
    source: Arc<dyn SensorSource>,
    events: Arc<EventChannel>,
    temperature_threshold: f64,
    prev_temp_fault: bool,
    prev_electrical_fault: bool,
    prev_hydraulic_fault: bool,
}

impl FaultMonitoringTask {
    pub fn new(source: Arc<dyn SensorSource>, events: Arc<EventChannel>, temperature_threshold: f64) -> Self {
        Self {
            source,
            events,
            temperature_threshold,
            prev_temp_fault: false,
            prev_electrical_fault: false,
            prev_hydraulic_fault: false,
        }
    }

    fn edge(&self, events: &EventChannel, prev: bool, now: bool, rising: EventType, kind: &str) -> bool {
        if now && !prev {
            events.emit(rising, None);
            info!("fault-monitoring: {kind} fault raised");
        } else if !now && prev {
            events.emit(EventType::FaultCleared, Some(format!("{{\"type\": \"{kind}\"}}")));
            info!("fault-monitoring: {kind} fault cleared");
        }
        now
    }

    fn tick(&mut self) {
        let raw = self.source.read();
        let temp_fault = raw.temperature > self.temperature_threshold;

        self.prev_temp_fault = self.edge(
            &self.events,
            self.prev_temp_fault,
            temp_fault,
            EventType::TemperatureFault,
            "temperature",
        );
        self.prev_electrical_fault = self.edge(
            &self.events,
            self.prev_electrical_fault,
            raw.electrical_fault,
            EventType::ElectricalFault,
            "electrical",
        );
        self.prev_hydraulic_fault = self.edge(
            &self.events,
            self.prev_hydraulic_fault,
            raw.hydraulic_fault,
            EventType::HydraulicFault,
            "hydraulic",
        );
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("fault-monitoring", period, stop, || self.tick());
    }
}
