//! Data Collector Task, §4.12. Period 1 s. Snapshots state, drains one
//! pending event from each of the four operator-visible event types,
//! builds a Log Entry, appends it to the log sink (retrying next tick on
//! failure, per §7), and publishes it to telemetry. Grounded on
//! `original_source/src/embedded/tasks/data_collector.py`'s `_check_events`
//! (checked in MODE_CHANGED, EMERGENCY_STOP, EMERGENCY_RESET,
//! TARGET_REACHED priority order) and on the teacher's "retried, never
//! propagated" error handling for its own CSV exporter.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::error;

use crate::truck_core::events::{EventChannel, EventType};
use crate::truck_core::log_entry::LogEntry;
use crate::truck_core::log_sink::LogSink;
use crate::truck_core::state::SharedState;
use crate::truck_core::telemetry::TelemetryQueue;
use crate::util::unix_time_secs;

use super::run_periodic;

pub struct DataCollectorTask {
    state: Arc<SharedState>,
    events: Arc<EventChannel>,
    sink: Box<dyn LogSink>,
    telemetry: Option<Arc<TelemetryQueue>>,
}

impl DataCollectorTask {
    pub fn new(
        state: Arc<SharedState>,
        events: Arc<EventChannel>,
        sink: Box<dyn LogSink>,
        telemetry: Option<Arc<TelemetryQueue>>,
    ) -> Self {
        Self {
            state,
            events,
            sink,
            telemetry,
        }
    }

    fn describe_event(&self) -> String {
        if self.events.check(EventType::ModeChanged).is_some() {
            return "Mode changed".to_string();
        }
        if self.events.check(EventType::EmergencyStop).is_some() {
            return "Emergency stop".to_string();
        }
        if self.events.check(EventType::EmergencyReset).is_some() {
            return "Emergency reset".to_string();
        }
        if self.events.check(EventType::TargetReached).is_some() {
            return "Target reached".to_string();
        }
        "Status normal".to_string()
    }

    fn tick(&mut self) {
        let snap = self.state.snapshot();
        let entry = LogEntry {
            timestamp: unix_time_secs(),
            truck_id: snap.truck_id,
            status: snap.status,
            mode: snap.mode,
            position_x: snap.x,
            position_y: snap.y,
            theta: snap.theta,
            velocity: snap.velocity,
            temperature: snap.temperature,
            electrical_fault: snap.electrical_fault,
            hydraulic_fault: snap.hydraulic_fault,
            event_description: self.describe_event(),
        };

        if let Err(e) = self.sink.append(&entry) {
            error!("data-collector: log sink write failed, will retry next tick: {e}");
            return;
        }

        if let Some(queue) = &self.telemetry {
            queue.push(entry);
        }
    }

    pub fn run(mut self, stop: &AtomicBool, period: Duration) {
        run_periodic("data-collector", period, stop, || self.tick());
    }
}
