//! Log Entry shape and CSV header, per §3 and §6. Grounded on the
//! teacher's `CsvRow` (`utils/metrics.rs`): a plain `#[derive(Serialize)]`
//! struct fed straight to `csv::Writer`, field order matching the header.

use serde::{Deserialize, Serialize};

use super::state::{Mode, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: f64,
    pub truck_id: u64,
    pub status: Status,
    pub mode: Mode,
    pub position_x: f64,
    pub position_y: f64,
    pub theta: f64,
    pub velocity: f64,
    pub temperature: f64,
    pub electrical_fault: bool,
    pub hydraulic_fault: bool,
    pub event_description: String,
}
