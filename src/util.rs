//! Small helpers shared across modules, in the spirit of the teacher's
//! `utils/metrics.rs::now_ns` — a single place to get wall-clock time so
//! every timestamped type agrees on units.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, millisecond resolution, as a float —
/// the unit §3 specifies for Log Entry and Event timestamps.
pub fn unix_time_secs() -> f64 {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    (d.as_millis() as f64) / 1000.0
}
