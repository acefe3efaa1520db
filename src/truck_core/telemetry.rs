//! Bounded telemetry hand-off between Data Collector and the bus bridge,
//! grounded on `original_source/src/embedded/tasks/data_collector.py`'s
//! overflow policy: a full queue evicts the *oldest* pending entry rather
//! than rejecting the new one, so a supervisor that falls behind catches
//! up on fresh state instead of working through a backlog of stale rows.
//! Shaped like [`super::buffer::CircularBuffer`] (one mutex, push evicts
//! front) but over `LogEntry` and with a draining read instead of a
//! latest/last-n one, since the bus bridge wants everything since its
//! last poll, not a rolling window.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::log_entry::LogEntry;

pub struct TelemetryQueue {
    capacity: usize,
    inner: Mutex<VecDeque<LogEntry>>,
}

impl TelemetryQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        let mut q = self.inner.lock();
        if q.len() == self.capacity {
            q.pop_front();
        }
        q.push_back(entry);
    }

    /// Removes and returns everything queued since the last drain, oldest
    /// first.
    pub fn drain(&self) -> Vec<LogEntry> {
        self.inner.lock().drain(..).collect()
    }
}
