//! Append-only CSV log sink, owned exclusively by the Data Collector
//! Task per §5. Grounded on the teacher's `SyncManager::start_log_consumer`
//! (a `csv::Writer` fed row-by-row, flushed periodically) and on §6's CSV
//! header.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::LogSinkError;
use crate::truck_core::log_entry::LogEntry;

pub trait LogSink: Send {
    fn append(&mut self, entry: &LogEntry) -> Result<(), LogSinkError>;
}

/// Writes one CSV row per call, flushing every row — the log is meant to
/// survive a crash between ticks, and a 1 Hz task pays that cost easily.
pub struct CsvLogSink {
    writer: csv::Writer<std::fs::File>,
}

impl CsvLogSink {
    pub fn create(path: &Path) -> Result<Self, LogSinkError> {
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        let mut sink = Self { writer };
        if is_new {
            sink.writer.write_record([
                "timestamp",
                "truck_id",
                "status",
                "mode",
                "position_x",
                "position_y",
                "theta",
                "velocity",
                "temperature",
                "electrical_fault",
                "hydraulic_fault",
                "event_description",
            ])?;
            sink.writer.flush()?;
        }
        Ok(sink)
    }
}

impl LogSink for CsvLogSink {
    fn append(&mut self, entry: &LogEntry) -> Result<(), LogSinkError> {
        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
