//! Typed errors for the parts of the system that need one: command
//! rejection reasons (inspectable by callers/tests, always also logged
//! per spec's "rejected with a descriptive log entry"), config loading,
//! and the log sink / bus transport's transient I/O.

use thiserror::Error;

/// Reasons the Command Logic state machine rejects a command.
/// The state is left unchanged in every case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command rejected: automatic mode unavailable while a fault is active")]
    FaultActive,
    #[error("command rejected: unknown command type {0:?}")]
    UnknownCommand(crate::truck_core::command::CommandType),
    #[error("command rejected: remote commands are ignored while status is {0:?}")]
    RemoteWhileFaulted(crate::truck_core::state::Status),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Transient failure writing a log entry. Per spec: retried next tick,
/// never propagated out of the task body.
#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("log sink I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv serialization error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("topic {0} has no subscribers")]
    NoSubscribers(String),
}
