//! Command queue entries, per §4.8. Grounded on
//! `original_source/src/embedded/tasks/local_interface.py`'s command
//! vocabulary and `command_type` values, and on the teacher's
//! `try_send`-drop-on-full queue discipline (`component_a/transmitter.rs`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    EnableAutomatic,
    DisableAutomatic,
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    Stop,
    EmergencyStop,
    ResetEmergency,
    ResetFault,
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Command {
    pub command_type: CommandType,
    pub value: Option<f64>,
    pub timestamp: f64,
    pub source: CommandSource,
}

impl Command {
    pub fn new(command_type: CommandType, value: Option<f64>, source: CommandSource) -> Self {
        Self {
            command_type,
            value,
            timestamp: crate::util::unix_time_secs(),
            source,
        }
    }
}
