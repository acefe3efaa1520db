//! The embedded on-truck controller: shared state, event channel, circular
//! buffer, filter, PID controllers, and the seven periodic tasks that make
//! up the core control system.

pub mod buffer;
pub mod command;
pub mod events;
pub mod filter;
pub mod log_entry;
pub mod log_sink;
pub mod pid;
pub mod sensor_data;
pub mod state;
pub mod tasks;
pub mod telemetry;
