//! Wire payload shapes for the bus topics in §6. `CommandMessage` maps
//! directly onto [`crate::truck_core::command::Command`] minus the
//! locally-assigned source/timestamp; the rest mirror the JSON shapes
//! spelled out in §6 verbatim.

use serde::{Deserialize, Serialize};

use crate::truck_core::command::CommandType;
use crate::truck_core::state::VehicleState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    pub command_type: CommandType,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetpointMessage {
    pub velocity: f64,
    pub angular: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMessage {
    pub waypoints: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionMessage {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub velocity: f64,
}

impl From<&VehicleState> for PositionMessage {
    fn from(s: &VehicleState) -> Self {
        Self {
            x: s.x,
            y: s.y,
            theta: s.theta,
            velocity: s.velocity,
        }
    }
}

/// Full state snapshot published on `mine/truck/{id}/state`.
pub type StateMessage = VehicleState;

pub fn topic_state(truck_id: u64) -> String {
    format!("mine/truck/{truck_id}/state")
}

pub fn topic_position(truck_id: u64) -> String {
    format!("mine/truck/{truck_id}/position")
}

pub fn topic_command(truck_id: u64) -> String {
    format!("mine/truck/{truck_id}/command")
}

pub fn topic_setpoint(truck_id: u64) -> String {
    format!("mine/truck/{truck_id}/setpoint")
}

pub fn topic_route(truck_id: u64) -> String {
    format!("mine/truck/{truck_id}/route")
}
