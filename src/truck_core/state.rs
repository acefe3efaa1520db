//! Shared Vehicle State: a single mutexed record with coarse-grained
//! accessors, grounded on `original_source/src/embedded/sync/shared_state.py`
//! and, for the locking style, on the teacher's `SyncManager` (a single
//! `Arc<parking_lot::Mutex<...>>` held only for the duration of one
//! field-group update, never across a suspension point).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Peer entries older than this are stale and evicted lazily on read.
pub const PEER_STALE_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    ManualLocal,
    AutomaticRemote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Stopped,
    Running,
    Fault,
    Emergency,
}

/// One peer truck's last-known pose, with the instant it was recorded.
/// `last_update` is process-local (`Instant`), never serialized; bus
/// messages carry their own epoch timestamp for that purpose.
#[derive(Debug, Clone, Copy)]
pub struct PeerInfo {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub last_update: Instant,
}

/// A snapshot of a peer's pose, returned from [`SharedState::peers`] —
/// has no meaningful `Instant` to share across a process boundary, so it
/// carries an age instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeerSnapshot {
    pub truck_id: u64,
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub age_secs: f64,
}

/// The single logical record per truck. Cheap to clone: used as the
/// by-value result of [`SharedState::snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleState {
    pub truck_id: u64,

    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub velocity: f64,

    pub acceleration_cmd: f64,
    pub steering_cmd: f64,

    pub velocity_setpoint: f64,
    pub angular_setpoint: f64,
    pub target_x: Option<f64>,
    pub target_y: Option<f64>,

    pub mode: Mode,
    pub status: Status,

    pub electrical_fault: bool,
    pub hydraulic_fault: bool,
    pub emergency_stop: bool,
    pub temperature: f64,

    #[serde(skip)]
    pub peers: HashMap<u64, PeerInfo>,
}

impl VehicleState {
    pub fn new(truck_id: u64, x: f64, y: f64) -> Self {
        Self {
            truck_id,
            x,
            y,
            theta: 0.0,
            velocity: 0.0,
            acceleration_cmd: 0.0,
            steering_cmd: 0.0,
            velocity_setpoint: 0.0,
            angular_setpoint: 0.0,
            target_x: None,
            target_y: None,
            mode: Mode::ManualLocal,
            status: Status::Stopped,
            electrical_fault: false,
            hydraulic_fault: false,
            emergency_stop: false,
            temperature: 20.0,
            peers: HashMap::new(),
        }
    }

    pub fn has_fault(&self, temperature_threshold: f64) -> bool {
        self.electrical_fault
            || self.hydraulic_fault
            || self.temperature > temperature_threshold
            || self.emergency_stop
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self.mode, Mode::AutomaticRemote)
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.mode, Mode::ManualLocal)
    }
}

/// Thread-safe container over [`VehicleState`]. Every accessor holds the
/// lock only for the duration of its own field-group update; nothing ever
/// suspends while holding it.
pub struct SharedState {
    inner: Mutex<VehicleState>,
    temperature_threshold: f64,
}

impl SharedState {
    pub fn new(initial: VehicleState, temperature_threshold: f64) -> Self {
        Self {
            inner: Mutex::new(initial),
            temperature_threshold,
        }
    }

    pub fn snapshot(&self) -> VehicleState {
        self.inner.lock().clone()
    }

    pub fn update_pose(&self, x: f64, y: f64, theta: f64, velocity: f64) {
        let mut s = self.inner.lock();
        s.x = x;
        s.y = y;
        s.theta = wrap_to_pi(theta);
        s.velocity = velocity;
    }

    pub fn update_actuators(&self, acceleration: f64, steering: f64) {
        let mut s = self.inner.lock();
        s.acceleration_cmd = acceleration.clamp(-1.0, 1.0);
        s.steering_cmd = steering.clamp(-1.0, 1.0);
    }

    pub fn set_mode(&self, mode: Mode) {
        self.inner.lock().mode = mode;
    }

    pub fn set_status(&self, status: Status) {
        self.inner.lock().status = status;
    }

    pub fn set_setpoints(&self, velocity: Option<f64>, angular: Option<f64>) {
        let mut s = self.inner.lock();
        if let Some(v) = velocity {
            s.velocity_setpoint = v;
        }
        if let Some(a) = angular {
            s.angular_setpoint = wrap_to_pi(a);
        }
    }

    pub fn set_target(&self, x: Option<f64>, y: Option<f64>) {
        let mut s = self.inner.lock();
        s.target_x = x;
        s.target_y = y;
    }

    pub fn set_faults(&self, electrical: Option<bool>, hydraulic: Option<bool>, emergency: Option<bool>) {
        let mut s = self.inner.lock();
        if let Some(e) = electrical {
            s.electrical_fault = e;
        }
        if let Some(h) = hydraulic {
            s.hydraulic_fault = h;
        }
        if let Some(em) = emergency {
            s.emergency_stop = em;
        }
        s.status = if s.emergency_stop {
            Status::Emergency
        } else if s.status == Status::Emergency {
            Status::Stopped
        } else {
            s.status
        };
    }

    pub fn set_temperature(&self, temperature: f64) {
        self.inner.lock().temperature = temperature;
    }

    pub fn is_automatic(&self) -> bool {
        self.inner.lock().is_automatic()
    }

    pub fn is_manual(&self) -> bool {
        self.inner.lock().is_manual()
    }

    pub fn has_fault(&self) -> bool {
        self.inner.lock().has_fault(self.temperature_threshold)
    }

    pub fn update_peer(&self, id: u64, x: f64, y: f64, theta: f64) {
        self.inner.lock().peers.insert(
            id,
            PeerInfo {
                x,
                y,
                theta,
                last_update: Instant::now(),
            },
        );
    }

    /// Evicts stale entries (> [`PEER_STALE_AFTER`] old), then returns a
    /// snapshot of what remains. Lazy eviction, as in the reference
    /// implementation: the cost is O(peers) per read, negligible at
    /// realistic fleet sizes.
    pub fn peers(&self) -> Vec<PeerSnapshot> {
        let mut s = self.inner.lock();
        let now = Instant::now();
        s.peers.retain(|_, p| now.duration_since(p.last_update) <= PEER_STALE_AFTER);
        s.peers
            .iter()
            .map(|(&truck_id, p)| PeerSnapshot {
                truck_id,
                x: p.x,
                y: p.y,
                theta: p.theta,
                age_secs: now.duration_since(p.last_update).as_secs_f64(),
            })
            .collect()
    }

    pub fn remove_peer(&self, id: u64) {
        self.inner.lock().peers.remove(&id);
    }
}

/// Wraps an angle to `[-pi, pi]`.
pub fn wrap_to_pi(theta: f64) -> f64 {
    theta.sin().atan2(theta.cos())
}
