//! Broadcast event channel: one FIFO queue per [`EventType`], guarded by a
//! single mutex and condition variable, grounded on
//! `original_source/src/embedded/sync/event_manager.py`'s `EventManager`
//! (a `threading.Condition` wrapping a `dict[EventType, deque]`). Waiters
//! re-check every queue on each wakeup, which also covers spurious
//! wakeups and shutdown.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TemperatureFault,
    ElectricalFault,
    HydraulicFault,
    FaultCleared,
    ModeChanged,
    EmergencyStop,
    EmergencyReset,
    TargetReached,
    Shutdown,
    NewRoute,
}

/// Event payload. `data` carries the small, event-specific JSON-ish
/// detail (e.g. `FaultCleared`'s `{"type": "..."}`); most event types
/// carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub data: Option<String>,
    pub timestamp: f64,
}

impl Event {
    pub fn new(event_type: EventType, data: Option<String>) -> Self {
        Self {
            event_type,
            data,
            timestamp: crate::util::unix_time_secs(),
        }
    }
}

struct Inner {
    queues: HashMap<EventType, VecDeque<Event>>,
    shutdown: bool,
}

/// Multi-consumer publish/wait channel. Each emitted event is delivered
/// to exactly one successful `wait` or `check` call; within a type the
/// queue is FIFO.
pub struct EventChannel {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl EventChannel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queues: HashMap::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    pub fn emit(&self, event_type: EventType, data: Option<String>) {
        let mut inner = self.inner.lock();
        inner
            .queues
            .entry(event_type)
            .or_default()
            .push_back(Event::new(event_type, data));
        self.condvar.notify_all();
    }

    /// Checks `types` in order; if any has a pending event, removes and
    /// returns its head immediately. Otherwise suspends until `emit` on
    /// any type, `shutdown`, or `timeout` elapses.
    pub fn wait(&self, types: &[EventType], timeout: Duration) -> Option<Event> {
        let mut inner = self.inner.lock();
        let deadline = Instant::now() + timeout;
        loop {
            for &t in types {
                if let Some(q) = inner.queues.get_mut(&t) {
                    if let Some(ev) = q.pop_front() {
                        return Some(ev);
                    }
                }
            }
            if inner.shutdown {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let remaining = deadline - now;
            let result = self.condvar.wait_for(&mut inner, remaining);
            if result.timed_out() {
                // Loop once more: a wakeup may have raced the timeout.
                for &t in types {
                    if let Some(q) = inner.queues.get_mut(&t) {
                        if let Some(ev) = q.pop_front() {
                            return Some(ev);
                        }
                    }
                }
                return None;
            }
        }
    }

    /// Non-blocking variant of [`EventChannel::wait`].
    pub fn check(&self, event_type: EventType) -> Option<Event> {
        let mut inner = self.inner.lock();
        inner.queues.get_mut(&event_type).and_then(|q| q.pop_front())
    }

    pub fn clear(&self, event_type: Option<EventType>) {
        let mut inner = self.inner.lock();
        match event_type {
            Some(t) => {
                inner.queues.remove(&t);
            }
            None => inner.queues.clear(),
        }
    }

    /// Wakes all waiters permanently; subsequent `wait` calls return
    /// `None` immediately once queued events, if any, are drained.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.shutdown = true;
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.lock().shutdown
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}
