//! `BusTransport` trait plus an in-process router implementing it over
//! `crossbeam::channel`, one bounded queue per topic. Grounded on the
//! teacher's `Transmitter`/`Receiving` pair (`component_a/transmitter.rs`,
//! `component_b/receiver.rs`): a bounded channel per logical link,
//! `try_send` with drop-on-full rather than blocking the publisher.

use dashmap::DashMap;
use crossbeam::channel::{Receiver, Sender};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BusError;

const TOPIC_QUEUE_CAPACITY: usize = 64;

/// A pub/sub transport keyed by topic string, JSON-encoded. A real broker
/// client implements this same trait so the rest of the crate needs no
/// change to swap transports.
pub trait BusTransport: Send + Sync {
    fn publish_bytes(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError>;
    fn subscribe_bytes(&self, topic: &str) -> Receiver<Vec<u8>>;

    fn publish<T: Serialize>(&self, topic: &str, payload: &T) -> Result<(), BusError> {
        let bytes = serde_json::to_vec(payload)?;
        self.publish_bytes(topic, bytes)
    }
}

/// Helper for decoding a received payload; not part of the trait since
/// the element type varies per topic.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BusError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// In-process router: each topic gets its own bounded channel, created
/// lazily on first publish or subscribe. Every subscriber registered
/// before a publish receives that message; publishing to a topic with no
/// subscribers yet is not an error (the channel is simply created idle).
pub struct InProcessBus {
    topics: DashMap<String, Vec<Sender<Vec<u8>>>>,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self { topics: DashMap::new() }
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransport for InProcessBus {
    fn publish_bytes(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
        match self.topics.get(topic) {
            Some(subs) => {
                for tx in subs.iter() {
                    if tx.try_send(payload.clone()).is_err() {
                        warn!("bus: topic {topic} queue full or closed, dropping message");
                    }
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn subscribe_bytes(&self, topic: &str) -> Receiver<Vec<u8>> {
        let (tx, rx) = crossbeam::channel::bounded(TOPIC_QUEUE_CAPACITY);
        self.topics.entry(topic.to_string()).or_default().push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_receives_published_payload() {
        let bus = InProcessBus::new();
        let rx = bus.subscribe_bytes("mine/truck/1/position");
        bus.publish(
            "mine/truck/1/position",
            &crate::bus::messages::PositionMessage { x: 1.0, y: 2.0, theta: 0.0, velocity: 0.0 },
        )
        .unwrap();
        let bytes = rx.recv_timeout(std::time::Duration::from_millis(100)).unwrap();
        let decoded: crate::bus::messages::PositionMessage = decode(&bytes).unwrap();
        assert_eq!(decoded.x, 1.0);
    }

    #[test]
    fn publish_with_no_subscribers_is_not_an_error() {
        let bus = InProcessBus::new();
        bus.publish("mine/truck/9/state", &serde_json::json!({"x": 1.0})).unwrap();
    }
}
