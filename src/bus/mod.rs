//! In-process stand-in for the message bus (§6). A real MQTT/AMQP client
//! would implement [`transport::BusTransport`] against the same topic
//! strings; this module gives the rest of the crate something to publish
//! to and subscribe from without a broker dependency.

pub mod messages;
pub mod transport;

pub use transport::{BusTransport, InProcessBus};
