//! Channel transport adapters.
//!
//! The publisher writes wire records through a [`MessageSink`]; each sensor
//! has its own logical queue. Two implementations are provided:
//!
//! - [`MemorySink`]: in-process tokio channels, one per sensor, used for
//!   offline replay and tests
//! - `amqp::AmqpSink`: durable RabbitMQ queues (requires the `amqp` feature)

#[cfg(feature = "amqp")]
pub mod amqp;
mod memory;

pub use memory::MemorySink;

use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use smokewatch_types::Sensor;

/// Destination for wire records, addressed by sensor.
#[async_trait]
pub trait MessageSink: Send + Debug {
    /// Deliver one record onto the queue for `sensor`.
    async fn send(&mut self, sensor: Sensor, record: &str) -> Result<()>;

    /// Returns a human-readable description of the sink.
    fn description(&self) -> &str;
}
