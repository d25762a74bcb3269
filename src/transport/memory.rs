//! In-process transport built on tokio channels.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use smokewatch_types::Sensor;
use tokio::sync::mpsc;

use super::MessageSink;

/// A sink that forwards records to one bounded channel per sensor.
///
/// Per-sensor ordering is preserved; there is no ordering across sensors.
///
/// # Example
///
/// ```
/// use smokewatch::MemorySink;
/// use smokewatch_types::Sensor;
///
/// let (sink, mut queues) = MemorySink::create(16);
/// let smoker_rx = queues.remove(&Sensor::Smoker).unwrap();
/// ```
#[derive(Debug)]
pub struct MemorySink {
    senders: BTreeMap<Sensor, mpsc::Sender<String>>,
    description: String,
}

impl MemorySink {
    /// Create a sink and the receiving end of each sensor's queue.
    pub fn create(buffer: usize) -> (Self, BTreeMap<Sensor, mpsc::Receiver<String>>) {
        let mut senders = BTreeMap::new();
        let mut receivers = BTreeMap::new();
        for sensor in Sensor::ALL {
            let (tx, rx) = mpsc::channel(buffer);
            senders.insert(sensor, tx);
            receivers.insert(sensor, rx);
        }
        let sink = Self {
            senders,
            description: "memory".to_string(),
        };
        (sink, receivers)
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn send(&mut self, sensor: Sensor, record: &str) -> Result<()> {
        let sender = self
            .senders
            .get(&sensor)
            .ok_or_else(|| anyhow!("No queue for {}", sensor))?;
        sender
            .send(record.to_string())
            .await
            .map_err(|_| anyhow!("{} queue closed", sensor))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
