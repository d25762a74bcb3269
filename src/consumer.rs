//! Consumer loop: decode, track, evaluate, then acknowledge.
//!
//! A [`Consumer`] owns one sensor's [`SensorMonitor`]. The transport adapter
//! hands it each message body and acts on the returned [`Disposition`]: the
//! message is acknowledged only after the window update and rule evaluation
//! have completed.

use anyhow::Result;
use smokewatch_types::{Reading, Sensor, WireError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::alert::Alert;
use crate::config::MalformedPolicy;
use crate::tracker::SensorMonitor;

/// A message that could not be turned into a reading for this queue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("malformed record {record:?}: {source}")]
    Wire {
        record: String,
        #[source]
        source: WireError,
    },

    #[error("record for {found} arrived on the {expected} queue")]
    SensorMismatch { expected: Sensor, found: Sensor },
}

/// What the transport should do with a message after handling.
#[derive(Debug, PartialEq)]
pub enum Disposition {
    /// Processed; acknowledge it.
    Ack,
    /// Malformed and skipped; reject it without requeueing.
    Reject,
    /// Malformed; leave it unacknowledged and stop consuming.
    Stop(RecordError),
}

/// Counters for one consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub processed: u64,
    pub alerts: u64,
    pub rejected: u64,
}

/// Handles the messages of one sensor's queue.
#[derive(Debug)]
pub struct Consumer {
    monitor: SensorMonitor,
    policy: MalformedPolicy,
    stats: ConsumerStats,
}

impl Consumer {
    pub fn new(monitor: SensorMonitor, policy: MalformedPolicy) -> Self {
        Self {
            monitor,
            policy,
            stats: ConsumerStats::default(),
        }
    }

    pub fn sensor(&self) -> Sensor {
        self.monitor.sensor()
    }

    pub fn monitor(&self) -> &SensorMonitor {
        &self.monitor
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Decode a message body and feed it to the monitor.
    ///
    /// Returns the alert raised by this reading, if any.
    pub fn handle(&mut self, body: &[u8]) -> Result<Option<Alert>, RecordError> {
        let reading = Reading::from_wire(body).map_err(|source| RecordError::Wire {
            record: String::from_utf8_lossy(body).into_owned(),
            source,
        })?;

        if reading.sensor() != self.sensor() {
            return Err(RecordError::SensorMismatch {
                expected: self.sensor(),
                found: reading.sensor(),
            });
        }

        info!(
            " [x] {} Queue Received: {}, {}",
            self.sensor(),
            reading.timestamp(),
            reading.value()
        );

        let alert = self.monitor.process(reading);
        self.stats.processed += 1;
        if let Some(alert) = &alert {
            self.stats.alerts += 1;
            warn!(sensor = %alert.sensor, kind = ?alert.kind, "{}", alert);
        }
        Ok(alert)
    }

    /// Handle a message and apply the malformed-record policy.
    pub fn dispose(&mut self, body: &[u8]) -> Disposition {
        match self.handle(body) {
            Ok(_) => Disposition::Ack,
            Err(e) => match self.policy {
                MalformedPolicy::Skip => {
                    error!(sensor = %self.sensor(), "Skipping record: {}", e);
                    self.stats.rejected += 1;
                    Disposition::Reject
                }
                MalformedPolicy::Fail => {
                    error!(sensor = %self.sensor(), "Stopping consumer: {}", e);
                    Disposition::Stop(e)
                }
            },
        }
    }
}

/// Drive a consumer from an in-process channel until the sender closes.
pub async fn run_channel(
    mut consumer: Consumer,
    mut records: mpsc::Receiver<String>,
) -> Result<ConsumerStats> {
    debug!(
        sensor = %consumer.sensor(),
        period = ?consumer.monitor().rule().period(),
        capacity = consumer.monitor().window().capacity(),
        "Consumer started"
    );
    while let Some(record) = records.recv().await {
        if let Disposition::Stop(e) = consumer.dispose(record.as_bytes()) {
            return Err(e.into());
        }
    }
    Ok(consumer.stats())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::config::MonitorSettings;

    fn consumer(sensor: Sensor, policy: MalformedPolicy) -> Consumer {
        let monitor = SensorMonitor::from_settings(sensor, &MonitorSettings::default()).unwrap();
        Consumer::new(monitor, policy)
    }

    #[test]
    fn test_handle_feeds_window() {
        let mut consumer = consumer(Sensor::FoodA, MalformedPolicy::Fail);
        assert_eq!(consumer.handle(b"t0,Food A,140.5"), Ok(None));
        assert_eq!(consumer.monitor().window().len(), 1);
        assert_eq!(consumer.stats().processed, 1);
    }

    #[test]
    fn test_nan_record_takes_a_window_slot() {
        let mut consumer = consumer(Sensor::FoodB, MalformedPolicy::Fail);
        assert_eq!(consumer.dispose(b"t0,Food B,NaN"), Disposition::Ack);
        assert_eq!(consumer.monitor().window().len(), 1);
        assert_eq!(consumer.stats().rejected, 0);
    }

    #[test]
    fn test_monitor_period_per_sensor() {
        let smoker = consumer(Sensor::Smoker, MalformedPolicy::Fail);
        assert_eq!(smoker.monitor().rule().period(), std::time::Duration::from_secs(150));
        assert_eq!(smoker.monitor().window().capacity(), 9);

        let food = consumer(Sensor::FoodA, MalformedPolicy::Fail);
        assert_eq!(food.monitor().rule().period(), std::time::Duration::from_secs(600));
        assert_eq!(food.monitor().window().capacity(), 20);
    }

    #[test]
    fn test_handle_reports_alert() {
        let mut consumer = consumer(Sensor::Smoker, MalformedPolicy::Fail);
        for i in 0..8 {
            let record = format!("t{},Smoker,225", i);
            assert_eq!(consumer.handle(record.as_bytes()), Ok(None));
        }
        let alert = consumer.handle(b"t8,Smoker,205").unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::SmokerTempDrop);
        assert_eq!(alert.timestamp, "t8");
        assert_eq!(
            consumer.stats(),
            ConsumerStats {
                processed: 9,
                alerts: 1,
                rejected: 0
            }
        );
    }

    #[test]
    fn test_handle_rejects_other_sensor() {
        let mut consumer = consumer(Sensor::FoodB, MalformedPolicy::Fail);
        let err = consumer.handle(b"t0,Food A,140").unwrap_err();
        assert_eq!(
            err,
            RecordError::SensorMismatch {
                expected: Sensor::FoodB,
                found: Sensor::FoodA
            }
        );
        assert!(consumer.monitor().window().is_empty());
    }

    #[test]
    fn test_malformed_record_leaves_window_untouched() {
        let mut consumer = consumer(Sensor::Smoker, MalformedPolicy::Fail);
        let err = consumer.handle(b"garbage").unwrap_err();
        assert!(matches!(err, RecordError::Wire { ref record, .. } if record == "garbage"));
        assert!(consumer.monitor().window().is_empty());
        assert_eq!(consumer.stats().processed, 0);
    }

    #[test]
    fn test_dispose_fail_policy_stops() {
        let mut consumer = consumer(Sensor::Smoker, MalformedPolicy::Fail);
        assert_eq!(consumer.dispose(b"t0,Smoker,225"), Disposition::Ack);
        assert!(matches!(consumer.dispose(b"t1,Smoker,"), Disposition::Stop(_)));
    }

    #[test]
    fn test_dispose_skip_policy_rejects_and_continues() {
        let mut consumer = consumer(Sensor::Smoker, MalformedPolicy::Skip);
        assert_eq!(consumer.dispose(b"t0,Smoker,warm"), Disposition::Reject);
        assert_eq!(consumer.dispose(b"t1,Smoker,225"), Disposition::Ack);
        assert_eq!(consumer.stats().rejected, 1);
        assert_eq!(consumer.stats().processed, 1);
    }

    #[tokio::test]
    async fn test_run_channel_drains_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        let task = tokio::spawn(run_channel(consumer(Sensor::FoodB, MalformedPolicy::Fail), rx));

        for i in 0..20 {
            tx.send(format!("t{},Food B,150.{}", i, i % 2)).await.unwrap();
        }
        drop(tx);

        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats.processed, 20);
        assert_eq!(stats.alerts, 1);
    }

    #[tokio::test]
    async fn test_run_channel_stops_on_malformed() {
        let (tx, rx) = mpsc::channel(4);
        tx.send("t0,Food B,150".to_string()).await.unwrap();
        tx.send("not a record".to_string()).await.unwrap();
        drop(tx);

        let result = run_channel(consumer(Sensor::FoodB, MalformedPolicy::Fail), rx).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("malformed record"));
    }
}
