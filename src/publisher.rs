//! Paced publication of sample rows.
//!
//! Each row becomes three wire records, one per sensor queue. After a
//! full row has been sent the publisher waits for the configured interval,
//! emulating live sampling. A zero interval replays as fast as the sink
//! accepts records.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::source::SampleRow;
use crate::transport::MessageSink;

/// Sends sample rows through a sink at a fixed pace.
#[derive(Debug)]
pub struct Publisher<S> {
    sink: S,
    interval: Duration,
}

impl<S: MessageSink> Publisher<S> {
    pub fn new(sink: S, interval: Duration) -> Self {
        Self { sink, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Publish every row in order.
    ///
    /// Returns the number of records sent. The first sink failure ends the
    /// run and is returned.
    pub async fn run<I>(&mut self, rows: I) -> Result<u64>
    where
        I: IntoIterator<Item = SampleRow>,
    {
        let mut sent = 0;
        for row in rows {
            sent += self.publish_row(&row).await?;
            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
        }
        Ok(sent)
    }

    /// Publish the readings of one row without pacing.
    pub async fn publish_row(&mut self, row: &SampleRow) -> Result<u64> {
        let mut sent = 0;
        for reading in row.readings() {
            let record = reading.to_wire();
            self.sink
                .send(reading.sensor(), &record)
                .await
                .with_context(|| format!("Failed to send {} via {}", record, self.sink.description()))?;
            info!(" [x] Sent {}", record);
            sent += 1;
        }
        Ok(sent)
    }

    /// Give back the sink, e.g. to close it.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
