//! Offline replay: publisher and consumers wired through in-process queues.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use smokewatch_types::Sensor;
use tokio::task::JoinSet;

use crate::config::MonitorSettings;
use crate::consumer::{run_channel, Consumer, ConsumerStats};
use crate::publisher::Publisher;
use crate::source::SampleRow;
use crate::tracker::SensorMonitor;
use crate::transport::MemorySink;

/// Depth of each in-process queue.
const QUEUE_DEPTH: usize = 64;

/// Run a whole session through the monitors without a broker.
///
/// Spawns one consumer task per sensor, publishes every row, then waits for
/// the consumers to drain their queues. Returns per-sensor counters.
pub async fn replay(
    rows: Vec<SampleRow>,
    monitor: &MonitorSettings,
    interval: Duration,
) -> Result<BTreeMap<Sensor, ConsumerStats>> {
    let (sink, queues) = MemorySink::create(QUEUE_DEPTH);

    let mut tasks = JoinSet::new();
    for (sensor, records) in queues {
        let consumer = Consumer::new(
            SensorMonitor::from_settings(sensor, monitor)?,
            monitor.on_malformed,
        );
        tasks.spawn(async move { (sensor, run_channel(consumer, records).await) });
    }

    let mut publisher = Publisher::new(sink, interval);
    let published = publisher.run(rows).await;
    // Dropping the sink closes every queue so the consumers finish
    drop(publisher);

    let mut stats = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (sensor, result) = joined.context("Consumer task panicked")?;
        let sensor_stats = result.with_context(|| format!("{} consumer failed", sensor))?;
        stats.insert(sensor, sensor_stats);
    }

    published?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoker_rows(values: &[f64]) -> Vec<SampleRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SampleRow::new(format!("t{}", i), Some(*v), None, None))
            .collect()
    }

    #[tokio::test]
    async fn test_replay_smoker_drop() {
        let rows = smoker_rows(&[225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 205.0]);

        let stats = replay(rows, &MonitorSettings::default(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(
            stats[&Sensor::Smoker],
            ConsumerStats {
                processed: 9,
                alerts: 1,
                rejected: 0
            }
        );
        // Empty food cells still arrive, as NaN, and never alert
        for food in [Sensor::FoodA, Sensor::FoodB] {
            assert_eq!(
                stats[&food],
                ConsumerStats {
                    processed: 9,
                    alerts: 0,
                    rejected: 0
                }
            );
        }
    }

    #[tokio::test]
    async fn test_replay_gap_keeps_one_slot_per_row() {
        // Food A: 10 readings at 160, a 5 row gap, then 10 readings at 160.5
        let food_a = std::iter::repeat(Some(160.0))
            .take(10)
            .chain(std::iter::repeat(None).take(5))
            .chain(std::iter::repeat(Some(160.5)).take(10));
        let rows: Vec<SampleRow> = food_a
            .enumerate()
            .map(|(i, v)| SampleRow::new(format!("t{}", i), Some(250.0), v, None))
            .collect();

        let stats = replay(rows, &MonitorSettings::default(), Duration::ZERO)
            .await
            .unwrap();

        // The gap fills window slots, so the window is full at row 20 and
        // rows 20 to 25 each compare against a reading 20 rows earlier
        assert_eq!(stats[&Sensor::FoodA].processed, 25);
        assert_eq!(stats[&Sensor::FoodA].alerts, 6);
        assert_eq!(stats[&Sensor::FoodB].alerts, 0);
    }

    #[tokio::test]
    async fn test_replay_gap_at_window_head_suppresses_stall() {
        // NaN at either end of a full window never compares as a stall
        let food_b = std::iter::repeat(None)
            .take(5)
            .chain(std::iter::repeat(Some(165.0)).take(20));
        let rows: Vec<SampleRow> = food_b
            .enumerate()
            .map(|(i, v)| SampleRow::new(format!("t{}", i), Some(250.0), Some(100.0 + i as f64), v))
            .collect();

        let stats = replay(rows, &MonitorSettings::default(), Duration::ZERO)
            .await
            .unwrap();

        // Full at row 20 with NaN at the head until row 25
        assert_eq!(stats[&Sensor::FoodB].processed, 25);
        assert_eq!(stats[&Sensor::FoodB].alerts, 1);
    }

    #[tokio::test]
    async fn test_replay_food_stall_and_steady_smoker() {
        // Food A climbs steadily, Food B sits on a plateau
        let rows: Vec<SampleRow> = (0..24)
            .map(|i| {
                SampleRow::new(
                    format!("t{}", i),
                    Some(250.0),
                    Some(100.0 + i as f64),
                    Some(165.0),
                )
            })
            .collect();

        let stats = replay(rows, &MonitorSettings::default(), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(stats[&Sensor::Smoker].alerts, 0);
        assert_eq!(stats[&Sensor::FoodA].alerts, 0);
        // Full at the 20th reading, then every reading after
        assert_eq!(stats[&Sensor::FoodB].alerts, 5);
        assert!(stats.values().all(|s| s.processed == 24));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_paced() {
        let rows = smoker_rows(&[225.0, 224.0]);
        let start = tokio::time::Instant::now();
        replay(rows, &MonitorSettings::default(), Duration::from_secs(30))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(60));
    }
}
