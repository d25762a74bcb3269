//! # smokewatch
//!
//! Streams the temperatures of a barbecue cook over message queues and raises
//! alerts when the smoker loses heat or a piece of food stalls.
//!
//! One process (the emitter) replays timestamped readings from a CSV file,
//! sending each probe's value to its own queue every sample interval. A
//! second process (the listener) consumes the three queues concurrently and
//! keeps a sliding window of recent readings per probe.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────┐
//! │  source  │──▶│ publisher │──▶│  transport   │──▶│ consumer │ (one per sensor)
//! │ CsvSource│   │  paced    │   │ smoker_queue │   │          │
//! └──────────┘   └───────────┘   │ food_a_queue │   └────┬─────┘
//!                                │ food_b_queue │        │
//!                                └──────────────┘        ▼
//!                                                 ┌──────────────┐
//!                                                 │   tracker    │
//!                                                 │ window+alert │
//!                                                 └──────────────┘
//! ```
//!
//! - **[`source`]**: sample rows from CSV ([`CsvSource`]) or memory ([`MemorySource`])
//! - **[`publisher`]**: splits rows into wire records and paces emission
//! - **[`transport`]**: [`MessageSink`] with in-process and RabbitMQ implementations
//! - **[`consumer`]**: decodes records, updates the tracker, decides ack/reject
//! - **[`tracker`]**, **[`window`]**, **[`alert`]**: the sliding windows and alert rules
//!
//! ## Alert rules
//!
//! - **Smoker drop**: over a 2.5 minute window (9 samples at 30s), the oldest
//!   reading minus the newest is strictly greater than 15°F.
//! - **Food stall**: over a 10 minute window (20 samples at 30s), the newest
//!   reading differs from the oldest by at most 1°F.
//!
//! Rules are only evaluated on a full window, and fire on every qualifying
//! reading.
//!
//! ## Usage
//!
//! ```bash
//! # Publish a cook to RabbitMQ, one row every 30 seconds
//! smokewatch emit --csv smoker-temps.csv
//!
//! # Watch the three queues
//! smokewatch listen
//!
//! # Evaluate a CSV offline, as fast as possible
//! smokewatch replay --csv smoker-temps.csv
//! ```
//!
//! ### As a library
//!
//! ```
//! use smokewatch::{AlertKind, MonitorSettings, SensorMonitor};
//! use smokewatch_types::{Reading, Sensor};
//!
//! let mut smoker = SensorMonitor::from_settings(Sensor::Smoker, &MonitorSettings::default()).unwrap();
//! let mut alerts = Vec::new();
//! for (i, value) in [225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 225.0, 205.0].into_iter().enumerate() {
//!     alerts.extend(smoker.process(Reading::new(format!("t{}", i), Sensor::Smoker, value)));
//! }
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].kind, AlertKind::SmokerTempDrop);
//! ```
//!
//! ### Offline replay
//!
//! ```
//! use std::time::Duration;
//! use smokewatch::{replay, MonitorSettings, SampleRow};
//!
//! # tokio_test::block_on(async {
//! let rows = vec![SampleRow::new("t0", Some(225.0), Some(40.0), Some(38.0))];
//! let stats = replay(rows, &MonitorSettings::default(), Duration::ZERO).await.unwrap();
//! assert_eq!(stats.len(), 3);
//! # });
//! ```

pub mod alert;
pub mod config;
pub mod console;
pub mod consumer;
pub mod duration;
pub mod publisher;
pub mod replay;
pub mod source;
pub mod tracker;
pub mod transport;
pub mod window;

// Re-export main types for convenience
pub use alert::{Alert, AlertKind, AlertRule};
pub use config::{MalformedPolicy, MonitorSettings, QueueNames, Settings};
pub use consumer::{Consumer, ConsumerStats, Disposition, RecordError};
pub use publisher::Publisher;
pub use replay::replay;
pub use source::{CsvSource, MemorySource, SampleRow, SampleSource, SourceError};
pub use tracker::SensorMonitor;
pub use transport::{MemorySink, MessageSink};
pub use window::Window;
