//! Layered settings for the emitter and listener.
//!
//! Settings are resolved from built-in defaults, then an optional TOML file,
//! then `SMOKEWATCH_*` environment variables (sections separated by `__`),
//! and finally command-line flags applied by the binary.
//!
//! ```toml
//! [amqp]
//! url = "amqp://127.0.0.1:5672/%2f"
//! console_url = "http://localhost:15672/#/queues"
//! offer_console = true
//!
//! [queues]
//! smoker = "smoker_queue"
//! food_a = "food_a_queue"
//! food_b = "food_b_queue"
//!
//! [monitor]
//! sample_interval = "30s"
//! smoker_period = "150s"
//! food_period = "600s"
//! smoker_drop_threshold = 15.0
//! food_stall_threshold = 1.0
//! on_malformed = "fail"
//!
//! [emitter]
//! csv = "smoker-temps.csv"
//! interval = "30s"
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use smokewatch_types::Sensor;

use crate::alert::{FOOD_STALL_THRESHOLD, SMOKER_DROP_THRESHOLD};
use crate::window::window_capacity;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SMOKEWATCH";

/// All settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub amqp: AmqpSettings,
    pub queues: QueueNames,
    pub monitor: MonitorSettings,
    pub emitter: EmitterSettings,
}

impl Settings {
    /// Load settings, reading `path` if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.monitor.validate()
    }
}

/// Broker connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmqpSettings {
    /// AMQP URI of the broker.
    pub url: String,
    /// Web management console, offered to the user before emitting.
    pub console_url: String,
    /// Whether the emitter asks to open the console on startup.
    pub offer_console: bool,
}

impl Default for AmqpSettings {
    fn default() -> Self {
        Self {
            url: "amqp://127.0.0.1:5672/%2f".to_string(),
            console_url: "http://localhost:15672/#/queues".to_string(),
            offer_console: true,
        }
    }
}

/// One durable queue per sensor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueNames {
    pub smoker: String,
    pub food_a: String,
    pub food_b: String,
}

impl Default for QueueNames {
    fn default() -> Self {
        Self {
            smoker: "smoker_queue".to_string(),
            food_a: "food_a_queue".to_string(),
            food_b: "food_b_queue".to_string(),
        }
    }
}

impl QueueNames {
    /// The queue carrying readings for `sensor`.
    pub fn for_sensor(&self, sensor: Sensor) -> &str {
        match sensor {
            Sensor::Smoker => &self.smoker,
            Sensor::FoodA => &self.food_a,
            Sensor::FoodB => &self.food_b,
        }
    }
}

/// What a consumer does with a record it cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the consumer and leave the record unacknowledged.
    #[default]
    Fail,
    /// Log, reject the record without requeueing, and carry on.
    Skip,
}

/// Window sizing and alert thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Interval between samples in the source data.
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub sample_interval: Duration,
    /// Period over which a smoker drop is measured.
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub smoker_period: Duration,
    /// Period over which a food stall is measured.
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub food_period: Duration,
    pub smoker_drop_threshold: f64,
    pub food_stall_threshold: f64,
    pub on_malformed: MalformedPolicy,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(30),
            smoker_period: Duration::from_secs(150),
            food_period: Duration::from_secs(600),
            smoker_drop_threshold: SMOKER_DROP_THRESHOLD,
            food_stall_threshold: FOOD_STALL_THRESHOLD,
            on_malformed: MalformedPolicy::Fail,
        }
    }
}

impl MonitorSettings {
    /// Window capacity for a monitoring period.
    pub fn capacity(&self, period: Duration) -> Result<NonZeroUsize> {
        window_capacity(period, self.sample_interval).with_context(|| {
            format!(
                "Monitoring period {:?} holds no samples at interval {:?}",
                period, self.sample_interval
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_interval.is_zero() {
            bail!("monitor.sample_interval must be greater than zero");
        }
        self.capacity(self.smoker_period)?;
        self.capacity(self.food_period)?;

        for (name, value) in [
            ("smoker_drop_threshold", self.smoker_drop_threshold),
            ("food_stall_threshold", self.food_stall_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("monitor.{} must be a non-negative number, got {}", name, value);
            }
        }
        Ok(())
    }
}

/// Emitter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    /// CSV file of timestamped readings.
    pub csv: PathBuf,
    /// Pause after each row; zero replays as fast as possible.
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub interval: Duration,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            csv: PathBuf::from("smoker-temps.csv"),
            interval: Duration::from_secs(30),
        }
    }
}
