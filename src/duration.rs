//! Human-readable duration strings for configuration ("30s", "2.5m", "150s").

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

/// Parse duration strings like "30s", "2.5m", "500ms", "0s"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration must be a non-negative number: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a duration as minutes for alert messages ("2.5 minutes", "10 minutes").
pub fn format_minutes(d: Duration) -> String {
    let minutes = d.as_secs_f64() / 60.0;
    if (minutes - 1.0).abs() < f64::EPSILON {
        "1 minute".to_string()
    } else {
        format!("{} minutes", minutes)
    }
}

/// Serde adapter for duration fields written as strings.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}
