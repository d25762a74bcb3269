//! Alert rules evaluated against a full window.
//!
//! Both rules look only at the oldest and newest readings of the window.
//! They are pure: evaluating the same window twice gives the same answer,
//! and a condition that persists raises an alert on every qualifying reading.

use std::fmt;
use std::time::Duration;

use smokewatch_types::Sensor;

use crate::duration::format_minutes;
use crate::window::Window;

/// Default smoker drop threshold in degrees F.
pub const SMOKER_DROP_THRESHOLD: f64 = 15.0;

/// Default food stall threshold in degrees F.
pub const FOOD_STALL_THRESHOLD: f64 = 1.0;

/// True when the smoker fell by strictly more than `threshold`.
pub fn smoker_drop(oldest: f64, newest: f64, threshold: f64) -> bool {
    oldest - newest > threshold
}

/// True when the food moved by at most `threshold` in either direction.
pub fn food_stall(oldest: f64, newest: f64, threshold: f64) -> bool {
    (newest - oldest).abs() <= threshold
}

/// The kind of event an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    SmokerTempDrop,
    FoodStall,
}

/// An advisory alert raised for the newest reading of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub sensor: Sensor,
    pub timestamp: String,
    pub kind: AlertKind,
    pub detail: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp, self.detail)
    }
}

/// A rule and its parameters, applied to one sensor's window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertRule {
    /// Smoker temperature fell by more than `threshold` over `period`.
    SmokerDrop { threshold: f64, period: Duration },
    /// Food temperature changed by at most `threshold` over `period`.
    FoodStall { threshold: f64, period: Duration },
}

impl AlertRule {
    /// The rule's monitoring period.
    pub fn period(&self) -> Duration {
        match self {
            AlertRule::SmokerDrop { period, .. } | AlertRule::FoodStall { period, .. } => *period,
        }
    }

    /// Evaluate the rule against a window.
    ///
    /// Returns `None` unless the window is full.
    pub fn evaluate(&self, window: &Window) -> Option<Alert> {
        if !window.is_full() {
            return None;
        }
        let oldest = window.oldest()?;
        let newest = window.newest()?;

        match *self {
            AlertRule::SmokerDrop { threshold, period } => {
                smoker_drop(oldest.value(), newest.value(), threshold).then(|| Alert {
                    sensor: newest.sensor(),
                    timestamp: newest.timestamp().to_string(),
                    kind: AlertKind::SmokerTempDrop,
                    detail: format!(
                        "{} alert! Temperature dropped by more than {} degrees F in {}.",
                        newest.sensor(),
                        threshold,
                        format_minutes(period)
                    ),
                })
            }
            AlertRule::FoodStall { threshold, period } => {
                food_stall(oldest.value(), newest.value(), threshold).then(|| Alert {
                    sensor: newest.sensor(),
                    timestamp: newest.timestamp().to_string(),
                    kind: AlertKind::FoodStall,
                    detail: format!(
                        "{} stall! Temperature changed less than {} degree F in {}.",
                        newest.sensor(),
                        threshold,
                        format_minutes(period)
                    ),
                })
            }
        }
    }
}
