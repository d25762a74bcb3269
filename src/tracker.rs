//! Per-sensor monitoring state.

use smokewatch_types::{Reading, Sensor};
use tracing::debug;

use crate::alert::{Alert, AlertRule};
use crate::config::MonitorSettings;
use crate::window::Window;

/// One sensor's window together with the rule that watches it.
///
/// Each consumer owns exactly one `SensorMonitor`; nothing here is shared
/// between sensors or tasks.
#[derive(Debug, Clone)]
pub struct SensorMonitor {
    sensor: Sensor,
    window: Window,
    rule: AlertRule,
}

impl SensorMonitor {
    pub fn new(sensor: Sensor, window: Window, rule: AlertRule) -> Self {
        Self {
            sensor,
            window,
            rule,
        }
    }

    /// Build the monitor for `sensor` from validated settings.
    ///
    /// The smoker is watched for temperature drops, the food probes for stalls.
    pub fn from_settings(sensor: Sensor, settings: &MonitorSettings) -> anyhow::Result<Self> {
        let (period, rule) = if sensor.is_food() {
            let period = settings.food_period;
            (
                period,
                AlertRule::FoodStall {
                    threshold: settings.food_stall_threshold,
                    period,
                },
            )
        } else {
            let period = settings.smoker_period;
            (
                period,
                AlertRule::SmokerDrop {
                    threshold: settings.smoker_drop_threshold,
                    period,
                },
            )
        };
        let capacity = settings.capacity(period)?;
        Ok(Self::new(sensor, Window::new(capacity), rule))
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn rule(&self) -> &AlertRule {
        &self.rule
    }

    /// Add a reading to the window, then evaluate the rule.
    pub fn process(&mut self, reading: Reading) -> Option<Alert> {
        self.window.observe(reading);
        debug!(
            sensor = %self.sensor,
            len = self.window.len(),
            capacity = self.window.capacity(),
            "window updated"
        );
        self.evaluate()
    }

    /// Evaluate the rule against the current window without changing it.
    pub fn evaluate(&self) -> Option<Alert> {
        self.rule.evaluate(&self.window)
    }
}
