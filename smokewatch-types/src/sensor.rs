//! The three probes of a cooking session.

use std::fmt;
use std::str::FromStr;

use crate::WireError;

/// A temperature probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sensor {
    /// The smoker (cooking chamber) probe.
    Smoker,
    /// The first food probe.
    FoodA,
    /// The second food probe.
    FoodB,
}

impl Sensor {
    /// All sensors, in column order of the source data.
    pub const ALL: [Sensor; 3] = [Sensor::Smoker, Sensor::FoodA, Sensor::FoodB];

    /// The label used in wire records and log output.
    pub fn label(&self) -> &'static str {
        match self {
            Sensor::Smoker => "Smoker",
            Sensor::FoodA => "Food A",
            Sensor::FoodB => "Food B",
        }
    }

    /// Returns true for the two food probes.
    pub fn is_food(&self) -> bool {
        matches!(self, Sensor::FoodA | Sensor::FoodB)
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sensor {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sensor::ALL
            .into_iter()
            .find(|sensor| sensor.label() == s)
            .ok_or_else(|| WireError::UnknownSensor(s.to_string()))
    }
}
