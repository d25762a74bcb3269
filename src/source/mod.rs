//! Sources of timestamped sample rows.
//!
//! A source yields one [`SampleRow`] per sampling instant, in chronological
//! order. Each row carries the smoker and both food probe temperatures; a
//! missing cell means that probe had no reading at that instant. Missing
//! readings are still sent, as NaN, so every row fills one window slot per
//! sensor.

mod csv;
mod memory;

pub use self::csv::{parse_csv, CsvSource};
pub use memory::MemorySource;

use std::fmt::Debug;
use std::path::PathBuf;

use smokewatch_types::{Reading, Sensor};
use thiserror::Error;

/// One row of source data: a timestamp and up to three temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub timestamp: String,
    pub smoker: Option<f64>,
    pub food_a: Option<f64>,
    pub food_b: Option<f64>,
}

impl SampleRow {
    pub fn new(
        timestamp: impl Into<String>,
        smoker: Option<f64>,
        food_a: Option<f64>,
        food_b: Option<f64>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            smoker,
            food_a,
            food_b,
        }
    }

    /// The temperature for `sensor`, if present in this row.
    pub fn value(&self, sensor: Sensor) -> Option<f64> {
        match sensor {
            Sensor::Smoker => self.smoker,
            Sensor::FoodA => self.food_a,
            Sensor::FoodB => self.food_b,
        }
    }

    /// Split the row into one reading per sensor. Empty cells become NaN.
    pub fn readings(&self) -> impl Iterator<Item = Reading> + '_ {
        Sensor::ALL.into_iter().map(move |sensor| {
            let value = self.value(sensor).unwrap_or(f64::NAN);
            Reading::new(self.timestamp.clone(), sensor, value)
        })
    }
}

/// Errors from reading or parsing source data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Read error for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: expected at least 4 columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("Line {line}: timestamp is empty")]
    EmptyTimestamp { line: usize },

    #[error("Line {line}: timestamp {timestamp:?} contains a comma")]
    CommaInTimestamp { line: usize, timestamp: String },

    #[error("Line {line}: invalid temperature {value:?} in column {column:?}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
}

/// Trait for ordered, finite, restartable sources of sample rows.
///
/// # Example
///
/// ```
/// use smokewatch::{MemorySource, SampleRow, SampleSource};
///
/// let mut source = MemorySource::new(vec![
///     SampleRow::new("t0", Some(225.0), Some(40.0), None),
/// ]);
/// let rows = source.rows().unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].readings().count(), 3);
/// ```
pub trait SampleSource: Send + Debug {
    /// Read every row from the start, in chronological order.
    ///
    /// Each call starts over, so a session can be replayed.
    fn rows(&mut self) -> Result<Vec<SampleRow>, SourceError>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}
