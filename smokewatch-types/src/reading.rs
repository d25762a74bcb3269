//! A single timestamped temperature reading and its wire encoding.

use std::fmt;
use std::str::FromStr;

use crate::{Sensor, WireError};

/// One temperature sample from one sensor.
///
/// Readings are immutable once constructed. The timestamp is kept verbatim
/// from the source data and is only ever displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    timestamp: String,
    sensor: Sensor,
    value: f64,
}

impl Reading {
    /// Create a new reading.
    pub fn new(timestamp: impl Into<String>, sensor: Sensor, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            sensor,
            value,
        }
    }

    /// The timestamp token, as it appeared in the source data.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The sensor this reading came from.
    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    /// The temperature in degrees Fahrenheit.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Encode as a wire record: `<timestamp>,<sensor label>,<value>`.
    pub fn to_wire(&self) -> String {
        format!("{},{},{}", self.timestamp, self.sensor.label(), self.value)
    }

    /// Decode a wire record from a raw message body.
    pub fn from_wire(body: &[u8]) -> Result<Self, WireError> {
        let text = std::str::from_utf8(body).map_err(|_| WireError::InvalidUtf8)?;
        text.parse()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.timestamp, self.sensor.label(), self.value)
    }
}

impl FromStr for Reading {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        let &[timestamp, label, value] = fields.as_slice() else {
            return Err(WireError::FieldCount(fields.len()));
        };

        if timestamp.is_empty() {
            return Err(WireError::EmptyTimestamp);
        }

        let sensor = label.parse::<Sensor>()?;
        let value = value.parse::<f64>().map_err(|source| WireError::InvalidValue {
            value: value.to_string(),
            source,
        })?;

        Ok(Self::new(timestamp, sensor, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wire() {
        let reading = Reading::new("03/11/2024 11:00:00", Sensor::Smoker, 225.5);
        assert_eq!(reading.to_wire(), "03/11/2024 11:00:00,Smoker,225.5");
        assert_eq!(reading.to_string(), reading.to_wire());
    }

    #[test]
    fn test_parse_record() {
        let reading: Reading = "03/11/2024 11:00:30,Food B,151.1".parse().unwrap();
        assert_eq!(reading.timestamp(), "03/11/2024 11:00:30");
        assert_eq!(reading.sensor(), Sensor::FoodB);
        assert!((reading.value() - 151.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_tolerates_trailing_newline() {
        let reading = Reading::from_wire(b"t0,Smoker,200\n").unwrap();
        assert_eq!(reading.value(), 200.0);
    }

    #[test]
    fn test_parse_integer_and_decimal_renderings() {
        // Python-style "225.0" and Rust-style "225" both decode
        let a: Reading = "t,Smoker,225.0".parse().unwrap();
        let b: Reading = "t,Smoker,225".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_nan_is_accepted() {
        let reading: Reading = "t,Food A,nan".parse().unwrap();
        assert!(reading.value().is_nan());
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            "t,Smoker".parse::<Reading>().unwrap_err(),
            WireError::FieldCount(2)
        );
        assert_eq!(
            "t,Smoker,1,2".parse::<Reading>().unwrap_err(),
            WireError::FieldCount(4)
        );
    }

    #[test]
    fn test_empty_timestamp() {
        assert_eq!(
            ",Smoker,225".parse::<Reading>().unwrap_err(),
            WireError::EmptyTimestamp
        );
    }

    #[test]
    fn test_unknown_sensor() {
        let err = "t,Grill,225".parse::<Reading>().unwrap_err();
        assert_eq!(err, WireError::UnknownSensor("Grill".to_string()));
    }

    #[test]
    fn test_invalid_value() {
        let err = "t,Smoker,hot".parse::<Reading>().unwrap_err();
        assert!(matches!(err, WireError::InvalidValue { ref value, .. } if value == "hot"));
        assert!(err.to_string().contains("\"hot\""));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Reading::from_wire(&[0xff, 0xfe, b',']).unwrap_err();
        assert_eq!(err, WireError::InvalidUtf8);
    }
}
