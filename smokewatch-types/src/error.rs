//! Error types for wire record decoding.

use std::num::ParseFloatError;

use thiserror::Error;

/// Errors that can occur when decoding a wire record into a [`Reading`](crate::Reading).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// The message body was not valid UTF-8.
    #[error("record is not valid UTF-8")]
    InvalidUtf8,

    /// The record did not split into exactly three comma-separated fields.
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    /// The timestamp field was empty.
    #[error("timestamp is empty")]
    EmptyTimestamp,

    /// The sensor label is not one of the known sensors.
    #[error("unknown sensor label {0:?}")]
    UnknownSensor(String),

    /// The value field could not be parsed as a number.
    #[error("invalid temperature {value:?}: {source}")]
    InvalidValue {
        value: String,
        #[source]
        source: ParseFloatError,
    },
}
