//! # smokewatch-types
//!
//! Types shared by the smokewatch emitter and listener: the three sensors of a
//! cooking session, a single timestamped [`Reading`], and the comma-separated
//! wire record that carries a reading across a message queue.
//!
//! ## Wire format
//!
//! ```text
//! <timestamp>,<sensor label>,<value>
//! 03/11/2024 11:00:00,Smoker,225.0
//! ```
//!
//! The sensor label is one of `Smoker`, `Food A` or `Food B`. The timestamp is
//! an opaque token; it is carried through for display and never parsed.
//!
//! ## Example
//!
//! ```rust
//! use smokewatch_types::{Reading, Sensor};
//!
//! let reading = Reading::new("03/11/2024 11:00:00", Sensor::FoodA, 142.5);
//! let wire = reading.to_wire();
//! assert_eq!(wire, "03/11/2024 11:00:00,Food A,142.5");
//!
//! let back: Reading = wire.parse().unwrap();
//! assert_eq!(back, reading);
//! ```

mod error;
mod reading;
mod sensor;

pub use error::WireError;
pub use reading::Reading;
pub use sensor::Sensor;
