//! In-memory sample source.

use super::{SampleRow, SampleSource, SourceError};

/// A source backed by a vector of rows.
///
/// Useful for tests and for driving the publisher from generated data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<SampleRow>,
    description: String,
}

impl MemorySource {
    pub fn new(rows: Vec<SampleRow>) -> Self {
        let description = format!("memory: {} rows", rows.len());
        Self { rows, description }
    }
}

impl SampleSource for MemorySource {
    fn rows(&mut self) -> Result<Vec<SampleRow>, SourceError> {
        Ok(self.rows.clone())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_replays() {
        let mut source = MemorySource::new(vec![
            SampleRow::new("t0", Some(1.0), None, None),
            SampleRow::new("t1", Some(2.0), None, None),
        ]);
        assert_eq!(source.description(), "memory: 2 rows");
        assert_eq!(source.rows().unwrap(), source.rows().unwrap());
    }
}
