//! CSV file source.
//!
//! Reads a file with a header row followed by one row per sampling instant:
//!
//! ```text
//! Time (UTC),Channel1,Channel2,Channel3
//! 03/11/2024 11:00:00,225.0,42.1,39.8
//! 03/11/2024 11:00:30,226.1,,40.0
//! ```
//!
//! Columns are located by the header names above (case-insensitive). If the
//! header does not name them, the first four columns are used in order.

use std::fs;
use std::path::{Path, PathBuf};

use super::{SampleRow, SampleSource, SourceError};

const TIME_COLUMN: &str = "Time (UTC)";
const SENSOR_COLUMNS: [&str; 3] = ["Channel1", "Channel2", "Channel3"];

/// A source that reads sample rows from a CSV file.
///
/// The file is read in full on every call to [`SampleSource::rows`], so the
/// source can be replayed from the start.
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    description: String,
}

impl CsvSource {
    /// Create a new CSV source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("csv: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for CsvSource {
    fn rows(&mut self) -> Result<Vec<SampleRow>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_csv(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Parse CSV text into sample rows. The first non-blank line is the header.
pub fn parse_csv(content: &str) -> Result<Vec<SampleRow>, SourceError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let header = split_fields(header);
    let columns = locate_columns(&header);
    let names: Vec<String> = columns
        .iter()
        .map(|&i| header.get(i).cloned().unwrap_or_else(|| format!("column_{}", i)))
        .collect();

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let fields = split_fields(line);
        let needed = columns.iter().copied().max().unwrap_or(0) + 1;
        if fields.len() < needed {
            return Err(SourceError::MissingColumns {
                line: line_no,
                found: fields.len(),
            });
        }

        let timestamp = fields[columns[0]].clone();
        if timestamp.is_empty() {
            return Err(SourceError::EmptyTimestamp { line: line_no });
        }
        // Wire records are comma-separated and carry the timestamp unquoted
        if timestamp.contains(',') {
            return Err(SourceError::CommaInTimestamp {
                line: line_no,
                timestamp,
            });
        }

        let mut values = [None; 3];
        for (slot, (&column, name)) in values
            .iter_mut()
            .zip(columns[1..].iter().zip(&names[1..]))
        {
            *slot = parse_value(&fields[column]).map_err(|_| SourceError::InvalidValue {
                line: line_no,
                column: name.clone(),
                value: fields[column].clone(),
            })?;
        }

        let [smoker, food_a, food_b] = values;
        rows.push(SampleRow::new(timestamp, smoker, food_a, food_b));
    }

    Ok(rows)
}

/// Column indices for timestamp, smoker, food A and food B.
fn locate_columns(header: &[String]) -> [usize; 4] {
    let find = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));

    match (
        find(TIME_COLUMN),
        find(SENSOR_COLUMNS[0]),
        find(SENSOR_COLUMNS[1]),
        find(SENSOR_COLUMNS[2]),
    ) {
        (Some(t), Some(a), Some(b), Some(c)) => [t, a, b, c],
        _ => [0, 1, 2, 3],
    }
}

/// Empty cells are missing readings.
fn parse_value(field: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    if field.is_empty() {
        Ok(None)
    } else {
        field.parse().map(Some)
    }
}

/// Split one line into trimmed fields, honouring double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == ',' && !in_quotes {
            values.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(c);
        }
    }

    values.push(current.trim().to_string());
    values
}
