use crate::ParseError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER: &str = "*FISH";
pub const DEFAULT_DELIMITER: char = '@';
pub const DEFAULT_INNER_DELIMITER: char = '_';
pub const DEFAULT_START_INDEX: usize = 8;
pub const DEFAULT_END_INDEX: usize = 9;

/// Literals and positions describing one record layout.
///
/// `start_index` and `end_index` are 0-based positions into the delimiter
/// occurrences of a single record block. The defaults pick the text between
/// the 9th and 10th `@`, which carries the water-quality readings in the
/// reference sensor output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFormat {
    pub marker: String,
    pub delimiter: char,
    pub inner_delimiter: char,
    pub start_index: usize,
    pub end_index: usize,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            delimiter: DEFAULT_DELIMITER,
            inner_delimiter: DEFAULT_INNER_DELIMITER,
            start_index: DEFAULT_START_INDEX,
            end_index: DEFAULT_END_INDEX,
        }
    }
}

impl RecordFormat {
    /// Same layout with a different slice range.
    pub fn with_indices(mut self, start_index: usize, end_index: usize) -> Self {
        self.start_index = start_index;
        self.end_index = end_index;
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if self.marker.is_empty() {
            return Err(ParseError::InvalidFormat("record marker is empty".to_string()));
        }

        if self.delimiter == self.inner_delimiter {
            return Err(ParseError::InvalidFormat(format!(
                "delimiter and inner delimiter are both '{}'",
                self.delimiter
            )));
        }

        for c in [self.delimiter, self.inner_delimiter] {
            if collides_with_numbers(c) {
                return Err(ParseError::InvalidFormat(format!(
                    "'{}' cannot be used as a delimiter",
                    c
                )));
            }
        }

        if self.start_index >= self.end_index {
            return Err(ParseError::InvalidFormat(format!(
                "start index {} must be below end index {}",
                self.start_index, self.end_index
            )));
        }

        Ok(())
    }
}

fn collides_with_numbers(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}
