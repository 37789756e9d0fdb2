use serde::{Deserialize, Serialize};

use crate::status::{Measurement, StatusReport};

/// Per-record result of extraction, in order of appearance in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    /// 1-based, dense over accepted records only
    pub sequence_index: u32,
    pub slice_text: String,
    pub timestamp: String,
    pub source_block: String,
}

/// One decoded set of measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: u32,
    pub timestamp: String,
    pub dissolved_oxygen: f64,
    pub salinity: f64,
    pub temperature: f64,
    pub pressure: f64,
}

impl Observation {
    /// At least one primary measurement is positive. Pressure never counts.
    pub fn is_retained(&self) -> bool {
        self.dissolved_oxygen > 0.0 || self.salinity > 0.0 || self.temperature > 0.0
    }

    pub fn value(&self, measurement: Measurement) -> f64 {
        match measurement {
            Measurement::DissolvedOxygen => self.dissolved_oxygen,
            Measurement::Salinity => self.salinity,
            Measurement::Temperature => self.temperature,
        }
    }
}

/// Output of the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub combined_stream: String,
    pub records: Vec<RecordMetadata>,
    pub accepted_count: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Output of the decoding stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoded {
    /// Retained observations, ids preserved from before filtering
    pub observations: Vec<Observation>,
    /// Pattern matches before the retention filter
    pub match_count: usize,
}

impl Decoded {
    /// Most recent retained observation.
    pub fn current(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn dropped_count(&self) -> usize {
        self.match_count.saturating_sub(self.observations.len())
    }
}

/// Full result of running one text blob through both stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub extraction: Extraction,
    pub decoded: Decoded,
}

impl Analysis {
    pub fn observations(&self) -> &[Observation] {
        &self.decoded.observations
    }

    pub fn current(&self) -> Option<&Observation> {
        self.decoded.current()
    }

    pub fn status(&self) -> Option<StatusReport> {
        self.current().map(StatusReport::for_observation)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid observation pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),
    #[error("{0}")]
    Custom(String),
}

impl From<String> for ParseError {
    fn from(msg: String) -> Self {
        ParseError::Custom(msg)
    }
}

impl From<&str> for ParseError {
    fn from(msg: &str) -> Self {
        ParseError::Custom(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(
        dissolved_oxygen: f64,
        salinity: f64,
        temperature: f64,
        pressure: f64,
    ) -> Observation {
        Observation {
            id: 1,
            timestamp: "2025-06-13 09:42:33".to_string(),
            dissolved_oxygen,
            salinity,
            temperature,
            pressure,
        }
    }

    #[test]
    fn test_retention_ignores_pressure() {
        assert!(!observation(0.0, 0.0, 0.0, 5.0).is_retained());
        assert!(!observation(-1.0, 0.0, -3.0, 100.0).is_retained());
        assert!(observation(0.0, 0.0, 0.1, 0.0).is_retained());
        assert!(observation(-1.5, 30.0, 20.0, -100.0).is_retained());
    }

    #[test]
    fn test_observation_serializes_camel_case() {
        let json = serde_json::to_value(observation(7.2, 32.9, 21.0, -100.0)).unwrap();

        assert_eq!(json["dissolvedOxygen"], 7.2);
        assert_eq!(json["salinity"], 32.9);
        assert_eq!(json["pressure"], -100.0);
        assert!(json.get("dissolved_oxygen").is_none());
    }

    #[test]
    fn test_decoded_current_is_last() {
        let mut decoded = Decoded::default();
        assert!(decoded.current().is_none());

        let mut second = observation(1.0, 2.0, 3.0, 4.0);
        second.id = 3;
        decoded.observations = vec![observation(5.0, 6.0, 7.0, 8.0), second];
        decoded.match_count = 3;

        assert_eq!(decoded.current().map(|o| o.id), Some(3));
        assert_eq!(decoded.dropped_count(), 1);
    }

    #[test]
    fn test_dropped_count_on_hand_built_decoded() {
        let decoded = Decoded {
            observations: vec![observation(5.0, 6.0, 7.0, 8.0)],
            match_count: 0,
        };

        assert_eq!(decoded.dropped_count(), 0);
    }
}
