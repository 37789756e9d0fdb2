//! Water-quality labels for the primary measurements.
//!
//! Breakpoints:
//!
//! | measurement      | good       | moderate   | warning    |
//! |------------------|------------|------------|------------|
//! | dissolved oxygen | > 8 mg/L   | > 5 mg/L   | otherwise  |
//! | salinity         | 30–35 PPT  | 25–40 PPT  | otherwise  |
//! | temperature      | 15–25 °C   | 10–30 °C   | otherwise  |
//!
//! Ranges are inclusive at both ends.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    DissolvedOxygen,
    Salinity,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Good,
    Moderate,
    Warning,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Good => "good",
            Status::Moderate => "moderate",
            Status::Warning => "warning",
        };
        f.write_str(label)
    }
}

pub fn classify(measurement: Measurement, value: f64) -> Status {
    match measurement {
        Measurement::DissolvedOxygen => {
            if value > 8.0 {
                Status::Good
            } else if value > 5.0 {
                Status::Moderate
            } else {
                Status::Warning
            }
        }
        Measurement::Salinity => banded(value, 30.0..=35.0, 25.0..=40.0),
        Measurement::Temperature => banded(value, 15.0..=25.0, 10.0..=30.0),
    }
}

fn banded(
    value: f64,
    good: std::ops::RangeInclusive<f64>,
    moderate: std::ops::RangeInclusive<f64>,
) -> Status {
    if good.contains(&value) {
        Status::Good
    } else if moderate.contains(&value) {
        Status::Moderate
    } else {
        Status::Warning
    }
}

impl Observation {
    pub fn status(&self, measurement: Measurement) -> Status {
        classify(measurement, self.value(measurement))
    }
}

/// Labels for the three primary measurements of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub dissolved_oxygen: Status,
    pub salinity: Status,
    pub temperature: Status,
}

impl StatusReport {
    pub fn for_observation(observation: &Observation) -> Self {
        Self {
            dissolved_oxygen: observation.status(Measurement::DissolvedOxygen),
            salinity: observation.status(Measurement::Salinity),
            temperature: observation.status(Measurement::Temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dissolved_oxygen_breakpoints() {
        assert_eq!(classify(Measurement::DissolvedOxygen, 8.1), Status::Good);
        assert_eq!(classify(Measurement::DissolvedOxygen, 8.0), Status::Moderate);
        assert_eq!(classify(Measurement::DissolvedOxygen, 5.0), Status::Warning);
        assert_eq!(classify(Measurement::DissolvedOxygen, -1.0), Status::Warning);
    }

    #[test]
    fn test_salinity_breakpoints() {
        assert_eq!(classify(Measurement::Salinity, 30.0), Status::Good);
        assert_eq!(classify(Measurement::Salinity, 35.0), Status::Good);
        assert_eq!(classify(Measurement::Salinity, 25.0), Status::Moderate);
        assert_eq!(classify(Measurement::Salinity, 40.0), Status::Moderate);
        assert_eq!(classify(Measurement::Salinity, 40.5), Status::Warning);
    }

    #[test]
    fn test_temperature_breakpoints() {
        assert_eq!(classify(Measurement::Temperature, 21.0), Status::Good);
        assert_eq!(classify(Measurement::Temperature, 10.0), Status::Moderate);
        assert_eq!(classify(Measurement::Temperature, 9.9), Status::Warning);
        assert_eq!(classify(Measurement::Temperature, 31.0), Status::Warning);
    }

    #[test]
    fn test_report_for_observation() {
        let observation = Observation {
            id: 1,
            timestamp: String::new(),
            dissolved_oxygen: 7.2,
            salinity: 32.9,
            temperature: 21.0,
            pressure: -100.0,
        };

        let report = StatusReport::for_observation(&observation);
        assert_eq!(report.dissolved_oxygen, Status::Moderate);
        assert_eq!(report.salinity, Status::Good);
        assert_eq!(report.temperature, Status::Good);
        assert_eq!(report.dissolved_oxygen.to_string(), "moderate");
    }
}
