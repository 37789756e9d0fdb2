use crate::{Observation, ParseError};
use csv::Writer;
use std::io::Write;

const HEADER: [&str; 6] = [
    "id",
    "timestamp",
    "dissolvedOxygen",
    "salinity",
    "temperature",
    "pressure",
];

/// Writes observations as a CSV table with a header row.
pub fn write_csv<W: Write>(observations: &[Observation], writer: W) -> Result<(), ParseError> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for observation in observations {
        csv_writer.write_record([
            observation.id.to_string(),
            observation.timestamp.clone(),
            observation.dissolved_oxygen.to_string(),
            observation.salinity.to_string(),
            observation.temperature.to_string(),
            observation.pressure.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv() {
        let observations = vec![Observation {
            id: 4,
            timestamp: "2025-06-13 09:42:33".to_string(),
            dissolved_oxygen: 7.2,
            salinity: 32.9,
            temperature: 21.0,
            pressure: -100.0,
        }];

        let mut buffer = Vec::new();
        write_csv(&observations, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "id,timestamp,dissolvedOxygen,salinity,temperature,pressure\n\
             4,2025-06-13 09:42:33,7.2,32.9,21,-100\n"
        );
    }

    #[test]
    fn test_write_csv_empty_has_header() {
        let mut buffer = Vec::new();
        write_csv(&[], &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "id,timestamp,dissolvedOxygen,salinity,temperature,pressure\n"
        );
    }
}
