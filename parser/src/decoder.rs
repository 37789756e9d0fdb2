use crate::format::RecordFormat;
use crate::numeric::{
    default_observation_regex, fallback_timestamp, observation_pattern, parse_measurement,
};
use crate::{Decoded, Observation, ParseError, RecordMetadata};
use regex::{Captures, Regex};
use tracing::debug;

/// Turns delimited numeric fields into [`Observation`]s.
#[derive(Debug, Clone)]
pub struct ObservationDecoder {
    pattern: Regex,
    delimiter: char,
}

impl Default for ObservationDecoder {
    fn default() -> Self {
        Self {
            pattern: default_observation_regex().clone(),
            delimiter: RecordFormat::default().delimiter,
        }
    }
}

impl ObservationDecoder {
    pub fn new(format: &RecordFormat) -> Result<Self, ParseError> {
        format.validate()?;
        let pattern = Regex::new(&observation_pattern(format.delimiter, format.inner_delimiter))?;

        Ok(Self {
            pattern,
            delimiter: format.delimiter,
        })
    }

    /// Decodes a combined stream, pairing the k-th match with `records[k]`.
    ///
    /// Matches beyond the end of `records` get a wall-clock timestamp.
    pub fn decode(&self, stream: &str, records: &[RecordMetadata]) -> Decoded {
        let mut match_count = 0;
        let mut observations = Vec::new();

        for (k, caps) in self.pattern.captures_iter(stream).enumerate() {
            match_count += 1;
            let timestamp = match records.get(k) {
                Some(record) => record.timestamp.clone(),
                None => {
                    debug!("No record for match {}, using current time", k + 1);
                    fallback_timestamp()
                }
            };

            let observation = observation_from(&caps, k as u32 + 1, timestamp);
            if observation.is_retained() {
                observations.push(observation);
            }
        }

        debug!(
            "Decoded {} matches, kept {}",
            match_count,
            observations.len()
        );

        Decoded {
            observations,
            match_count,
        }
    }

    /// Decodes each record's slice on its own so every observation carries
    /// the timestamp of the record it came from.
    ///
    /// Ids run across all records in match order, exactly as [`decode`]
    /// numbers them on well-formed input.
    ///
    /// [`decode`]: ObservationDecoder::decode
    pub fn decode_records(&self, records: &[RecordMetadata]) -> Decoded {
        let mut match_count = 0;
        let mut observations = Vec::new();

        for record in records {
            let wrapped = format!("{d}{}{d}", record.slice_text, d = self.delimiter);
            let before = match_count;

            for caps in self.pattern.captures_iter(&wrapped) {
                match_count += 1;
                let id = match_count as u32;
                let observation = observation_from(&caps, id, record.timestamp.clone());
                if observation.is_retained() {
                    observations.push(observation);
                }
            }

            if match_count == before {
                debug!("Record {} has no decodable field", record.sequence_index);
            }
        }

        debug!(
            "Decoded {} matches from {} records, kept {}",
            match_count,
            records.len(),
            observations.len()
        );

        Decoded {
            observations,
            match_count,
        }
    }
}

fn observation_from(caps: &Captures<'_>, id: u32, timestamp: String) -> Observation {
    Observation {
        id,
        timestamp,
        dissolved_oxygen: parse_measurement(&caps[1]),
        salinity: parse_measurement(&caps[2]),
        temperature: parse_measurement(&caps[3]),
        pressure: parse_measurement(&caps[4]),
    }
}
