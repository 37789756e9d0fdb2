use crate::format::RecordFormat;
use crate::{Analysis, ObservationDecoder, ParseError, RecordExtractor};
use std::io::Read;
use tracing::{debug, info, warn};

/// Sensor log parser for one record layout.
///
/// Runs extraction then per-record decoding over a whole text blob.
#[derive(Debug, Clone, Default)]
pub struct FishLogParser {
    extractor: RecordExtractor,
    decoder: ObservationDecoder,
}

impl FishLogParser {
    pub fn new(format: RecordFormat) -> Result<Self, ParseError> {
        let decoder = ObservationDecoder::new(&format)?;
        let extractor = RecordExtractor::new(format)?;
        Ok(Self { extractor, decoder })
    }

    pub fn name(&self) -> &'static str {
        "fish"
    }

    /// File extensions accepted for upload
    pub fn extensions(&self) -> &'static [&'static str] {
        &["txt", "dat", "csv"]
    }

    pub fn format(&self) -> &RecordFormat {
        self.extractor.format()
    }

    /// Checks whether a sample looks like sensor output by looking for the
    /// record marker.
    pub fn can_parse(&self, data: &[u8]) -> bool {
        let sample = String::from_utf8_lossy(data);
        sample.contains(self.format().marker.as_str())
    }

    pub fn analyze(&self, raw: &str) -> Analysis {
        let extraction = self.extractor.extract(raw);
        let decoded = self.decoder.decode_records(&extraction.records);

        Analysis { extraction, decoded }
    }

    /// Reads the whole input and analyzes it. Invalid UTF-8 is replaced
    /// rather than rejected, so only read failures surface as errors.
    pub fn parse<R: Read>(&self, mut reader: R) -> Result<Analysis, ParseError> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        debug!("Read {} bytes of sensor data", buffer.len());

        let text = String::from_utf8_lossy(&buffer);
        let analysis = self.analyze(&text);

        info!(
            "Parsed {} records into {} observations ({} dropped)",
            analysis.extraction.accepted_count,
            analysis.decoded.observations.len(),
            analysis.decoded.dropped_count()
        );

        Ok(analysis)
    }

    /// Parse with a filename hint. Unknown extensions are parsed anyway.
    pub fn parse_with_hint<R: Read>(
        &self,
        reader: R,
        filename: &str,
    ) -> Result<Analysis, ParseError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if self.extensions().contains(&extension.as_str()) {
            debug!("Parsing '{}' as {} log", filename, self.name());
        } else {
            warn!(
                "Unsupported extension '.{}' for '{}', parsing as {} log anyway",
                extension,
                filename,
                self.name()
            );
        }

        self.parse(reader)
    }
}
