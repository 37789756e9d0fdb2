// Parser crate for ocean sensor logs
// Record extraction and observation decoding over raw "*FISH" output

pub mod types;
pub mod format;
pub mod numeric;
pub mod extractor;
pub mod decoder;
pub mod status;
pub mod export;
pub mod log_parser;

// Re-export main types
pub use types::*;
pub use format::RecordFormat;
pub use extractor::RecordExtractor;
pub use decoder::ObservationDecoder;
pub use status::{classify, Measurement, Status, StatusReport};
pub use export::write_csv;
pub use log_parser::FishLogParser;

/// Extract and decode with the default record layout.
pub fn analyze(raw: &str) -> Analysis {
    FishLogParser::default().analyze(raw)
}
