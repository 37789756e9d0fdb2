use ocean_parser::{Analysis, Observation, RecordFormat, RecordMetadata, StatusReport};
use serde::{Deserialize, Serialize};

/// Summary of one uploaded log, shown in the uploaded-files list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub session_id: String,
    pub filename: String,
    pub size_bytes: usize,
    pub upload_time: String,
    pub record_count: usize,
    pub match_count: usize,
    pub observation_count: usize,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
    pub format: RecordFormat,
}

impl SessionMeta {
    pub fn collect(
        session_id: &str,
        filename: &str,
        size_bytes: usize,
        upload_time: String,
        format: &RecordFormat,
        analysis: &Analysis,
    ) -> Self {
        let observations = analysis.observations();

        Self {
            session_id: session_id.to_string(),
            filename: filename.to_string(),
            size_bytes,
            upload_time,
            record_count: analysis.extraction.accepted_count,
            match_count: analysis.decoded.match_count,
            observation_count: observations.len(),
            first_timestamp: observations.first().map(|o| o.timestamp.clone()),
            last_timestamp: observations.last().map(|o| o.timestamp.clone()),
            format: format.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub observation_count: usize,
}

/// Optional per-upload overrides of the default record layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub start_index: Option<usize>,
    #[serde(default)]
    pub end_index: Option<usize>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl FormatQuery {
    pub fn has_overrides(&self) -> bool {
        self.marker.is_some() || self.start_index.is_some() || self.end_index.is_some()
    }

    pub fn apply(&self, base: &RecordFormat) -> RecordFormat {
        let mut format = base.clone();
        if let Some(marker) = &self.marker {
            format.marker = marker.clone();
        }
        if let Some(start_index) = self.start_index {
            format.start_index = start_index;
        }
        if let Some(end_index) = self.end_index {
            format.end_index = end_index;
        }
        format
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentObservation {
    pub observation: Observation,
    pub status: StatusReport,
}

/// Raw upload plus intermediate extraction output, for debugging displays.
#[derive(Debug, Clone, Serialize)]
pub struct RawView {
    pub raw_text: String,
    pub combined_stream: String,
    pub records: Vec<RecordMetadata>,
}
