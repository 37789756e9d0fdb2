use axum::{
    Router,
    routing::{get, post},
    response::{IntoResponse, Response},
    http::{StatusCode, header},
    extract::{Path, Query, State, Multipart},
    Json,
};
use crate::arrow_io::encode_observations;
use crate::models::{CreateSessionResponse, CurrentObservation, FormatQuery, RawView, SessionMeta};
use crate::storage::{SessionStorage, StorageError};
use ocean_parser::{FishLogParser, Observation, StatusReport};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, debug, warn, error, instrument};

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SessionStorage>,
    pub parser: Arc<FishLogParser>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(SessionStorage::new()),
            parser: Arc::new(FishLogParser::default()),
        }
    }

    /// Default parser, or a fresh one when the request overrides the layout.
    fn parser_for(&self, query: &FormatQuery) -> Result<Arc<FishLogParser>, ApiError> {
        if !query.has_overrides() {
            return Ok(Arc::clone(&self.parser));
        }

        let format = query.apply(self.parser.format());
        debug!("Using request format override: {:?}", format);

        FishLogParser::new(format)
            .map(Arc::new)
            .map_err(|e| {
                warn!("Rejected format override: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/text", post(create_session_from_text))
        .route("/sessions/:id", get(get_meta).delete(delete_session))
        .route("/sessions/:id/meta", get(get_meta))
        .route("/sessions/:id/observations", get(get_observations))
        .route("/sessions/:id/observations.csv", get(get_observations_csv))
        .route("/sessions/:id/observations.arrow", get(get_observations_arrow))
        .route("/sessions/:id/current", get(get_current))
        .route("/sessions/:id/raw", get(get_raw))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn storage_error(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        StorageError::Poisoned => {
            error!("{}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn ingest(
    state: &AppState,
    parser: &FishLogParser,
    filename: &str,
    data: Vec<u8>,
) -> Result<CreateSessionResponse, ApiError> {
    let analysis = parser.parse_with_hint(Cursor::new(data.as_slice()), filename)
        .map_err(|e| {
            error!("Parse error for file '{}': {}", filename, e);
            (StatusCode::BAD_REQUEST, format!("Parse error: {}", e))
        })?;

    if analysis.observations().is_empty() {
        warn!("No valid observations found in '{}'", filename);
    }

    let raw_text = String::from_utf8_lossy(&data).into_owned();
    let meta = state.storage
        .create_session(filename, raw_text, parser.format(), analysis)
        .map_err(storage_error)?;

    info!(
        "Created session {} for '{}' with {} observations",
        meta.session_id, filename, meta.observation_count
    );

    Ok(CreateSessionResponse {
        session_id: meta.session_id,
        observation_count: meta.observation_count,
    })
}

#[instrument(skip(state, multipart))]
async fn create_session(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    mut multipart: Multipart,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    info!("Received file upload request");
    let parser = state.parser_for(&query)?;

    let mut file_data = Vec::new();
    let mut filename = String::new();

    while let Some(field) = multipart.next_field().await
        .map_err(|e| {
            error!("Multipart error: {}", e);
            (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e))
        })?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("unknown").to_string();
            info!("Receiving file: {}", filename);

            let data = field.bytes().await
                .map_err(|e| {
                    error!("Failed to read file data: {}", e);
                    (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                })?;
            file_data = data.to_vec();
            info!("File data received: {} bytes", file_data.len());
        }
    }

    if file_data.is_empty() {
        error!("No file data provided in request");
        return Err((StatusCode::BAD_REQUEST, "No file provided".to_string()));
    }

    ingest(&state, &parser, &filename, file_data).map(Json)
}

#[instrument(skip(state, body))]
async fn create_session_from_text(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    body: String,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    info!("Received pasted text: {} bytes", body.len());
    let parser = state.parser_for(&query)?;

    if body.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No text provided".to_string()));
    }

    let filename = query.filename.clone().unwrap_or_else(|| "pasted.txt".to_string());
    ingest(&state, &parser, &filename, body.into_bytes()).map(Json)
}

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionMeta>>, ApiError> {
    state.storage.list_meta().map(Json).map_err(storage_error)
}

async fn get_meta(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionMeta>, ApiError> {
    state.storage.read_meta(&session_id).map(Json).map_err(storage_error)
}

async fn get_observations(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Observation>>, ApiError> {
    state.storage
        .with_session(&session_id, |s| s.analysis.observations().to_vec())
        .map(Json)
        .map_err(storage_error)
}

#[instrument(skip(state))]
async fn get_observations_csv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let buffer = state.storage
        .with_session(&session_id, |s| {
            let mut buffer = Vec::new();
            ocean_parser::write_csv(s.analysis.observations(), &mut buffer).map(|_| buffer)
        })
        .map_err(storage_error)?
        .map_err(|e| {
            error!("CSV export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("CSV export failed: {}", e))
        })?;

    bytes_response("text/csv", buffer)
}

#[instrument(skip(state))]
async fn get_observations_arrow(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let buffer = state.storage
        .with_session(&session_id, |s| encode_observations(s.analysis.observations()))
        .map_err(storage_error)?
        .map_err(|e| {
            error!("Arrow encoding failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to write batch: {}", e))
        })?;

    bytes_response("application/vnd.apache.arrow.stream", buffer)
}

async fn get_current(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CurrentObservation>, ApiError> {
    let current = state.storage
        .with_session(&session_id, |s| s.analysis.current().cloned())
        .map_err(storage_error)?;

    match current {
        Some(observation) => Ok(Json(CurrentObservation {
            status: StatusReport::for_observation(&observation),
            observation,
        })),
        None => Err((StatusCode::NOT_FOUND, "No valid data found".to_string())),
    }
}

async fn get_raw(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RawView>, ApiError> {
    state.storage
        .with_session(&session_id, |s| RawView {
            raw_text: s.raw_text.clone(),
            combined_stream: s.analysis.extraction.combined_stream.clone(),
            records: s.analysis.extraction.records.clone(),
        })
        .map(Json)
        .map_err(storage_error)
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.storage.delete_session(&session_id).map_err(storage_error)?;
    info!("Deleted session {}", session_id);

    Ok(StatusCode::NO_CONTENT)
}

fn bytes_response(content_type: &'static str, buffer: Vec<u8>) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(axum::body::Body::from(buffer))
        .map_err(|e| {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to build response: {}", e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = "\
*FISH@a@b@c@d@e@f@g@h@7.2_32.9_21.0_-100.0_@i@j@k@ 2025-06-13 09:42:33
*FISH@a@b@c@d@e@f@g@h@9.1_31.0_16.0_5.0_@i@j@k@ 2025-06-13 09:43:33
";

    #[tokio::test]
    async fn test_ingest_and_read_current() {
        let state = AppState::new();
        let created = ingest(&state, &state.parser, "log.txt", TWO_RECORDS.as_bytes().to_vec())
            .unwrap();
        assert_eq!(created.observation_count, 2);

        let Json(current) = get_current(State(state.clone()), Path(created.session_id.clone()))
            .await
            .unwrap();
        assert_eq!(current.observation.id, 2);
        assert_eq!(current.observation.timestamp, "2025-06-13 09:43:33");
        assert_eq!(current.status, StatusReport::for_observation(&current.observation));
    }

    #[tokio::test]
    async fn test_upload_without_observations_still_creates_session() {
        let state = AppState::new();
        let created = ingest(&state, &state.parser, "empty.txt", b"no sensor records".to_vec())
            .unwrap();

        assert_eq!(created.observation_count, 0);
        let meta = state.storage.read_meta(&created.session_id).unwrap();
        assert_eq!(meta.record_count, 0);

        let err = get_current(State(state.clone()), Path(created.session_id))
            .await
            .unwrap_err();
        assert_eq!(err, (StatusCode::NOT_FOUND, "No valid data found".to_string()));
    }

    #[tokio::test]
    async fn test_current_for_unknown_session_is_not_found() {
        let err = get_current(State(AppState::new()), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_parser_for_overrides() {
        let state = AppState::new();

        let default = state.parser_for(&FormatQuery::default()).unwrap();
        assert!(Arc::ptr_eq(&default, &state.parser));

        let custom = state
            .parser_for(&FormatQuery {
                start_index: Some(1),
                end_index: Some(2),
                ..FormatQuery::default()
            })
            .unwrap();
        assert_eq!((custom.format().start_index, custom.format().end_index), (1, 2));
    }

    #[test]
    fn test_parser_for_rejects_invalid_overrides() {
        let state = AppState::new();

        let inverted = FormatQuery {
            start_index: Some(9),
            end_index: Some(8),
            ..FormatQuery::default()
        };
        assert_eq!(state.parser_for(&inverted).unwrap_err().0, StatusCode::BAD_REQUEST);

        let empty_marker = FormatQuery {
            marker: Some(String::new()),
            ..FormatQuery::default()
        };
        assert_eq!(state.parser_for(&empty_marker).unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_text_upload() {
        let state = AppState::new();
        let query = FormatQuery {
            filename: Some("paste.dat".to_string()),
            ..FormatQuery::default()
        };

        let Json(created) =
            create_session_from_text(State(state.clone()), Query(query), TWO_RECORDS.to_string())
                .await
                .unwrap();
        assert_eq!(created.observation_count, 2);
        assert_eq!(state.storage.read_meta(&created.session_id).unwrap().filename, "paste.dat");
    }

    #[tokio::test]
    async fn test_text_upload_rejects_blank_body() {
        let err = create_session_from_text(
            State(AppState::new()),
            Query(FormatQuery::default()),
            "  \n ".to_string(),
        )
        .await
        .unwrap_err();

        assert_eq!(err, (StatusCode::BAD_REQUEST, "No text provided".to_string()));
    }
}
