use crate::models::SessionMeta;
use chrono::Local;
use ocean_parser::{Analysis, RecordFormat};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session store lock poisoned")]
    Poisoned,
}

/// One analyzed upload.
#[derive(Debug, Clone)]
pub struct Session {
    pub meta: SessionMeta,
    pub raw_text: String,
    pub analysis: Analysis,
}

/// In-memory session store. Sessions live until deleted or the process
/// exits.
#[derive(Default)]
pub struct SessionStorage {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(
        &self,
        filename: &str,
        raw_text: String,
        format: &RecordFormat,
        analysis: Analysis,
    ) -> Result<SessionMeta, StorageError> {
        let session_id = Uuid::new_v4().to_string();
        let upload_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let meta = SessionMeta::collect(
            &session_id,
            filename,
            raw_text.len(),
            upload_time,
            format,
            &analysis,
        );

        let session = Session {
            meta: meta.clone(),
            raw_text,
            analysis,
        };

        self.sessions
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert(session_id, session);

        Ok(meta)
    }

    /// Runs `f` against a stored session without cloning it.
    pub fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&Session) -> T,
    ) -> Result<T, StorageError> {
        let sessions = self.sessions.read().map_err(|_| StorageError::Poisoned)?;
        sessions
            .get(session_id)
            .map(f)
            .ok_or_else(|| StorageError::NotFound(session_id.to_string()))
    }

    pub fn read_meta(&self, session_id: &str) -> Result<SessionMeta, StorageError> {
        self.with_session(session_id, |session| session.meta.clone())
    }

    /// All sessions, oldest upload first.
    pub fn list_meta(&self) -> Result<Vec<SessionMeta>, StorageError> {
        let sessions = self.sessions.read().map_err(|_| StorageError::Poisoned)?;
        let mut metas: Vec<SessionMeta> = sessions.values().map(|s| s.meta.clone()).collect();
        metas.sort_by(|a, b| {
            a.upload_time
                .cmp(&b.upload_time)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(metas)
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), StorageError> {
        self.sessions
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "*FISH@a@b@c@d@e@f@g@h@7.2_32.9_21.0_-100.0_@i@ 2025-06-13 09:42:33";

    fn store_one(storage: &SessionStorage, filename: &str) -> SessionMeta {
        let analysis = ocean_parser::analyze(RAW);
        storage
            .create_session(filename, RAW.to_string(), &RecordFormat::default(), analysis)
            .unwrap()
    }

    #[test]
    fn test_create_and_read() {
        let storage = SessionStorage::new();
        let meta = store_one(&storage, "a.txt");

        assert_eq!(meta.observation_count, 1);
        assert_eq!(meta.size_bytes, RAW.len());

        let read = storage.read_meta(&meta.session_id).unwrap();
        assert_eq!(read.filename, "a.txt");

        let current_id = storage
            .with_session(&meta.session_id, |s| s.analysis.current().map(|o| o.id))
            .unwrap();
        assert_eq!(current_id, Some(1));
    }

    #[test]
    fn test_list_and_delete() {
        let storage = SessionStorage::new();
        let first = store_one(&storage, "a.txt");
        store_one(&storage, "b.txt");

        assert_eq!(storage.list_meta().unwrap().len(), 2);

        storage.delete_session(&first.session_id).unwrap();
        let remaining = storage.list_meta().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].filename, "b.txt");

        assert!(matches!(
            storage.delete_session(&first.session_id),
            Err(StorageError::NotFound(_))
        ));
        assert!(storage.read_meta("missing").is_err());
    }
}
