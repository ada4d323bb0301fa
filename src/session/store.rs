//! Blob-backed persistence for session histories
//!
//! Each session's history is one JSON blob at a path derived
//! deterministically from the session id. Saves overwrite the whole
//! document; there is no locking, so concurrent writers to one session are
//! last-writer-wins.

use crate::error::{FraudsightError, Result};
use crate::session::{SessionHistory, Turn};
use async_trait::async_trait;
use std::path::PathBuf;

/// Path-addressed text-blob storage
///
/// The production deployment backs this with a cloud bucket; the filesystem
/// implementation below covers local deployments and tests. No versioning.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob; `Ok(None)` when absent
    async fn get(&self, path: &str) -> Result<Option<String>>;

    /// Write a blob, overwriting any existing content
    async fn put(&self, path: &str, text: &str) -> Result<()>;
}

/// Filesystem-backed blob store
///
/// Blob paths map directly to files under a root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store using the default root
    ///
    /// The root resolves to the user data directory, overridable via the
    /// `FRAUDSIGHT_MEMORY_ROOT` environment variable so tests and deployments
    /// can point elsewhere without code changes.
    pub fn new() -> Result<Self> {
        if let Ok(override_root) = std::env::var("FRAUDSIGHT_MEMORY_ROOT") {
            return Ok(Self::new_with_root(override_root));
        }

        let proj_dirs = directories::ProjectDirs::from("com", "fraudsight", "fraudsight")
            .ok_or_else(|| {
                FraudsightError::Storage("Could not determine data directory".to_string())
            })?;
        Ok(Self::new_with_root(proj_dirs.data_dir()))
    }

    /// Create a store rooted at the given directory
    ///
    /// # Examples
    ///
    /// ```
    /// use fraudsight::session::FsBlobStore;
    ///
    /// let store = FsBlobStore::new_with_root("/tmp/fraudsight-memory");
    /// ```
    pub fn new_with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> Result<Option<String>> {
        let file = self.resolve(path);
        match std::fs::read_to_string(&file) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FraudsightError::Storage(format!(
                "Failed to read blob {}: {}",
                file.display(),
                e
            ))
            .into()),
        }
    }

    async fn put(&self, path: &str, text: &str) -> Result<()> {
        let file = self.resolve(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FraudsightError::Storage(format!(
                    "Failed to create blob directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(&file, text).map_err(|e| {
            FraudsightError::Storage(format!("Failed to write blob {}: {}", file.display(), e))
        })?;
        Ok(())
    }
}

/// Session history store over a blob backend
///
/// `load` treats an absent document as a valid first-message state;
/// `save` overwrites the full document.
pub struct SessionStore {
    blobs: Box<dyn BlobStore>,
    namespace: String,
}

impl SessionStore {
    /// Create a store writing under the given namespace prefix
    pub fn new(blobs: Box<dyn BlobStore>, namespace: impl Into<String>) -> Self {
        Self {
            blobs,
            namespace: namespace.into(),
        }
    }

    /// Deterministic blob path for a session's history document
    pub fn history_path(&self, session_id: &str) -> String {
        format!(
            "{}/{}/history_{}.json",
            self.namespace, session_id, session_id
        )
    }

    /// Load a session's turns; `Ok(None)` when no history exists yet
    pub async fn load(&self, session_id: &str) -> Result<Option<Vec<Turn>>> {
        let path = self.history_path(session_id);
        match self.blobs.get(&path).await? {
            Some(text) => {
                let history: SessionHistory = serde_json::from_str(&text).map_err(|e| {
                    FraudsightError::Storage(format!(
                        "Malformed history document for session {}: {}",
                        session_id, e
                    ))
                })?;
                Ok(Some(history.chat_history))
            }
            None => Ok(None),
        }
    }

    /// Persist the full turn sequence for a session
    ///
    /// Last-writer-wins: the entire document is overwritten.
    pub async fn save(&self, session_id: &str, turns: Vec<Turn>) -> Result<()> {
        let history = SessionHistory {
            session_id: session_id.to_string(),
            chat_history: turns,
        };
        let payload = serde_json::to_string(&history)?;
        self.blobs.put(&self.history_path(session_id), &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(
            Box::new(FsBlobStore::new_with_root(dir.path())),
            "gen-ai-memory/chat_history",
        );
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_absent_session_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.load("fresh-session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (_dir, store) = temp_store();
        let turns = vec![Turn::user("question"), Turn::assistant("answer")];

        store.save("s1", turns.clone()).await.unwrap();
        let loaded = store.load("s1").await.unwrap().unwrap();

        assert_eq!(loaded, turns);
    }

    #[tokio::test]
    async fn test_save_creates_blob_at_deterministic_path() {
        let (dir, store) = temp_store();
        store.save("abc", vec![Turn::user("hi")]).await.unwrap();

        let expected = dir
            .path()
            .join("gen-ai-memory/chat_history/abc/history_abc.json");
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_document() {
        let (_dir, store) = temp_store();
        store
            .save("s1", vec![Turn::user("old"), Turn::assistant("old answer")])
            .await
            .unwrap();
        store.save("s1", vec![Turn::user("new")]).await.unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].chat, "new");
    }

    #[test]
    fn test_history_path_shape() {
        let store = SessionStore::new(
            Box::new(FsBlobStore::new_with_root("/tmp/unused")),
            "gen-ai-memory/chat_history",
        );
        assert_eq!(
            store.history_path("xyz"),
            "gen-ai-memory/chat_history/xyz/history_xyz.json"
        );
    }

    #[tokio::test]
    async fn test_malformed_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobStore::new_with_root(dir.path());
        blobs
            .put("ns/s1/history_s1.json", "{broken")
            .await
            .unwrap();

        let store = SessionStore::new(Box::new(FsBlobStore::new_with_root(dir.path())), "ns");
        assert!(store.load("s1").await.is_err());
    }
}
