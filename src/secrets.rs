//! Secret resolution for warehouse credentials
//!
//! Credentials are fetched once at process start from a secret provider and
//! injected into the components that need them; nothing here is re-read at
//! request time.

use crate::error::{FraudsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Database connection credentials
///
/// Field names mirror the secret document's JSON keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbCredentials {
    /// Host (or instance connection string) of the database
    #[serde(rename = "INSTANCE_CONNECTION_NAME")]
    pub instance_connection_name: String,
    /// Database user
    #[serde(rename = "DB_USER")]
    pub user: String,
    /// Database password
    #[serde(rename = "DB_PASS")]
    pub password: String,
    /// Database name
    #[serde(rename = "DB_NAME")]
    pub database: String,
}

/// Secret provider boundary
///
/// The hosted secret manager is consumed through this trait; the file-backed
/// implementation below covers local deployments and tests.
pub trait SecretProvider: Send + Sync {
    /// Fetch and parse the secret document for the given identifier
    fn fetch(&self, secret_id: &str) -> Result<DbCredentials>;
}

/// File-backed secret provider
///
/// Reads `{dir}/{secret_id}.json` containing the credential document.
pub struct FileSecretProvider {
    dir: PathBuf,
}

impl FileSecretProvider {
    /// Create a provider rooted at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SecretProvider for FileSecretProvider {
    fn fetch(&self, secret_id: &str) -> Result<DbCredentials> {
        let path = self.dir.join(format!("{}.json", secret_id));
        let payload = std::fs::read_to_string(&path).map_err(|e| {
            FraudsightError::Secret(format!(
                "Failed to read secret '{}' from {}: {}",
                secret_id,
                path.display(),
                e
            ))
        })?;
        let credentials: DbCredentials = serde_json::from_str(&payload)
            .map_err(|e| FraudsightError::Secret(format!("Malformed secret document: {}", e)))?;
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_parses_secret_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = serde_json::json!({
            "INSTANCE_CONNECTION_NAME": "db.internal:5432",
            "DB_USER": "analyst",
            "DB_PASS": "hunter2",
            "DB_NAME": "fraud"
        });
        std::fs::write(
            dir.path().join("db-credentials.json"),
            serde_json::to_string(&doc).unwrap(),
        )
        .unwrap();

        let provider = FileSecretProvider::new(dir.path());
        let credentials = provider.fetch("db-credentials").unwrap();

        assert_eq!(credentials.instance_connection_name, "db.internal:5432");
        assert_eq!(credentials.user, "analyst");
        assert_eq!(credentials.database, "fraud");
    }

    #[test]
    fn test_fetch_missing_secret_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileSecretProvider::new(dir.path());
        assert!(provider.fetch("absent").is_err());
    }

    #[test]
    fn test_fetch_malformed_secret_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let provider = FileSecretProvider::new(dir.path());
        assert!(provider.fetch("bad").is_err());
    }
}
