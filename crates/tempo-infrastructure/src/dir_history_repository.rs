//! Directory-backed HistoryRepository implementation.
//!
//! History is append-only: each entry is written exactly once as
//! `history/<owner>/<id>.toml` and never touched again. Queries scan the
//! owner's directory, skipping unreadable entries with a warning.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempo_core::error::{Result, TempoError};
use tempo_core::history::{HistoryEntry, HistoryRepository};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::paths::TempoPaths;

/// File-per-entry, write-once history repository.
pub struct DirHistoryRepository {
    history_dir: PathBuf,
}

impl DirHistoryRepository {
    /// Creates a repository at the default location (`~/.config/tempo`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    /// or the directory structure cannot be created.
    pub async fn default_location() -> Result<Self> {
        let base_dir = TempoPaths::config_dir()
            .map_err(|e| TempoError::config(format!("Failed to get config directory: {e}")))?;
        Self::new(base_dir).await
    }

    /// Creates a new `DirHistoryRepository` under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `history/` directory cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let history_dir = base_dir.as_ref().join("history");
        fs::create_dir_all(&history_dir).await?;
        Ok(Self { history_dir })
    }

    fn validate_component(value: &str, what: &str) -> Result<()> {
        if value.is_empty() || value.contains(['/', '\\']) || value.contains("..") {
            return Err(TempoError::invalid_input(format!(
                "invalid {what} '{value}' for history path"
            )));
        }
        Ok(())
    }

    fn owner_dir(&self, owner: &str) -> Result<PathBuf> {
        Self::validate_component(owner, "owner")?;
        Ok(self.history_dir.join(owner))
    }
}

#[async_trait]
impl HistoryRepository for DirHistoryRepository {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        Self::validate_component(&entry.id, "entry id")?;
        let owner_dir = self.owner_dir(&entry.owner)?;
        fs::create_dir_all(&owner_dir).await?;

        let path = owner_dir.join(format!("{}.toml", entry.id));
        let content = toml::to_string_pretty(entry)?;

        // create_new enforces write-once: an existing entry is never
        // overwritten.
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(TempoError::invalid_input(format!(
                    "history entry '{}' already exists for owner '{}'",
                    entry.id, entry.owner
                )));
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(entry_id = %entry.id, owner = %entry.owner, "History entry written");
        Ok(())
    }

    async fn query(&self, owner: &str) -> Result<Vec<HistoryEntry>> {
        let owner_dir = self.owner_dir(owner)?;

        let mut dir = match fs::read_dir(&owner_dir).await {
            Ok(dir) => dir,
            // No completed sessions for this owner yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(file) = dir.next_entry().await? {
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }

            match fs::read_to_string(&path).await {
                Ok(content) => match toml::from_str::<HistoryEntry>(&content) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable history entry");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable history entry");
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(id: &str, owner: &str) -> HistoryEntry {
        let start_time = Utc::now() - Duration::minutes(30);
        HistoryEntry {
            id: id.to_string(),
            owner: owner.to_string(),
            start_time,
            end_time: start_time + Duration::minutes(25),
            duration_minutes: 25,
        }
    }

    #[tokio::test]
    async fn test_append_and_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirHistoryRepository::new(dir.path()).await.unwrap();

        let original = entry("s-1", "u1");
        repo.append(&original).await.unwrap();

        let entries = repo.query("u1").await.unwrap();
        assert_eq!(entries, vec![original]);
    }

    #[tokio::test]
    async fn test_append_is_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirHistoryRepository::new(dir.path()).await.unwrap();

        let original = entry("s-1", "u1");
        repo.append(&original).await.unwrap();

        let err = repo.append(&original).await.unwrap_err();
        assert!(err.is_invalid_input());

        // The stored entry is untouched.
        let entries = repo.query("u1").await.unwrap();
        assert_eq!(entries, vec![original]);
    }

    #[tokio::test]
    async fn test_query_is_scoped_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirHistoryRepository::new(dir.path()).await.unwrap();

        repo.append(&entry("s-1", "u1")).await.unwrap();
        repo.append(&entry("s-2", "u2")).await.unwrap();

        let entries = repo.query("u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().all(|e| e.owner == "u1"));
    }

    #[tokio::test]
    async fn test_query_unknown_owner_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirHistoryRepository::new(dir.path()).await.unwrap();
        assert!(repo.query("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_owner_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirHistoryRepository::new(dir.path()).await.unwrap();
        let err = repo.query("../escape").await.unwrap_err();
        assert!(err.is_invalid_input());
    }
}
