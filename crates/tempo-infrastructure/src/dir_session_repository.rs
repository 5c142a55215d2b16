//! Directory-backed SessionRepository implementation.
//!
//! Stores one TOML file per session under a `sessions/` directory. The store
//! owns all lifecycle transitions, so `save` simply overwrites the record;
//! there is no delete.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempo_core::error::{Result, TempoError};
use tempo_core::session::{Session, SessionRepository};
use tokio::fs;

use crate::paths::TempoPaths;

/// File-per-record session repository.
///
/// Directory structure:
/// ```text
/// base_dir/
/// └── sessions/
///     ├── <session-id-1>.toml
///     └── <session-id-2>.toml
/// ```
pub struct DirSessionRepository {
    sessions_dir: PathBuf,
}

impl DirSessionRepository {
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

    /// Creates a new `DirSessionRepository` under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `sessions/` directory cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let sessions_dir = base_dir.as_ref().join("sessions");
        fs::create_dir_all(&sessions_dir).await?;
        Ok(Self { sessions_dir })
    }

    fn record_path(&self, session_id: &str) -> Option<PathBuf> {
        // Session IDs are UUIDs; anything that could traverse out of the
        // sessions directory is treated as unknown.
        if session_id.is_empty()
            || session_id.contains(['/', '\\'])
            || session_id.contains("..")
        {
            return None;
        }
        Some(self.sessions_dir.join(format!("{session_id}.toml")))
    }
}

#[async_trait]
impl SessionRepository for DirSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(path) = self.record_path(session_id) else {
            return Ok(None);
        };

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let session: Session = toml::from_str(&content)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let path = self.record_path(&session.id).ok_or_else(|| {
            TempoError::invalid_input(format!("invalid session id '{}'", session.id))
        })?;

        let content = toml::to_string_pretty(session)?;

        // Write to a sibling temp file first so a crash mid-write cannot
        // leave a torn record behind.
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &path).await?;

        tracing::debug!(session_id = %session.id, path = %path.display(), "Session record saved");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.sessions_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }

            match fs::read_to_string(&path).await {
                Ok(content) => match toml::from_str::<Session>(&content) {
                    Ok(session) => sessions.push(session),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable session record");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable session record");
                }
            }
        }

        Ok(sessions)
    }
}
