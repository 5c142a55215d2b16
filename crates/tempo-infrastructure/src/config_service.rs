//! Focus configuration loading.
//!
//! Reads `config.toml` from the tempo config directory, creating it with
//! defaults when missing so users have a file to edit.

use std::path::{Path, PathBuf};
use tempo_core::config::FocusConfig;
use tempo_core::error::{Result, TempoError};

use crate::paths::TempoPaths;

/// Loads and initializes the focus policy configuration.
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    /// Creates a service reading from the default location
    /// (`~/.config/tempo/config.toml`).
    pub fn default_location() -> Result<Self> {
        let config_path = TempoPaths::config_file()
            .map_err(|e| TempoError::config(format!("Failed to get config file path: {e}")))?;
        Ok(Self::new(config_path))
    }

    /// Creates a service reading from an explicit path.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Loads the configuration, writing defaults first if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written or parsed.
    pub fn load_or_init(&self) -> Result<FocusConfig> {
        if !self.config_path.exists() {
            let config = FocusConfig::default();
            if let Some(parent) = self.config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.config_path, toml::to_string_pretty(&config)?)?;
            tracing::info!(path = %self.config_path.display(), "Wrote default focus config");
            return Ok(config);
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: FocusConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
