//! Unified path management for tempo data files.
//!
//! All tempo configuration, session records and history entries live under
//! one config directory so every storage component resolves locations the
//! same way on every platform.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for tempo.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/tempo/             # Config directory
/// ├── config.toml              # Focus policy configuration
/// ├── sessions/                # Session records, one TOML file per session
/// └── history/                 # History entries, one directory per owner
///     └── <owner>/<id>.toml
/// ```
pub struct TempoPaths;

impl TempoPaths {
    /// Returns the tempo configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/tempo/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("tempo"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path of the focus policy config file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding session records.
    pub fn sessions_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("sessions"))
    }

    /// Returns the directory holding history entries.
    pub fn history_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("history"))
    }
}
