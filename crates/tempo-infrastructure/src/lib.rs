//! Storage collaborators for Tempo.
//!
//! Directory-backed implementations of the core repository traits plus path
//! and configuration management. The domain layer never sees file paths;
//! everything behind `SessionRepository`/`HistoryRepository` is this crate's
//! business.

mod config_service;
mod dir_history_repository;
mod dir_session_repository;
pub mod paths;

pub use config_service::ConfigService;
pub use dir_history_repository::DirHistoryRepository;
pub use dir_session_repository::DirSessionRepository;
pub use paths::TempoPaths;
