//! Core domain logic for Tempo: the focus session lifecycle.
//!
//! A focus session is created by the [`session::SessionStore`], counted down
//! on the client by the [`countdown::CountdownController`], completed exactly
//! once through the [`completion::CompletionArbiter`] and finally surfaced as
//! immutable history by the [`history::HistoryAggregator`].
//!
//! Persistence and identity are collaborators behind traits
//! ([`session::SessionRepository`], [`history::HistoryRepository`]); this
//! crate owns the state transitions, not the storage.

pub mod clock;
pub mod completion;
pub mod config;
pub mod countdown;
pub mod error;
pub mod history;
pub mod session;

// Re-export common error type
pub use error::{Result, TempoError};
