//! Session domain module.
//!
//! This module contains the session entity, the repository interface and the
//! session store that owns all lifecycle transitions.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionStatus`)
//! - `repository`: Repository trait for session persistence
//! - `store`: Authoritative lifecycle management (`SessionStore`)

mod model;
mod repository;
mod store;

// Re-export public API
pub use model::{Session, SessionStatus};
pub use repository::SessionRepository;
pub use store::SessionStore;
