//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for session records.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the store's lifecycle logic from the specific storage mechanism
/// (e.g., TOML files, database, remote API).
///
/// The session entity is append-only except for the single
/// `Active -> Completed` transition, so no delete operation exists.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Saves a session to storage, overwriting any record with the same ID.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Lists all stored sessions, in no particular order.
    async fn list_all(&self) -> Result<Vec<Session>>;
}
