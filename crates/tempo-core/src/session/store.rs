//! Session store: the single source of truth for session identity and
//! completion state.
//!
//! All lifecycle transitions go through [`SessionStore`]; repositories only
//! persist what the store hands them. The store guarantees:
//! - `start_time`/`end_time` are stamped from its [`Clock`], never by callers
//! - a session completes at most once (`end` is idempotent)
//! - no update or delete beyond the single `Active -> Completed` transition

use super::model::{Session, SessionStatus};
use super::repository::SessionRepository;
use crate::clock::Clock;
use crate::error::{Result, TempoError};
use std::sync::Arc;
use uuid::Uuid;

/// Authoritative record keeper for focus sessions.
pub struct SessionStore {
    /// Persistent storage backend for session records.
    repository: Arc<dyn SessionRepository>,
    /// Time source for authoritative timestamps.
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Creates a new `SessionStore`.
    ///
    /// # Arguments
    ///
    /// * `repository` - The repository backend for session persistence
    /// * `clock` - The time source used to stamp start/end boundaries
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Starts a new session for `owner` and returns the full record.
    ///
    /// Allocates a fresh UUID, stamps `start_time` from the clock and
    /// persists the record with `status = Active`.
    ///
    /// Note: `start` is not idempotent. A retry after an ambiguous failure
    /// may create a duplicate session; callers that need stronger guarantees
    /// must deduplicate on their side (no idempotency key is accepted).
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `owner` is blank (identity not established)
    /// - `InvalidInput` if `duration_minutes` is zero
    /// - storage errors from the repository
    pub async fn start(&self, owner: &str, duration_minutes: u32) -> Result<Session> {
        if owner.trim().is_empty() {
            return Err(TempoError::unauthorized(
                "cannot start a session without an owner",
            ));
        }
        if duration_minutes == 0 {
            return Err(TempoError::invalid_input(
                "duration must be a positive number of minutes",
            ));
        }

        let session = Session {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            duration_minutes,
            start_time: self.clock.now(),
            end_time: None,
            status: SessionStatus::Active,
        };

        self.repository.save(&session).await?;
        tracing::info!(
            session_id = %session.id,
            owner = %session.owner,
            duration_minutes,
            "Session started"
        );

        Ok(session)
    }

    /// Ends the session with the given ID and returns the updated record.
    ///
    /// Idempotent: ending an already-completed session returns the existing
    /// record unchanged, with no error and no second `end_time` stamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no session with `session_id` exists
    /// - storage errors from the repository
    pub async fn end(&self, session_id: &str) -> Result<Session> {
        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| TempoError::not_found("session", session_id))?;

        if session.is_completed() {
            tracing::debug!(session_id = %session.id, "End requested for completed session, returning as-is");
            return Ok(session);
        }

        let end_time = self.clock.now();
        session.mark_completed(end_time)?;
        self.repository.save(&session).await?;
        tracing::info!(
            session_id = %session.id,
            owner = %session.owner,
            end_time = %end_time.to_rfc3339(),
            "Session completed"
        );

        Ok(session)
    }

    /// Finds a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session with `session_id` exists.
    pub async fn find(&self, session_id: &str) -> Result<Session> {
        self.repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| TempoError::not_found("session", session_id))
    }

    /// Lists all stored sessions.
    pub async fn list(&self) -> Result<Vec<Session>> {
        self.repository.list_all().await
    }
}
