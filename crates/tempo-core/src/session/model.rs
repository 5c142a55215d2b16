//! Session domain model.
//!
//! This module contains the core Session entity that represents one timed
//! focus interval, from creation to completion.

use crate::error::{Result, TempoError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session.
///
/// The only legal transition is `Active -> Completed`; `Completed` is
/// terminal. There is no separate pending state: a session is active from
/// the moment the store returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Counting down.
    Active,
    /// Finished, carrying an end timestamp. Terminal.
    Completed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One timed focus interval owned by a user.
///
/// Invariants maintained by the session store:
/// - `end_time` is set if and only if `status == Completed`.
/// - A session transitions `Active -> Completed` at most once.
/// - `id`, `owner`, `duration_minutes` and `start_time` never change after
///   creation.
///
/// Remaining/elapsed time is always derived from `start_time` and
/// `duration_minutes`; it is never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format), assigned at creation.
    pub id: String,
    /// Identifier of the owning user.
    pub owner: String,
    /// Requested length in whole minutes, fixed at creation.
    pub duration_minutes: u32,
    /// Timestamp assigned by the session store at creation.
    pub start_time: DateTime<Utc>,
    /// Completion timestamp. Absent until completion, set exactly once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Current lifecycle state.
    pub status: SessionStatus,
}

impl Session {
    /// Session length in seconds, derived from `duration_minutes`.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// Returns true once the session has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Applies the single legal transition, stamping `end_time`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the session is already completed; callers are
    /// expected to check first and treat a repeated end as a no-op.
    pub(crate) fn mark_completed(&mut self, end_time: DateTime<Utc>) -> Result<()> {
        if self.is_completed() {
            return Err(TempoError::internal(format!(
                "session '{}' is already completed",
                self.id
            )));
        }
        self.end_time = Some(end_time);
        self.status = SessionStatus::Completed;
        Ok(())
    }
}
