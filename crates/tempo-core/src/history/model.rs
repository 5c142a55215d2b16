//! History domain model.

use crate::error::{Result, TempoError};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only projection of a completed session.
///
/// A snapshot taken at the moment a session was marked completed; never
/// mutated after being written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// ID of the completed session.
    pub id: String,
    /// Identifier of the owning user.
    pub owner: String,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// When the session completed.
    pub end_time: DateTime<Utc>,
    /// Session length in whole minutes.
    pub duration_minutes: u32,
}

impl HistoryEntry {
    /// Builds a snapshot from a completed session.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the session has not completed yet; only
    /// completed sessions become history.
    pub fn from_completed(session: &Session) -> Result<Self> {
        let end_time = match (session.is_completed(), session.end_time) {
            (true, Some(end_time)) => end_time,
            _ => {
                return Err(TempoError::internal(format!(
                    "session '{}' is not completed, cannot snapshot into history",
                    session.id
                )));
            }
        };

        Ok(Self {
            id: session.id.clone(),
            owner: session.owner.clone(),
            start_time: session.start_time,
            end_time,
            duration_minutes: session.duration_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn session(status: SessionStatus, end_time: Option<DateTime<Utc>>) -> Session {
        Session {
            id: "s-1".to_string(),
            owner: "u-1".to_string(),
            duration_minutes: 25,
            start_time: Utc::now(),
            end_time,
            status,
        }
    }

    #[test]
    fn test_snapshot_of_completed_session() {
        let end = Utc::now();
        let completed = session(SessionStatus::Completed, Some(end));
        let entry = HistoryEntry::from_completed(&completed).unwrap();

        assert_eq!(entry.id, completed.id);
        assert_eq!(entry.owner, completed.owner);
        assert_eq!(entry.end_time, end);
        assert_eq!(entry.duration_minutes, 25);
    }

    #[test]
    fn test_active_session_is_rejected() {
        let active = session(SessionStatus::Active, None);
        assert!(HistoryEntry::from_completed(&active).is_err());
    }
}
