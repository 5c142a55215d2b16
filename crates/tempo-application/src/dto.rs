//! DTOs for the session request/response contract.
//!
//! The session store is exposed to transports as two operations, `start` and
//! `end`. These types define the shape of those messages independently of any
//! wire encoding; timestamps travel as RFC 3339 strings. The transport layer
//! itself (HTTP, IPC, ...) lives outside this workspace.

use serde::{Deserialize, Serialize};
use tempo_core::TempoError;
use tempo_core::history::HistoryEntry;
use tempo_core::session::Session;

/// Request body of the `start` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    /// Identifier of the requesting user.
    pub owner: String,
    /// Requested session length in whole minutes.
    pub duration_minutes: u32,
}

/// Request body of the `end` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndSessionRequest {
    /// ID of the session to end.
    pub id: String,
}

/// Response body of both session operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub owner: String,
    /// RFC 3339 timestamp.
    pub start_time: String,
    /// RFC 3339 timestamp; absent until the session completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub duration_minutes: u32,
    /// `"active"` or `"completed"`.
    pub status: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            owner: session.owner.clone(),
            start_time: session.start_time.to_rfc3339(),
            end_time: session.end_time.map(|t| t.to_rfc3339()),
            duration_minutes: session.duration_minutes,
            status: session.status.to_string(),
        }
    }
}

/// One history listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntryResponse {
    pub id: String,
    pub owner: String,
    /// RFC 3339 timestamp.
    pub start_time: String,
    /// RFC 3339 timestamp.
    pub end_time: String,
    pub duration_minutes: u32,
}

impl From<&HistoryEntry> for HistoryEntryResponse {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            owner: entry.owner.clone(),
            start_time: entry.start_time.to_rfc3339(),
            end_time: entry.end_time.to_rfc3339(),
            duration_minutes: entry.duration_minutes,
        }
    }
}

/// Maps a domain error to the status code a transport should answer with.
///
/// Only the input, identity and lookup failures have contractual codes;
/// everything else is a server-side condition.
pub fn error_status(error: &TempoError) -> u16 {
    match error {
        TempoError::InvalidInput(_) => 400,
        TempoError::Unauthorized(_) => 401,
        TempoError::NotFound { .. } => 404,
        TempoError::Transient(_) | TempoError::Io { .. } => 503,
        TempoError::HistoryWrite(_)
        | TempoError::Serialization { .. }
        | TempoError::Config(_)
        | TempoError::Internal(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempo_core::session::SessionStatus;

    #[test]
    fn test_session_response_shape() {
        let start_time = Utc::now();
        let session = Session {
            id: "s-1".to_string(),
            owner: "u1".to_string(),
            duration_minutes: 25,
            start_time,
            end_time: None,
            status: SessionStatus::Active,
        };

        let response = SessionResponse::from(&session);
        assert_eq!(response.duration_minutes, 25);
        assert_eq!(response.status, "active");
        assert!(response.end_time.is_none());

        // An active session serializes without an end_time key.
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("end_time").is_none());
    }

    #[test]
    fn test_completed_session_response_carries_end_time() {
        let start_time = Utc::now();
        let session = Session {
            id: "s-1".to_string(),
            owner: "u1".to_string(),
            duration_minutes: 25,
            start_time,
            end_time: Some(start_time + Duration::minutes(25)),
            status: SessionStatus::Completed,
        };

        let response = SessionResponse::from(&session);
        assert_eq!(response.status, "completed");
        assert!(response.end_time.is_some());
    }

    #[test]
    fn test_requests_parse_from_json() {
        let start: StartSessionRequest =
            serde_json::from_str(r#"{"owner":"u1","duration_minutes":25}"#).unwrap();
        assert_eq!(start.owner, "u1");
        assert_eq!(start.duration_minutes, 25);

        let end: EndSessionRequest = serde_json::from_str(r#"{"id":"s-1"}"#).unwrap();
        assert_eq!(end.id, "s-1");
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&TempoError::invalid_input("bad")), 400);
        assert_eq!(error_status(&TempoError::unauthorized("who")), 401);
        assert_eq!(error_status(&TempoError::not_found("session", "x")), 404);
        assert_eq!(error_status(&TempoError::transient("down")), 503);
        assert_eq!(error_status(&TempoError::internal("bug")), 500);
    }
}
