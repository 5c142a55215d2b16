//! History aggregation: the read path answering "what sessions has this
//! owner completed?".
//!
//! The aggregator is eventually consistent with the session store: a
//! completed session becomes visible here once its snapshot has been
//! written through, which is best-effort rather than synchronous. The
//! [`reconcile`](HistoryAggregator::reconcile) pass repairs snapshots that
//! were dropped by an earlier history write failure.

use super::model::HistoryEntry;
use super::repository::HistoryRepository;
use crate::error::{Result, TempoError};
use crate::session::Session;
use std::sync::Arc;

/// Read-side service over the history persistence collaborator.
pub struct HistoryAggregator {
    /// Persistent storage backend for history entries.
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryAggregator {
    /// Creates a new `HistoryAggregator`.
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// Records a snapshot of a completed session.
    ///
    /// # Errors
    ///
    /// - `Internal` if the session is not completed
    /// - `HistoryWrite` if the persistence collaborator rejected the insert;
    ///   the session itself remains correctly completed at the store
    pub async fn record(&self, session: &Session) -> Result<HistoryEntry> {
        let entry = HistoryEntry::from_completed(session)?;
        self.repository
            .append(&entry)
            .await
            .map_err(|e| TempoError::history_write(e.to_string()))?;
        tracing::debug!(
            session_id = %entry.id,
            owner = %entry.owner,
            "History entry recorded"
        );
        Ok(entry)
    }

    /// Lists the completed sessions of `owner`, newest first.
    ///
    /// Re-queries the collaborator on every call; ordering by `start_time`
    /// descending is a display convention, not a storage guarantee.
    pub async fn list(&self, owner: &str) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.repository.query(owner).await?;
        entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(entries)
    }

    /// Re-records completed sessions missing from history.
    ///
    /// Takes the store's view of completed sessions and appends any whose
    /// snapshot never made it into history (e.g., after a transient
    /// `HistoryWrite` failure). Sessions that are not completed are skipped.
    ///
    /// # Returns
    ///
    /// The number of entries repaired.
    pub async fn reconcile(&self, completed_sessions: &[Session]) -> Result<usize> {
        let mut repaired = 0;
        let mut skipped_active = 0;

        for session in completed_sessions {
            if !session.is_completed() {
                skipped_active += 1;
                continue;
            }

            let known = self.repository.query(&session.owner).await?;
            if known.iter().any(|entry| entry.id == session.id) {
                continue;
            }

            match self.record(session).await {
                Ok(_) => repaired += 1,
                Err(e) => {
                    // Leave it for the next pass; reconciliation must not
                    // abort on a single bad entry.
                    tracing::warn!(
                        session_id = %session.id,
                        error = %e,
                        "Failed to repair history entry"
                    );
                }
            }
        }

        if repaired > 0 || skipped_active > 0 {
            tracing::info!(
                target: "history_sync",
                repaired,
                skipped_active,
                "History reconciliation pass finished"
            );
        }

        Ok(repaired)
    }
}
