//! History repository trait.

use super::model::HistoryEntry;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the durable history of completed sessions.
///
/// History is append-only: entries are inserted once and never updated or
/// deleted. The repository itself guarantees no ordering; the aggregator
/// orders for display.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Inserts an entry. Write-once: inserting an entry whose ID already
    /// exists for the owner is an error.
    async fn append(&self, entry: &HistoryEntry) -> Result<()>;

    /// Returns all entries belonging to `owner`, in no particular order.
    async fn query(&self, owner: &str) -> Result<Vec<HistoryEntry>>;
}
