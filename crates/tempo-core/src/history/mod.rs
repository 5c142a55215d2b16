//! History domain module.
//!
//! The durable, read-only collection of completed sessions.
//!
//! # Module Structure
//!
//! - `model`: Read-only projection of a completed session (`HistoryEntry`)
//! - `repository`: Append-only repository trait (`HistoryRepository`)
//! - `aggregator`: Read path and reconciliation (`HistoryAggregator`)

mod aggregator;
mod model;
mod repository;

// Re-export public API
pub use aggregator::HistoryAggregator;
pub use model::HistoryEntry;
pub use repository::HistoryRepository;
