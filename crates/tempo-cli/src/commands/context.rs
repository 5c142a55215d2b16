//! Shared wiring for CLI commands.

use anyhow::Result;
use std::sync::Arc;
use tempo_application::{FixedIdentity, FocusUseCase};
use tempo_core::clock::SystemClock;
use tempo_core::history::HistoryAggregator;
use tempo_core::session::SessionStore;
use tempo_infrastructure::{ConfigService, DirHistoryRepository, DirSessionRepository};

/// Builds a `FocusUseCase` over the default on-disk storage.
pub async fn build_usecase(owner: Option<String>) -> Result<Arc<FocusUseCase>> {
    let identity = match owner {
        Some(owner) => FixedIdentity::signed_in(owner),
        None => FixedIdentity::signed_out(),
    };

    let config = ConfigService::default_location()?.load_or_init()?;
    let session_repo = Arc::new(DirSessionRepository::default_location().await?);
    let history_repo = Arc::new(DirHistoryRepository::default_location().await?);

    let clock = Arc::new(SystemClock);
    let store = Arc::new(SessionStore::new(session_repo, clock.clone()));
    let history = Arc::new(HistoryAggregator::new(history_repo));

    Ok(Arc::new(FocusUseCase::new(
        store,
        history,
        clock,
        Arc::new(identity),
        config,
    )))
}

/// Formats seconds as `MM:SS`.
pub fn format_remaining(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}
