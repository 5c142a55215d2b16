//! Completion arbiter: exactly-once session completion.
//!
//! A session can be ended by two independent triggers, countdown expiry and
//! explicit user action, and both may fire around the same moment. The
//! arbiter funnels both through a single tagged guard so that at most one
//! `end` request ever reaches the session store per session. A trigger that
//! arrives while the guard is already set is suppressed, not queued, even if
//! the first `end` call is still in flight.
//!
//! A failed `end` call leaves the guard set: a session must not come back to
//! life after a failed completion attempt. Recovery is retrying the same
//! completion via [`retry`](CompletionArbiter::retry), never a fresh session.

use crate::error::{Result, TempoError};
use crate::history::HistoryAggregator;
use crate::session::{Session, SessionStore};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

/// Bounded wait for the store's `end` call before it is surfaced as a
/// transient failure. Policy default, overridable per arbiter.
pub const DEFAULT_END_TIMEOUT: Duration = Duration::from_secs(10);

/// Which path asked for the session to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTrigger {
    /// The countdown reached zero.
    Expiry,
    /// The user ended the session explicitly.
    Manual,
}

/// State of the per-session completion guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPhase {
    /// No trigger has fired yet.
    NotRequested,
    /// An `end` request has been issued (possibly still in flight, possibly
    /// failed); later triggers are suppressed.
    Requested,
    /// The store confirmed the completion. Terminal.
    Confirmed,
}

/// Result of offering a completion trigger to the arbiter.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// The store confirmed the completion.
    Completed {
        /// The completed session record.
        session: Session,
        /// False when the history snapshot failed to persist. The session
        /// is still completed; history catches up on reconciliation.
        history_recorded: bool,
    },
    /// The guard was already set; nothing was sent to the store.
    Suppressed,
}

/// Serializes completion of one session across its two trigger paths.
pub struct CompletionArbiter {
    /// ID of the session this arbiter guards.
    session_id: String,
    /// The completion guard. Test-and-set under the lock is the only way
    /// either trigger path may claim the completion.
    phase: Mutex<CompletionPhase>,
    /// Source of truth for the completion transition.
    store: Arc<SessionStore>,
    /// Write path for the history snapshot.
    history: Arc<HistoryAggregator>,
    /// Bounded wait for the `end` call.
    end_timeout: Duration,
}

impl CompletionArbiter {
    /// Creates an arbiter for `session_id` with the default end timeout.
    pub fn new(
        session_id: impl Into<String>,
        store: Arc<SessionStore>,
        history: Arc<HistoryAggregator>,
    ) -> Self {
        Self::with_timeout(session_id, store, history, DEFAULT_END_TIMEOUT)
    }

    /// Creates an arbiter with an explicit end timeout.
    pub fn with_timeout(
        session_id: impl Into<String>,
        store: Arc<SessionStore>,
        history: Arc<HistoryAggregator>,
        end_timeout: Duration,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            phase: Mutex::new(CompletionPhase::NotRequested),
            store,
            history,
            end_timeout,
        }
    }

    /// Current guard phase.
    pub fn phase(&self) -> CompletionPhase {
        *self.phase.lock().unwrap()
    }

    /// Offers a completion trigger.
    ///
    /// The first trigger to arrive claims the guard and issues the single
    /// `end` call; every later trigger returns
    /// [`CompletionOutcome::Suppressed`] without touching the store or any
    /// finalized state.
    ///
    /// # Errors
    ///
    /// Propagates the store failure when the `end` call fails or times out.
    /// The guard stays set; use [`retry`](Self::retry) to re-issue the same
    /// completion.
    pub async fn complete(&self, trigger: CompletionTrigger) -> Result<CompletionOutcome> {
        {
            let mut phase = self.phase.lock().unwrap();
            match *phase {
                CompletionPhase::NotRequested => {
                    *phase = CompletionPhase::Requested;
                }
                CompletionPhase::Requested | CompletionPhase::Confirmed => {
                    tracing::debug!(
                        session_id = %self.session_id,
                        ?trigger,
                        "Completion already requested, suppressing trigger"
                    );
                    return Ok(CompletionOutcome::Suppressed);
                }
            }
        }

        tracing::debug!(session_id = %self.session_id, ?trigger, "Completion requested");
        self.issue_end().await
    }

    /// Re-issues a completion whose `end` call previously failed.
    ///
    /// # Errors
    ///
    /// - `Internal` when no completion was ever requested (nothing to retry)
    /// - the store failure when the re-issued call fails again
    pub async fn retry(&self) -> Result<CompletionOutcome> {
        match self.phase() {
            CompletionPhase::NotRequested => Err(TempoError::internal(format!(
                "no completion attempt to retry for session '{}'",
                self.session_id
            ))),
            CompletionPhase::Confirmed => Ok(CompletionOutcome::Suppressed),
            CompletionPhase::Requested => {
                tracing::debug!(session_id = %self.session_id, "Retrying completion");
                self.issue_end().await
            }
        }
    }

    /// Issues the `end` call and, on success, records the history snapshot.
    ///
    /// Precondition: the guard is `Requested`.
    async fn issue_end(&self) -> Result<CompletionOutcome> {
        let session = match timeout(self.end_timeout, self.store.end(&self.session_id)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                // Guard stays Requested: the session must not be resurrected
                // after a failed completion attempt.
                tracing::error!(session_id = %self.session_id, error = %e, "End request failed");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    session_id = %self.session_id,
                    timeout_secs = self.end_timeout.as_secs(),
                    "End request timed out"
                );
                return Err(TempoError::transient(format!(
                    "end request for session '{}' did not return within {}s",
                    self.session_id,
                    self.end_timeout.as_secs()
                )));
            }
        };

        *self.phase.lock().unwrap() = CompletionPhase::Confirmed;

        let history_recorded = match self.history.record(&session).await {
            Ok(_) => true,
            Err(e) => {
                // Non-fatal: the session is completed at the store either
                // way; reconciliation picks the snapshot up later.
                tracing::warn!(
                    session_id = %session.id,
                    error = %e,
                    "Session completed but history snapshot was not recorded"
                );
                false
            }
        };

        Ok(CompletionOutcome::Completed {
            session,
            history_recorded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::history::{HistoryEntry, HistoryRepository};
    use crate::session::{SessionRepository, SessionStatus};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockSessionRepository {
        sessions: Mutex<HashMap<String, Session>>,
        saves: AtomicUsize,
        fail_saves: AtomicBool,
        hang_saves: AtomicBool,
    }

    impl MockSessionRepository {
        fn new() -> Self {
            Self {
                sessions: Mutex::new(HashMap::new()),
                saves: AtomicUsize::new(0),
                fail_saves: AtomicBool::new(false),
                hang_saves: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl SessionRepository for MockSessionRepository {
        async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn save(&self, session: &Session) -> Result<()> {
            if self.hang_saves.load(Ordering::SeqCst) {
                // Simulates a store that never answers.
                std::future::pending::<()>().await;
            }
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(TempoError::transient("store unreachable"));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id.clone(), session.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<Session>> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }
    }

    struct MockHistoryRepository {
        entries: Mutex<Vec<HistoryEntry>>,
        fail_appends: AtomicBool,
    }

    impl MockHistoryRepository {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail_appends: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl HistoryRepository for MockHistoryRepository {
        async fn append(&self, entry: &HistoryEntry) -> Result<()> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(TempoError::io("history store unreachable"));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn query(&self, owner: &str) -> Result<Vec<HistoryEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| entry.owner == owner)
                .cloned()
                .collect())
        }
    }

    struct Fixture {
        session_repo: Arc<MockSessionRepository>,
        history_repo: Arc<MockHistoryRepository>,
        store: Arc<SessionStore>,
        history: Arc<HistoryAggregator>,
    }

    impl Fixture {
        fn new() -> Self {
            let session_repo = Arc::new(MockSessionRepository::new());
            let history_repo = Arc::new(MockHistoryRepository::new());
            let clock = Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
            ));
            let store = Arc::new(SessionStore::new(session_repo.clone(), clock));
            let history = Arc::new(HistoryAggregator::new(history_repo.clone()));
            Self {
                session_repo,
                history_repo,
                store,
                history,
            }
        }

        async fn started_session(&self) -> Session {
            self.store.start("u1", 25).await.unwrap()
        }

        fn arbiter_for(&self, session: &Session) -> Arc<CompletionArbiter> {
            Arc::new(CompletionArbiter::new(
                session.id.clone(),
                self.store.clone(),
                self.history.clone(),
            ))
        }
    }

    #[tokio::test]
    async fn test_first_trigger_completes_and_records_history() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        let outcome = arbiter.complete(CompletionTrigger::Expiry).await.unwrap();
        match outcome {
            CompletionOutcome::Completed {
                session,
                history_recorded,
            } => {
                assert_eq!(session.status, SessionStatus::Completed);
                assert!(history_recorded);
            }
            other => panic!("expected completion, got {other:?}"),
        }

        assert_eq!(arbiter.phase(), CompletionPhase::Confirmed);
        assert_eq!(fixture.history_repo.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_trigger_is_suppressed() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        arbiter.complete(CompletionTrigger::Expiry).await.unwrap();
        let outcome = arbiter.complete(CompletionTrigger::Manual).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::Suppressed);

        // One save for start, one for the single end.
        assert_eq!(fixture.session_repo.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_racing_triggers_issue_exactly_one_end() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        let expiry = {
            let arbiter = arbiter.clone();
            tokio::spawn(async move { arbiter.complete(CompletionTrigger::Expiry).await })
        };
        let manual = {
            let arbiter = arbiter.clone();
            tokio::spawn(async move { arbiter.complete(CompletionTrigger::Manual).await })
        };

        let outcomes = [
            expiry.await.unwrap().unwrap(),
            manual.await.unwrap().unwrap(),
        ];

        let completed = outcomes
            .iter()
            .filter(|o| matches!(o, CompletionOutcome::Completed { .. }))
            .count();
        let suppressed = outcomes
            .iter()
            .filter(|o| matches!(o, CompletionOutcome::Suppressed))
            .count();
        assert_eq!(completed, 1);
        assert_eq!(suppressed, 1);
        assert_eq!(fixture.session_repo.saves.load(Ordering::SeqCst), 2);
        assert_eq!(fixture.history_repo.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_end_keeps_guard_and_retry_recovers() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        fixture.session_repo.fail_saves.store(true, Ordering::SeqCst);
        let err = arbiter
            .complete(CompletionTrigger::Manual)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(arbiter.phase(), CompletionPhase::Requested);

        // The session is not resurrected: a new trigger stays suppressed.
        let outcome = arbiter.complete(CompletionTrigger::Expiry).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::Suppressed);

        // Retrying the same completion is the recovery path.
        fixture
            .session_repo
            .fail_saves
            .store(false, Ordering::SeqCst);
        let outcome = arbiter.retry().await.unwrap();
        assert!(matches!(outcome, CompletionOutcome::Completed { .. }));
        assert_eq!(arbiter.phase(), CompletionPhase::Confirmed);
    }

    #[tokio::test]
    async fn test_retry_without_request_is_an_error() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        let err = arbiter.retry().await.unwrap_err();
        assert!(matches!(err, TempoError::Internal(_)));
    }

    #[tokio::test]
    async fn test_history_write_failure_is_non_fatal() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = fixture.arbiter_for(&session);

        fixture
            .history_repo
            .fail_appends
            .store(true, Ordering::SeqCst);
        let outcome = arbiter.complete(CompletionTrigger::Expiry).await.unwrap();
        match outcome {
            CompletionOutcome::Completed {
                session,
                history_recorded,
            } => {
                assert_eq!(session.status, SessionStatus::Completed);
                assert!(!history_recorded);
            }
            other => panic!("expected completion, got {other:?}"),
        }

        // Completed at the store despite the missing snapshot.
        assert_eq!(arbiter.phase(), CompletionPhase::Confirmed);
        let stored = fixture.store.find(&session.id).await.unwrap();
        assert!(stored.is_completed());
    }

    #[tokio::test]
    async fn test_hanging_end_surfaces_transient_failure() {
        let fixture = Fixture::new();
        let session = fixture.started_session().await;
        let arbiter = Arc::new(CompletionArbiter::with_timeout(
            session.id.clone(),
            fixture.store.clone(),
            fixture.history.clone(),
            Duration::from_millis(20),
        ));

        fixture.session_repo.hang_saves.store(true, Ordering::SeqCst);
        let err = arbiter
            .complete(CompletionTrigger::Manual)
            .await
            .unwrap_err();
        assert!(matches!(err, TempoError::Transient(_)));
        assert_eq!(arbiter.phase(), CompletionPhase::Requested);
    }
}
