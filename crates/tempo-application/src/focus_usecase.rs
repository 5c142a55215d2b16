//! Focus session use case.
//!
//! This module provides the `FocusUseCase` which wires the session store,
//! countdown controller, completion arbiter and history aggregator together
//! into the flow a client drives: sign in, start a session, watch it count
//! down, end it (or let it expire), browse history.
//!
//! # Responsibilities
//!
//! - Enforcing the signed-in and configured-duration rules before `start`
//! - Holding the one active focus (a new start replaces the old countdown)
//! - Routing both completion triggers through one arbiter per session
//! - Tearing the countdown down on logout/disposal without touching any
//!   in-flight `end` request
//! - Background reconciliation of history snapshots that failed to persist

use crate::identity::IdentityProvider;
use std::sync::Arc;
use std::time::Duration;
use tempo_core::clock::Clock;
use tempo_core::completion::{
    CompletionArbiter, CompletionOutcome, CompletionTrigger,
};
use tempo_core::config::FocusConfig;
use tempo_core::countdown::CountdownController;
use tempo_core::error::{Result, TempoError};
use tempo_core::history::{HistoryAggregator, HistoryEntry};
use tempo_core::session::{Session, SessionStore};
use tokio::sync::{RwLock, mpsc};

/// Notification delivered to the client that started a focus session.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusEvent {
    /// The session completed (by expiry).
    Completed {
        session: Session,
        /// False when the history snapshot was dropped; reconciliation
        /// picks it up later.
        history_recorded: bool,
    },
    /// The expiry-triggered completion failed; the session is neither
    /// resurrected nor completed until a retry succeeds.
    CompletionFailed { message: String },
}

/// The client's one active focus session.
struct ActiveFocus {
    session: Session,
    arbiter: Arc<CompletionArbiter>,
    /// Local display flag, flipped once the session has ended.
    ended: bool,
}

/// Orchestrates the focus session lifecycle for one signed-in client.
pub struct FocusUseCase {
    /// Source of truth for session records.
    store: Arc<SessionStore>,
    /// Read/write path for completed-session history.
    history: Arc<HistoryAggregator>,
    /// Per-client countdown driver (at most one active countdown).
    controller: CountdownController,
    /// Who is signed in.
    identity: Arc<dyn IdentityProvider>,
    /// Focus policy (allowed durations, timeouts).
    config: FocusConfig,
    /// The active focus, if any.
    active: Arc<RwLock<Option<ActiveFocus>>>,
}

impl FocusUseCase {
    /// Creates a new `FocusUseCase`.
    ///
    /// # Arguments
    ///
    /// * `store` - The session store
    /// * `history` - The history aggregator
    /// * `clock` - Time source for the countdown
    /// * `identity` - The identity collaborator
    /// * `config` - Focus policy settings
    pub fn new(
        store: Arc<SessionStore>,
        history: Arc<HistoryAggregator>,
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
        config: FocusConfig,
    ) -> Self {
        Self {
            store,
            history,
            controller: CountdownController::new(clock),
            identity,
            config,
            active: Arc::new(RwLock::new(None)),
        }
    }

    fn current_user(&self) -> Result<String> {
        self.identity
            .current_user()
            .ok_or_else(|| TempoError::unauthorized("no user is signed in"))
    }

    /// Starts a focus session for the signed-in user and begins its
    /// countdown, replacing any prior active focus.
    ///
    /// Returns the authoritative session record plus a receiver that yields
    /// at most one [`FocusEvent`] when the countdown expires.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when nobody is signed in
    /// - `InvalidInput` when the duration is not one of the configured set
    /// - storage errors from the store
    pub async fn start_focus(
        &self,
        duration_minutes: Option<u32>,
    ) -> Result<(Session, mpsc::UnboundedReceiver<FocusEvent>)> {
        let owner = self.current_user()?;
        let duration = duration_minutes.unwrap_or(self.config.default_duration);
        if !self.config.allows_duration(duration) {
            return Err(TempoError::invalid_input(format!(
                "duration {duration} is not allowed (configured durations: {:?})",
                self.config.allowed_durations
            )));
        }

        let session = self.store.start(&owner, duration).await?;
        let arbiter = Arc::new(CompletionArbiter::with_timeout(
            session.id.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.history),
            Duration::from_secs(self.config.end_timeout_secs),
        ));

        let mut countdown_rx = self.controller.start(&session);

        {
            let mut active = self.active.write().await;
            *active = Some(ActiveFocus {
                session: session.clone(),
                arbiter: Arc::clone(&arbiter),
                ended: false,
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::clone(&self.active);
        let session_id = session.id.clone();

        tokio::spawn(async move {
            // The receiver closes without an event when the countdown is
            // cancelled (manual end, replacement, teardown).
            if countdown_rx.recv().await.is_none() {
                return;
            }

            match arbiter.complete(CompletionTrigger::Expiry).await {
                Ok(CompletionOutcome::Completed {
                    session,
                    history_recorded,
                }) => {
                    Self::mark_ended(&active, &session_id).await;
                    let _ = tx.send(FocusEvent::Completed {
                        session,
                        history_recorded,
                    });
                }
                Ok(CompletionOutcome::Suppressed) => {
                    // A manual end won the race; its caller gets the record.
                }
                Err(e) => {
                    tracing::error!(
                        session_id = %session_id,
                        error = %e,
                        "Expiry-triggered completion failed"
                    );
                    let _ = tx.send(FocusEvent::CompletionFailed {
                        message: e.to_string(),
                    });
                }
            }
        });

        Ok((session, rx))
    }

    async fn mark_ended(active: &Arc<RwLock<Option<ActiveFocus>>>, session_id: &str) {
        let mut active = active.write().await;
        if let Some(focus) = active.as_mut()
            && focus.session.id == session_id
        {
            focus.ended = true;
        }
    }

    /// Ends the active focus session on explicit user action.
    ///
    /// Stops the countdown and routes the manual trigger through the same
    /// arbiter as expiry, so a simultaneous expiry cannot double-complete.
    /// Returns [`CompletionOutcome::Suppressed`] when the session already
    /// completed (e.g., expiry won the race).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when no focus session is active
    /// - the store failure when the `end` call fails; the countdown stays
    ///   stopped and [`retry_completion`](Self::retry_completion) recovers
    pub async fn end_focus(&self) -> Result<CompletionOutcome> {
        let (session_id, arbiter) = {
            let active = self.active.read().await;
            match active.as_ref() {
                Some(focus) => (focus.session.id.clone(), Arc::clone(&focus.arbiter)),
                None => {
                    return Err(TempoError::invalid_input(
                        "no active focus session to end",
                    ));
                }
            }
        };

        // Stop ticking first; the end request proceeds independently.
        self.controller.cancel();

        let outcome = arbiter.complete(CompletionTrigger::Manual).await?;
        if matches!(outcome, CompletionOutcome::Completed { .. }) {
            Self::mark_ended(&self.active, &session_id).await;
        }
        Ok(outcome)
    }

    /// Retries a completion whose `end` call previously failed.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when no focus session is active
    /// - `Internal` when no completion was ever requested
    /// - the store failure when the retry fails again
    pub async fn retry_completion(&self) -> Result<CompletionOutcome> {
        let (session_id, arbiter) = {
            let active = self.active.read().await;
            match active.as_ref() {
                Some(focus) => (focus.session.id.clone(), Arc::clone(&focus.arbiter)),
                None => {
                    return Err(TempoError::invalid_input(
                        "no active focus session to retry",
                    ));
                }
            }
        };

        let outcome = arbiter.retry().await?;
        if matches!(outcome, CompletionOutcome::Completed { .. }) {
            Self::mark_ended(&self.active, &session_id).await;
        }
        Ok(outcome)
    }

    /// Ends a session by ID on behalf of the signed-in user.
    ///
    /// Bypasses the local countdown (the session may belong to an earlier
    /// process); idempotent like the store's `end`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when nobody is signed in or the session belongs to
    ///   someone else
    /// - `NotFound` for an unknown ID
    pub async fn end_session_by_id(&self, session_id: &str) -> Result<Session> {
        let owner = self.current_user()?;
        let session = self.store.find(session_id).await?;
        if session.owner != owner {
            return Err(TempoError::unauthorized(format!(
                "session '{session_id}' does not belong to the signed-in user"
            )));
        }

        let was_completed = session.is_completed();
        let ended = self.store.end(session_id).await?;
        if !was_completed && let Err(e) = self.history.record(&ended).await {
            tracing::warn!(
                session_id = %ended.id,
                error = %e,
                "Session ended but history snapshot was not recorded"
            );
        }
        Ok(ended)
    }

    /// Tears down the focus context (logout, navigation, disposal).
    ///
    /// Cancels the countdown and discards local state. An in-flight `end`
    /// request is left to complete or fail on its own.
    pub async fn teardown(&self) {
        self.controller.cancel();
        let mut active = self.active.write().await;
        if active.take().is_some() {
            tracing::info!("Focus context torn down");
        }
    }

    /// Seconds remaining on the active countdown, for display.
    pub fn remaining(&self) -> Option<u64> {
        self.controller.remaining()
    }

    /// The active session record, if any.
    pub async fn active_session(&self) -> Option<Session> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|focus| focus.session.clone())
    }

    /// True once the active session has ended (for display).
    pub async fn is_ended(&self) -> bool {
        self.active
            .read()
            .await
            .as_ref()
            .map(|focus| focus.ended)
            .unwrap_or(false)
    }

    /// Lists the signed-in user's completed sessions, newest first.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` when nobody is signed in
    /// - storage errors from the history collaborator
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let owner = self.current_user()?;
        self.history.list(&owner).await
    }

    /// Lists every stored session (all owners).
    pub async fn sessions(&self) -> Result<Vec<Session>> {
        self.store.list().await
    }

    /// Repairs history snapshots the arbiter failed to record earlier.
    ///
    /// # Returns
    ///
    /// The number of entries repaired.
    pub async fn reconcile_history(&self) -> Result<usize> {
        let owner = self.current_user()?;
        let completed: Vec<Session> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|session| session.owner == owner && session.is_completed())
            .collect();
        self.history.reconcile(&completed).await
    }

    /// Starts a background scheduler that periodically reconciles history.
    ///
    /// The scheduler runs at the specified interval and re-records completed
    /// sessions whose snapshot never reached the history collaborator.
    ///
    /// # Arguments
    ///
    /// * `interval_secs` - Interval in seconds between reconciliation passes
    pub fn start_history_reconciler(self: &Arc<Self>, interval_secs: u64) {
        use std::sync::atomic::{AtomicBool, Ordering};
        use tokio::time::interval;

        // Prevent multiple reconciler instances
        static RECONCILER_RUNNING: AtomicBool = AtomicBool::new(false);
        if RECONCILER_RUNNING.swap(true, Ordering::SeqCst) {
            tracing::warn!(target: "history_sync", "Reconciler already running, skipping");
            return;
        }

        let usecase = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs));
            tracing::info!(target: "history_sync", "Reconciler started ({}s interval)", interval_secs);

            loop {
                ticker.tick().await;
                match usecase.reconcile_history().await {
                    Ok(0) => {}
                    Ok(repaired) => {
                        tracing::info!(target: "history_sync", repaired, "Repaired missing history entries");
                    }
                    Err(e) => {
                        tracing::error!(target: "history_sync", "Reconciliation pass failed: {}", e);
                    }
                }
            }
        });
    }
}
