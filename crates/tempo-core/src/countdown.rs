//! Countdown controller: the client-side view of a running session.
//!
//! The controller derives a user-facing notion of remaining time from a
//! session's `duration_minutes` and `start_time`. Each one-second tick
//! recomputes remaining time from the clock against the authoritative
//! `start_time`, so a delayed or missed tick cannot drift the display away
//! from server truth. When the countdown reaches zero it signals expiry
//! exactly once and stops.
//!
//! A controller holds at most one active countdown; starting a new one
//! implicitly cancels and discards any prior one. Teardown (manual end,
//! logout, context disposal) is an explicit [`cancel`](CountdownController::cancel)
//! call. The controller raises no domain errors; it only stops ticking.

use crate::clock::Clock;
use crate::session::Session;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

/// Period of the repeating countdown tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Signal emitted by a running countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// The countdown reached zero. Sent exactly once per countdown.
    Expired { session_id: String },
}

/// Result of advancing a countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down.
    Running { remaining_secs: u64 },
    /// Remaining time just reached zero; reported once.
    Expired,
    /// The countdown was already stopped.
    Inactive,
}

/// Explicit countdown state, updated only through defined transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownState {
    /// ID of the session being counted down.
    pub session_id: String,
    /// Total countdown length in seconds.
    pub duration_secs: u64,
    /// Authoritative session start, as stamped by the store.
    pub started_at: DateTime<Utc>,
    /// Seconds left, clamped at zero.
    pub remaining_secs: u64,
    /// False once expired or cancelled.
    pub active: bool,
}

impl CountdownState {
    /// Initializes the state for a freshly started session.
    pub fn new(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            duration_secs: session.duration_secs(),
            started_at: session.start_time,
            remaining_secs: session.duration_secs(),
            active: true,
        }
    }

    /// Advances the countdown to `now`.
    ///
    /// Remaining time is recomputed from `now - started_at` rather than
    /// decremented, so the countdown resyncs itself against the session's
    /// authoritative start on every tick. Clamps at zero and reports
    /// `Expired` exactly once; later ticks report `Inactive`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }

        let elapsed_secs = (now - self.started_at).num_seconds().max(0) as u64;
        self.remaining_secs = self.duration_secs.saturating_sub(elapsed_secs);

        if self.remaining_secs == 0 {
            self.active = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    /// Stops the countdown without expiring it (manual end or teardown).
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Drives a per-session one-second tick on a background task.
pub struct CountdownController {
    /// Time source for resyncing remaining time.
    clock: Arc<dyn Clock>,
    /// State of the current countdown, shared with the tick task and
    /// readable for display.
    state: Arc<Mutex<Option<CountdownState>>>,
    /// Cancellation handle for the current tick task.
    cancel: Mutex<Option<CancellationToken>>,
}

impl CountdownController {
    /// Creates a controller with no running countdown.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(None)),
            cancel: Mutex::new(None),
        }
    }

    /// Begins counting down for `session`, replacing any prior countdown.
    ///
    /// Spawns a repeating one-second tick task. The returned receiver yields
    /// at most one [`CountdownEvent::Expired`] and closes when the countdown
    /// stops for any reason.
    pub fn start(&self, session: &Session) -> mpsc::UnboundedReceiver<CountdownEvent> {
        // Starting a new countdown implicitly cancels the previous one.
        self.cancel_task();

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap() = Some(token.clone());
        *self.state.lock().unwrap() = Some(CountdownState::new(session));

        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let session_id = session.id.clone();

        tracing::debug!(session_id = %session_id, duration_secs = session.duration_secs(), "Countdown started");

        tokio::spawn(async move {
            let mut ticker = interval(TICK_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!(session_id = %session_id, "Countdown cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let outcome = {
                            let mut guard = state.lock().unwrap();
                            match guard.as_mut() {
                                Some(current) if current.session_id == session_id => {
                                    current.tick(clock.now())
                                }
                                // State was replaced underneath us.
                                _ => TickOutcome::Inactive,
                            }
                        };

                        match outcome {
                            TickOutcome::Running { .. } => {}
                            TickOutcome::Expired => {
                                tracing::info!(session_id = %session_id, "Countdown expired");
                                let _ = tx.send(CountdownEvent::Expired {
                                    session_id: session_id.clone(),
                                });
                                break;
                            }
                            TickOutcome::Inactive => break,
                        }
                    }
                }
            }
        });

        rx
    }

    /// Stops the current countdown, if any.
    ///
    /// Safe to call when nothing is running. Does not touch any in-flight
    /// completion request; those finish or fail on their own.
    pub fn cancel(&self) {
        if let Some(current) = self.state.lock().unwrap().as_mut() {
            current.deactivate();
        }
        self.cancel_task();
    }

    /// Seconds remaining on the current countdown, for display.
    ///
    /// Returns `None` when no countdown is active.
    pub fn remaining(&self) -> Option<u64> {
        let guard = self.state.lock().unwrap();
        guard
            .as_ref()
            .filter(|state| state.active)
            .map(|state| state.remaining_secs)
    }

    fn cancel_task(&self) {
        if let Some(token) = self.cancel.lock().unwrap().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SessionStatus;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn session_started_at(start: DateTime<Utc>, minutes: u32) -> Session {
        Session {
            id: "s-1".to_string(),
            owner: "u-1".to_string(),
            duration_minutes: minutes,
            start_time: start,
            end_time: None,
            status: SessionStatus::Active,
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_one_minute_session_expires_after_sixty_ticks() {
        let start = epoch();
        let mut state = CountdownState::new(&session_started_at(start, 1));
        assert_eq!(state.remaining_secs, 60);

        let mut expiries = 0;
        for second in 1..=60 {
            let now = start + ChronoDuration::seconds(second);
            match state.tick(now) {
                TickOutcome::Running { remaining_secs } => {
                    assert_eq!(remaining_secs, 60 - second as u64);
                }
                TickOutcome::Expired => {
                    expiries += 1;
                    assert_eq!(second, 60);
                }
                TickOutcome::Inactive => panic!("countdown stopped early at {second}s"),
            }
        }

        assert_eq!(state.remaining_secs, 0);
        assert_eq!(expiries, 1);

        // Further ticks never re-fire expiry.
        let after = start + ChronoDuration::seconds(61);
        assert_eq!(state.tick(after), TickOutcome::Inactive);
    }

    #[test]
    fn test_tick_resyncs_after_clock_jump() {
        let start = epoch();
        let mut state = CountdownState::new(&session_started_at(start, 25));

        // A stalled ticker catches up in a single tick.
        let outcome = state.tick(start + ChronoDuration::seconds(300));
        assert_eq!(
            outcome,
            TickOutcome::Running {
                remaining_secs: 25 * 60 - 300
            }
        );

        // A jump past the deadline clamps at zero and expires.
        let outcome = state.tick(start + ChronoDuration::hours(2));
        assert_eq!(outcome, TickOutcome::Expired);
        assert_eq!(state.remaining_secs, 0);
    }

    #[test]
    fn test_deactivated_state_ignores_ticks() {
        let start = epoch();
        let mut state = CountdownState::new(&session_started_at(start, 25));
        state.deactivate();
        assert_eq!(
            state.tick(start + ChronoDuration::seconds(1)),
            TickOutcome::Inactive
        );
    }

    #[tokio::test]
    async fn test_controller_emits_expiry_event() {
        let start = epoch();
        // The clock is already past the deadline, so the first tick expires.
        let clock = Arc::new(ManualClock::new(start + ChronoDuration::minutes(2)));
        let controller = CountdownController::new(clock);

        let mut rx = controller.start(&session_started_at(start, 1));
        let event = rx.recv().await.expect("expiry event");
        assert_eq!(
            event,
            CountdownEvent::Expired {
                session_id: "s-1".to_string()
            }
        );

        // Exactly once: the channel closes after the event.
        assert!(rx.recv().await.is_none());
        assert_eq!(controller.remaining(), None);
    }

    #[tokio::test]
    async fn test_cancel_stops_ticking_without_expiry() {
        let start = epoch();
        let clock = Arc::new(ManualClock::new(start));
        let controller = CountdownController::new(clock);

        let mut rx = controller.start(&session_started_at(start, 25));
        assert_eq!(controller.remaining(), Some(25 * 60));

        controller.cancel();
        // No event; the channel just closes.
        assert!(rx.recv().await.is_none());
        assert_eq!(controller.remaining(), None);
    }

    #[tokio::test]
    async fn test_starting_new_countdown_replaces_prior() {
        let start = epoch();
        let clock = Arc::new(ManualClock::new(start));
        let controller = CountdownController::new(clock);

        let mut first_rx = controller.start(&session_started_at(start, 25));

        let mut second = session_started_at(start, 50);
        second.id = "s-2".to_string();
        let _second_rx = controller.start(&second);

        // The first countdown is discarded without an expiry.
        assert!(first_rx.recv().await.is_none());
        assert_eq!(controller.remaining(), Some(50 * 60));
    }
}
