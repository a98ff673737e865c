use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Card, CardStore, LeitnerBox, Stats};
use crate::scheduler::ReviewQueue;

/// Consecutive correct answers that trigger a celebratory milestone.
pub const STREAK_MILESTONE: u32 = 10;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Visible face of the current card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Current card shows its front; flip before answering.
    AwaitingFlip,
    /// Current card shows its back and has not been answered.
    AwaitingAnswer,
    /// Current card was answered; `advance` moves on.
    Answered,
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingFlip => "awaiting flip",
            SessionState::AwaitingAnswer => "awaiting answer",
            SessionState::Answered => "answered",
            SessionState::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot start a session with an empty queue")]
    EmptyQueue,

    #[error("the current card was already answered")]
    AlreadyAnswered,

    #[error("`{operation}` is not allowed while the session is {state}")]
    StateViolation {
        operation: &'static str,
        state: SessionState,
    },

    #[error("queued card at store position {0} no longer exists")]
    MissingCard(usize),
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Emitted when the in-session streak reaches a positive multiple of
/// `STREAK_MILESTONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakMilestone {
    pub streak: u32,
}

/// Result of answering one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub german: String,
    pub correct: bool,
    pub box_before: LeitnerBox,
    pub box_after: LeitnerBox,
    pub correct_streak: u32,
    pub milestone: Option<StreakMilestone>,
    pub session_complete: bool,
}

impl AnswerOutcome {
    /// Signed box movement: `+1`, `-1`, or `0` when clamped at a bound.
    #[must_use]
    pub fn box_delta(&self) -> i8 {
        let before = i8::try_from(self.box_before.value()).unwrap_or(i8::MAX);
        let after = i8::try_from(self.box_after.value()).unwrap_or(i8::MAX);
        after - before
    }
}

/// Progress summary for the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    /// 1-based position of the current card, 0 when idle.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
}

impl SessionProgress {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A single review pass over a `ReviewQueue`.
///
/// The session owns only its queue and cursor. The card store and stats are
/// passed in by the caller on every mutating call, so box and favorite
/// changes are committed per answer and survive `abandon`.
///
/// ```text
/// Idle ─start→ AwaitingFlip ⇄flip⇄ AwaitingAnswer ─answer→ Answered
/// Answered ─advance→ AwaitingFlip (next card)
/// AwaitingAnswer ─answer (last card)→ Complete
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    queue: ReviewQueue,
    index: usize,
    side: Side,
    answered: bool,
    answered_count: usize,
    correct_streak: u32,
    state: SessionState,
    last_outcome: Option<AnswerOutcome>,
}

impl ReviewSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin reviewing `queue` from its first card.
    ///
    /// A running session must be abandoned first.
    ///
    /// # Errors
    ///
    /// - `EmptyQueue` if the queue has no cards
    /// - `StateViolation` if a session is in progress
    pub fn start(&mut self, queue: ReviewQueue) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Complete) {
            return Err(self.violation("start"));
        }
        if queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }

        *self = Self {
            queue,
            state: SessionState::AwaitingFlip,
            ..Self::default()
        };
        Ok(())
    }

    /// Toggle the visible side of the current card. Unlimited before answering.
    ///
    /// # Errors
    ///
    /// Returns `StateViolation` when there is no unanswered card.
    pub fn flip(&mut self) -> Result<Side, SessionError> {
        self.state = match self.state {
            SessionState::AwaitingFlip => SessionState::AwaitingAnswer,
            SessionState::AwaitingAnswer => SessionState::AwaitingFlip,
            _ => return Err(self.violation("flip")),
        };
        self.side = self.side.flipped();
        Ok(self.side)
    }

    /// Record the answer for the current card.
    ///
    /// Moves the card one box, updates the in-session streak and applies the
    /// outcome to `stats` for `today`. Answering the last card completes the
    /// session.
    ///
    /// # Errors
    ///
    /// - `AlreadyAnswered` on a second answer for the same card
    /// - `StateViolation` before the card was flipped or outside a session
    /// - `MissingCard` if the queued position is not in `store`
    pub fn answer(
        &mut self,
        correct: bool,
        store: &mut CardStore,
        stats: &mut Stats,
        today: NaiveDate,
    ) -> Result<AnswerOutcome, SessionError> {
        if self.answered {
            return Err(SessionError::AlreadyAnswered);
        }
        if self.state != SessionState::AwaitingAnswer {
            return Err(self.violation("answer"));
        }

        let position = self.current_position().ok_or(SessionError::MissingCard(self.index))?;
        let card = store
            .get_mut(position)
            .ok_or(SessionError::MissingCard(position))?;

        let box_before = card.apply_answer(correct);
        let box_after = card.leitner_box();
        stats.record_outcome(card, correct, today);

        self.correct_streak = if correct {
            self.correct_streak.saturating_add(1)
        } else {
            0
        };
        let milestone = (correct && self.correct_streak % STREAK_MILESTONE == 0).then_some(
            StreakMilestone {
                streak: self.correct_streak,
            },
        );

        self.answered = true;
        self.answered_count += 1;
        let session_complete = self.index + 1 >= self.queue.len();
        self.state = if session_complete {
            SessionState::Complete
        } else {
            SessionState::Answered
        };

        let outcome = AnswerOutcome {
            german: card.german().to_owned(),
            correct,
            box_before,
            box_after,
            correct_streak: self.correct_streak,
            milestone,
            session_complete,
        };
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Move to the next queued card. A no-op once the session is complete.
    ///
    /// # Errors
    ///
    /// Returns `StateViolation` unless the current card was answered.
    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        match self.state {
            SessionState::Complete => return Ok(SessionState::Complete),
            SessionState::Answered => {}
            _ => return Err(self.violation("advance")),
        }

        self.index += 1;
        if self.index >= self.queue.len() {
            self.state = SessionState::Complete;
        } else {
            self.side = Side::Front;
            self.answered = false;
            self.state = SessionState::AwaitingFlip;
        }
        Ok(self.state)
    }

    /// Discard the queue and return to `Idle`. Always succeeds.
    pub fn abandon(&mut self) {
        *self = Self::default();
    }

    /// Toggle the favorite flag of the card currently shown.
    ///
    /// # Errors
    ///
    /// - `StateViolation` when idle
    /// - `MissingCard` if the queued position is not in `store`
    pub fn toggle_favorite(&self, store: &mut CardStore) -> Result<bool, SessionError> {
        if self.state == SessionState::Idle {
            return Err(self.violation("toggle_favorite"));
        }
        let position = self
            .current_position()
            .ok_or(SessionError::MissingCard(self.index))?;
        store
            .get_mut(position)
            .map(Card::toggle_favorite)
            .ok_or(SessionError::MissingCard(position))
    }

    fn violation(&self, operation: &'static str) -> SessionError {
        SessionError::StateViolation {
            operation,
            state: self.state,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle | SessionState::Complete)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Store position of the current card. Stays on the last card once complete.
    #[must_use]
    pub fn current_position(&self) -> Option<usize> {
        if self.state == SessionState::Idle {
            return None;
        }
        let index = self.index.min(self.queue.len().saturating_sub(1));
        self.queue.get(index)
    }

    #[must_use]
    pub fn current_card<'a>(&self, store: &'a CardStore) -> Option<&'a Card> {
        self.current_position().and_then(|position| store.get(position))
    }

    #[must_use]
    pub fn correct_streak(&self) -> u32 {
        self.correct_streak
    }

    #[must_use]
    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        if self.state == SessionState::Idle {
            return SessionProgress::default();
        }
        let total = self.queue.len();
        SessionProgress {
            position: (self.index + 1).min(total),
            total,
            answered: self.answered_count,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
