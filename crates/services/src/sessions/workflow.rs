use std::sync::Arc;

use drill_core::scheduler::Scheduler;
use drill_core::session::{AnswerOutcome, ReviewSession, SessionProgress};
use rand::Rng;
use storage::repository::{CardRepository, StatsRepository, StorageError};
use tracing::{debug, info, warn};

use super::plan::{ReviewMode, build_queue};
use crate::Clock;
use crate::error::SessionLoopError;
use crate::library::Library;

/// Result of answering a single card in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub outcome: AnswerOutcome,
    pub progress: SessionProgress,
}

/// Orchestrates session start and persisted answering.
///
/// Each answer is applied to the library first, then the card list and the
/// stats record are flushed. A failed flush is reported but leaves the
/// session and library in their updated state.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    cards: Arc<dyn CardRepository>,
    stats: Arc<dyn StatsRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        cards: Arc<dyn CardRepository>,
        stats: Arc<dyn StatsRepository>,
    ) -> Self {
        Self {
            clock,
            cards,
            stats,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Start a session for `mode` with an OS-seeded scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SessionLoopError::Scheduler` when no queue can be built.
    pub fn start_session(
        &self,
        library: &Library,
        mode: &ReviewMode,
    ) -> Result<ReviewSession, SessionLoopError> {
        self.start_session_with(library, mode, &mut Scheduler::new())
    }

    /// Start a session for `mode` with a caller-provided scheduler.
    ///
    /// # Errors
    ///
    /// Returns `SessionLoopError::Scheduler` when no queue can be built.
    pub fn start_session_with<R: Rng>(
        &self,
        library: &Library,
        mode: &ReviewMode,
        scheduler: &mut Scheduler<R>,
    ) -> Result<ReviewSession, SessionLoopError> {
        let queue = build_queue(mode, library, scheduler)?;
        let mut session = ReviewSession::new();
        session.start(queue)?;
        info!(
            mode = mode.label(),
            cards = session.queue().len(),
            "review session started"
        );
        Ok(session)
    }

    /// Answer the current card and persist the card list and stats.
    ///
    /// # Errors
    ///
    /// - `Session` for state violations (nothing is changed)
    /// - `PersistenceWriteFailed` if a flush fails; the answer stays applied
    pub fn answer_current(
        &self,
        library: &mut Library,
        session: &mut ReviewSession,
        correct: bool,
    ) -> Result<SessionAnswerResult, SessionLoopError> {
        let today = self.clock.today();
        let (store, stats) = library.store_and_stats_mut();
        let outcome = session.answer(correct, store, stats, today)?;
        debug!(
            german = %outcome.german,
            correct,
            from = outcome.box_before.value(),
            to = outcome.box_after.value(),
            "card answered"
        );
        if let Some(milestone) = outcome.milestone {
            info!(streak = milestone.streak, "streak milestone reached");
        }
        if outcome.session_complete {
            info!(answered = session.progress().answered, "review session complete");
        }

        let cards_saved = self.cards.save_cards(library.store().cards());
        let stats_saved = self.stats.save_stats(library.stats());
        cards_saved.and(stats_saved).map_err(persistence_failed)?;

        Ok(SessionAnswerResult {
            outcome,
            progress: session.progress(),
        })
    }

    /// Toggle the favorite flag of the current card and persist the card list.
    ///
    /// # Errors
    ///
    /// - `Session` when no card is shown
    /// - `PersistenceWriteFailed` if the flush fails; the flag stays toggled
    pub fn toggle_favorite(
        &self,
        library: &mut Library,
        session: &ReviewSession,
    ) -> Result<bool, SessionLoopError> {
        let favorite = session.toggle_favorite(library.store_mut())?;
        self.cards
            .save_cards(library.store().cards())
            .map_err(persistence_failed)?;
        Ok(favorite)
    }

    /// End the session early. Answers already given stay committed.
    pub fn abandon(&self, session: &mut ReviewSession) {
        if session.is_active() {
            info!(
                answered = session.progress().answered,
                total = session.progress().total,
                "review session abandoned"
            );
        }
        session.abandon();
    }
}

fn persistence_failed(error: StorageError) -> SessionLoopError {
    warn!(error = %error, "saving review progress failed");
    SessionLoopError::PersistenceWriteFailed(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{CardDraft, CardStore, Preferences, Stats};
    use drill_core::scheduler::SchedulerError;
    use drill_core::session::{SessionError, SessionState};
    use drill_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn library(n: usize) -> Library {
        let cards = (0..n).map(|i| {
            CardDraft::new(format!("Wort{i}"), format!("word {i}"), "A1")
                .validate()
                .unwrap()
        });
        Library::new(CardStore::from_cards(cards).0, Stats::new(), Preferences::default())
    }

    fn service(repo: &InMemoryRepository) -> SessionLoopService {
        SessionLoopService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[test]
    fn answer_flushes_cards_and_stats() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut library = library(3);
        let mut session = svc
            .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(1))
            .unwrap();

        session.flip().unwrap();
        let result = svc.answer_current(&mut library, &mut session, true).unwrap();

        assert_eq!(result.outcome.box_delta(), 1);
        assert_eq!(result.progress.answered, 1);
        assert_eq!(repo.load_stats().unwrap().unwrap().correct(), 1);
        let saved = repo.load_cards().unwrap();
        let answered = saved
            .iter()
            .find(|c| c.german() == result.outcome.german)
            .unwrap();
        assert_eq!(answered.leitner_box().value(), 2);
    }

    #[test]
    fn failed_flush_keeps_answer_and_session_moves_on() {
        let repo = InMemoryRepository::new();
        repo.set_reject_writes(true);
        let svc = service(&repo);
        let mut library = library(2);
        let mut session = svc
            .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(5))
            .unwrap();

        session.flip().unwrap();
        let err = svc
            .answer_current(&mut library, &mut session, false)
            .unwrap_err();

        assert!(matches!(err, SessionLoopError::PersistenceWriteFailed(_)));
        assert_eq!(library.stats().incorrect(), 1);
        assert!(session.last_outcome().is_some());
        assert_eq!(session.state(), SessionState::Answered);
        assert_eq!(session.advance().unwrap(), SessionState::AwaitingFlip);
    }

    #[test]
    fn state_violation_changes_nothing() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut library = library(1);
        let mut session = svc
            .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(2))
            .unwrap();

        let err = svc
            .answer_current(&mut library, &mut session, true)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionLoopError::Session(SessionError::StateViolation { .. })
        ));
        assert_eq!(library.stats().total_reviews(), 0);
        assert!(repo.load_stats().unwrap().is_none());
    }

    #[test]
    fn empty_library_cannot_start() {
        let svc = service(&InMemoryRepository::new());
        let err = svc
            .start_session(&Library::default(), &ReviewMode::all())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionLoopError::Scheduler(SchedulerError::NoCardsAvailable)
        ));
    }

    #[test]
    fn favorite_toggle_and_abandon() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut library = library(2);
        let mut session = svc
            .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(3))
            .unwrap();

        assert!(svc.toggle_favorite(&mut library, &session).unwrap());
        assert_eq!(
            repo.load_cards().unwrap().iter().filter(|c| c.is_favorite()).count(),
            1
        );

        svc.abandon(&mut session);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(library.store().iter().filter(|c| c.is_favorite()).count(), 1);
    }
}
