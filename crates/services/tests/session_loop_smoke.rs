use std::fs;

use drill_core::scheduler::Scheduler;
use drill_core::session::SessionState;
use drill_core::time::fixed_today;
use services::{AppServices, Clock, ReviewMode, StatsReport};

#[test]
fn first_launch_writes_starter_cards_and_review_works() {
    let dir = tempfile::tempdir().unwrap();
    let services = AppServices::json(dir.path(), Clock::fixed(fixed_today()));

    let library = services.load_library().unwrap();
    assert_eq!(library.store().len(), 2);
    assert!(dir.path().join("data/flashcards.json").exists());

    let session = services
        .session_loop()
        .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(3))
        .unwrap();
    assert_eq!(session.queue().len(), 2);

    let reloaded = services.load_library().unwrap();
    assert_eq!(reloaded.store().len(), 2);
}

#[test]
fn emptied_card_list_is_not_reseeded() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/flashcards.json"), "[]").unwrap();

    let library = AppServices::json(dir.path(), Clock::fixed(fixed_today()))
        .load_library()
        .unwrap();
    assert!(library.store().is_empty());
}

#[test]
fn session_loop_persists_answers_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let services = AppServices::json(dir.path(), Clock::fixed(fixed_today()));

    let mut library = services.load_library().unwrap();

    let loop_svc = services.session_loop();
    let mut session = loop_svc
        .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(21))
        .unwrap();
    let queued = session.queue().len();
    assert_eq!(queued, 2);

    let mut answers = 0;
    while session.state() != SessionState::Complete {
        session.flip().unwrap();
        loop_svc
            .answer_current(&mut library, &mut session, true)
            .unwrap();
        answers += 1;
        session.advance().unwrap();
    }
    assert_eq!(answers, queued);

    let reloaded = services.load_library().unwrap();
    assert_eq!(reloaded.stats().total_reviews(), 2);
    assert_eq!(reloaded.stats().streak(), 1);
    assert_eq!(reloaded.stats().last_review_date(), Some(fixed_today()));
    let total_boxes: u32 = reloaded
        .store()
        .iter()
        .map(|c| u32::from(c.leitner_box().value()))
        .sum();
    assert_eq!(total_boxes, 4);

    assert!(dir.path().join("data/backup/backup.json").exists());
}

#[test]
fn daily_streak_grows_on_consecutive_days() {
    let dir = tempfile::tempdir().unwrap();
    let mut clock = Clock::fixed(fixed_today());

    for expected in 1..=3 {
        let services = AppServices::json(dir.path(), clock);
        let mut library = services.load_library().unwrap();

        let loop_svc = services.session_loop();
        let mut session = loop_svc
            .start_session_with(&library, &ReviewMode::all(), &mut Scheduler::seeded(expected))
            .unwrap();
        session.flip().unwrap();
        loop_svc
            .answer_current(&mut library, &mut session, false)
            .unwrap();
        loop_svc.abandon(&mut session);

        assert_eq!(library.stats().streak(), u32::try_from(expected).unwrap());
        clock.advance_days(1);
    }

    let library = AppServices::json(dir.path(), clock).load_library().unwrap();
    let report = StatsReport::from_stats(library.stats());
    assert_eq!(report.incorrect, 3);
    assert_eq!(report.streak, 3);
    assert!(!report.difficult_words.is_empty());
}

#[test]
fn custom_review_with_invalid_count_uses_default_size() {
    let services = AppServices::in_memory(Clock::fixed(fixed_today()));
    let library = services.load_library().unwrap();

    let mode = ReviewMode::Custom {
        count: "zero".into(),
        level: Some("A1".into()),
        category: None,
    };
    let session = services
        .session_loop()
        .start_session_with(&library, &mode, &mut Scheduler::seeded(0))
        .unwrap();
    assert_eq!(session.queue().len(), 2);
}
