use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::{GameResult, Question, StatisticsRecord};
use quiz_core::time::{fixed_clock, fixed_now};
use services::quiz::AdvanceOutcome;
use services::{
    BundledQuestionSource, DataLoadError, QuestionSource, QuizError, QuizEvent, QuizPhase,
    QuizSession, ResultsAggregator,
};
use storage::repository::{
    InMemoryStatisticsStore, StatKey, StatValue, StatisticsStore, StorageError,
};
use storage::statistics::{load_record, save_record};
use tokio::sync::mpsc::UnboundedReceiver;

/// Counts batch writes and can be switched to fail them.
#[derive(Clone, Default)]
struct ProbeStore {
    inner: InMemoryStatisticsStore,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

#[async_trait]
impl StatisticsStore for ProbeStore {
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: StatKey, value: StatValue) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.set_many(entries).await
    }
}

/// Fails the first load, then serves the movie catalog.
struct FlakySource {
    failed_once: AtomicBool,
    inner: BundledQuestionSource,
}

#[async_trait]
impl QuestionSource for FlakySource {
    async fn load_catalog(&self) -> Result<(), DataLoadError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(DataLoadError::HttpStatus(503));
        }
        self.inner.load_catalog().await
    }

    async fn next_question(&self) -> Result<Option<Question>, DataLoadError> {
        self.inner.next_question().await
    }
}

fn session_with(
    source: Arc<dyn QuestionSource>,
    store: Arc<dyn StatisticsStore>,
    amount: u32,
) -> (QuizSession, UnboundedReceiver<QuizEvent>) {
    let (session, events) = QuizSession::new(source, ResultsAggregator::new(store));
    (
        session
            .with_questions_amount(NonZeroU32::new(amount).unwrap())
            .with_clock(fixed_clock()),
        events,
    )
}

fn drain(events: &mut UnboundedReceiver<QuizEvent>) -> Vec<QuizEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn assert_score_bounds(session: &QuizSession) {
    assert!(session.correct_answers() <= session.questions_amount());
    assert!(session.correct_answers() <= session.current_index() + 1);
}

/// Answers every question; `right` decides whether each answer is correct.
async fn play_round(session: &mut QuizSession, right: impl Fn(u32) -> bool) -> Result<GameResult, QuizError> {
    session.start().await?;
    loop {
        assert_score_bounds(session);
        let index = session.current_index();
        let expected = session
            .current_question()
            .map(Question::correct_answer)
            .expect("question pending");
        let choice = if right(index) { expected } else { !expected };
        let answered = session.submit_answer(choice)?;
        assert_score_bounds(session);
        match session.advance(answered.advance).await? {
            AdvanceOutcome::NextQuestion { .. } => {}
            AdvanceOutcome::Finished(result) => return Ok(result),
            AdvanceOutcome::Stale => panic!("fresh ticket reported stale"),
        }
    }
}

#[tokio::test]
async fn all_correct_round_is_recorded_once() {
    let store = ProbeStore::default();
    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(store.clone()),
        10,
    );

    let result = play_round(&mut session, |_| true).await.unwrap();
    assert_eq!((result.correct(), result.total()), (10, 10));
    assert_eq!(result.date(), fixed_now());
    assert_eq!(session.phase(), QuizPhase::Finished);
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);

    let events = drain(&mut events);
    let ready = events
        .iter()
        .filter(|e| matches!(e, QuizEvent::QuestionReady { .. }))
        .count();
    assert_eq!(ready, 10);

    match events.last() {
        Some(QuizEvent::RoundFinished {
            result,
            summary: Some(summary),
        }) => {
            assert_eq!(result.correct(), 10);
            assert_eq!(result.total(), 10);
            assert_eq!(summary.games_count, 1);
            assert_eq!(summary.best_game.correct(), 10);
        }
        other => panic!("unexpected last event: {other:?}"),
    }
}

#[tokio::test]
async fn questions_arrive_in_catalog_order() {
    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(InMemoryStatisticsStore::new()),
        10,
    );
    play_round(&mut session, |_| false).await.unwrap();

    let names: Vec<String> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            QuizEvent::QuestionReady { question, .. } => {
                question.image().name().map(str::to_owned)
            }
            _ => None,
        })
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("The Godfather"));
    assert_eq!(names.get(6).map(String::as_str), Some("Old"));
    assert_eq!(names.len(), 10);
}

#[tokio::test]
async fn second_answer_without_new_question_is_rejected() {
    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(InMemoryStatisticsStore::new()),
        10,
    );
    session.start().await.unwrap();

    session.submit_answer(true).unwrap();
    assert!(matches!(
        session.submit_answer(true),
        Err(QuizError::NoActiveQuestion)
    ));
    assert!(session.correct_answers() <= 1);

    let evaluated = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, QuizEvent::AnswerEvaluated { .. }))
        .count();
    assert_eq!(evaluated, 1);
}

#[tokio::test]
async fn restart_mid_round_resets_without_storing() {
    let store = ProbeStore::default();
    let (mut session, _events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(store.clone()),
        10,
    );
    session.start().await.unwrap();
    for _ in 0..3 {
        let answer = session.current_question().unwrap().correct_answer();
        let answered = session.submit_answer(answer).unwrap();
        session.advance(answered.advance).await.unwrap();
    }
    assert_eq!(session.current_index(), 3);
    assert_eq!(session.correct_answers(), 3);

    session.restart().await.unwrap();
    assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.correct_answers(), 0);
    assert_eq!(
        session.current_question().and_then(|q| q.image().name()),
        Some("The Godfather")
    );
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn short_catalog_ends_round_without_result() {
    let questions: Vec<Question> = (1..=3)
        .map(|i| Question::named(format!("Movie {i}"), "Rated above 6?", true).unwrap())
        .collect();
    let store = ProbeStore::default();
    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::new(questions)),
        Arc::new(store.clone()),
        5,
    );

    let err = play_round(&mut session, |_| true).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::CatalogExhausted {
            delivered: 3,
            expected: 5
        }
    ));
    assert_eq!(session.phase(), QuizPhase::Failed);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    assert!(matches!(
        drain(&mut events).last(),
        Some(QuizEvent::CatalogExhausted {
            delivered: 3,
            expected: 5
        })
    ));
}

#[tokio::test]
async fn load_failure_is_reported_and_retryable() {
    let source = FlakySource {
        failed_once: AtomicBool::new(false),
        inner: BundledQuestionSource::movies(),
    };
    let (mut session, mut events) = session_with(
        Arc::new(source),
        Arc::new(InMemoryStatisticsStore::new()),
        10,
    );

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, QuizError::DataLoad(DataLoadError::HttpStatus(503))));
    assert_eq!(session.phase(), QuizPhase::Failed);
    assert!(session.current_question().is_none());
    assert_eq!(
        drain(&mut events),
        vec![QuizEvent::DataLoadError(DataLoadError::HttpStatus(503))]
    );

    session.start().await.unwrap();
    assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    assert!(matches!(
        drain(&mut events).as_slice(),
        [QuizEvent::QuestionReady { index: 0, .. }]
    ));
}

#[tokio::test]
async fn failed_write_still_reports_result_and_keeps_counters() {
    let store = ProbeStore::default();
    let earlier = StatisticsRecord::default()
        .with_game(&GameResult::new(2, 10, fixed_now()).unwrap())
        .unwrap();
    save_record(&store.inner, &earlier).await.unwrap();
    store.fail_writes.store(true, Ordering::SeqCst);

    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(store.clone()),
        2,
    );
    let err = play_round(&mut session, |_| true).await.unwrap_err();
    assert!(matches!(err, QuizError::Persistence(StorageError::Connection(_))));

    let events = drain(&mut events);
    let tail = &events[events.len() - 2..];
    assert!(matches!(
        tail,
        [
            QuizEvent::RoundFinished { summary: None, .. },
            QuizEvent::PersistenceError(StorageError::Connection(_))
        ]
    ));
    if let QuizEvent::RoundFinished { result, .. } = &tail[0] {
        assert_eq!((result.correct(), result.total()), (2, 2));
    }

    let stored = load_record(&store.inner).await.unwrap();
    assert_eq!(stored, earlier);
}

#[tokio::test]
async fn zero_score_first_round_becomes_the_record() {
    let (mut session, mut events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::new(InMemoryStatisticsStore::new()),
        10,
    );
    let result = play_round(&mut session, |_| false).await.unwrap();
    assert_eq!(result.correct(), 0);

    match drain(&mut events).last() {
        Some(QuizEvent::RoundFinished {
            summary: Some(summary),
            ..
        }) => {
            assert_eq!(summary.best_game.correct(), 0);
            assert_eq!(summary.best_game.total(), 10);
            assert!(summary.total_accuracy.abs() < f64::EPSILON);
        }
        other => panic!("unexpected last event: {other:?}"),
    }
}

#[tokio::test]
async fn consecutive_rounds_accumulate_statistics() {
    let store: Arc<dyn StatisticsStore> = Arc::new(InMemoryStatisticsStore::new());
    let (mut session, _events) = session_with(
        Arc::new(BundledQuestionSource::movies()),
        Arc::clone(&store),
        10,
    );

    play_round(&mut session, |i| i < 4).await.unwrap();
    play_round(&mut session, |i| i < 6).await.unwrap();

    let record = load_record(store.as_ref()).await.unwrap();
    assert_eq!(record.games_count(), 2);
    assert_eq!(record.best_game().correct(), 6);
    assert!((record.total_accuracy() - 50.0).abs() < f64::EPSILON);
}
