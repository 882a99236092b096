use std::sync::Arc;

use storage::repository::Storage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{CatalogSource, QuizConfig};
use crate::error::AppServicesError;
use crate::questions::{BundledQuestionSource, FileQuestionSource, HttpQuestionSource, QuestionSource};
use crate::quiz::{QuizEvent, QuizHandle, QuizRunner, QuizSession};
use crate::results_aggregator::ResultsAggregator;
use crate::Clock;

/// Assembles the question source, statistics and session from configuration.
#[derive(Clone)]
pub struct QuizServices {
    config: QuizConfig,
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    results: ResultsAggregator,
}

impl QuizServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: QuizConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, config, clock))
    }

    /// Build services with throwaway in-memory statistics.
    #[must_use]
    pub fn in_memory(config: QuizConfig, clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), config, clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, config: QuizConfig, clock: Clock) -> Self {
        let questions = question_source(&config.catalog);
        let results = ResultsAggregator::new(Arc::clone(&storage.statistics));
        Self {
            config,
            clock,
            questions,
            results,
        }
    }

    /// Replace the configured question source.
    #[must_use]
    pub fn with_question_source(mut self, questions: Arc<dyn QuestionSource>) -> Self {
        self.questions = questions;
        self
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn results(&self) -> ResultsAggregator {
        self.results.clone()
    }

    /// A fresh, idle session and its event stream.
    #[must_use]
    pub fn new_session(&self) -> (QuizSession, mpsc::UnboundedReceiver<QuizEvent>) {
        let (session, events) =
            QuizSession::new(Arc::clone(&self.questions), self.results.clone());
        let session = session
            .with_questions_amount(self.config.questions_amount)
            .with_clock(self.clock);
        (session, events)
    }

    /// Spawn a runner around a fresh session.
    #[must_use]
    pub fn spawn_runner(
        &self,
    ) -> (
        QuizHandle,
        mpsc::UnboundedReceiver<QuizEvent>,
        JoinHandle<QuizSession>,
    ) {
        let (session, events) = self.new_session();
        let (handle, task) = QuizRunner::spawn(session, self.config.answer_dwell);
        (handle, events, task)
    }
}

fn question_source(catalog: &CatalogSource) -> Arc<dyn QuestionSource> {
    match catalog {
        CatalogSource::Bundled => Arc::new(BundledQuestionSource::movies()),
        CatalogSource::File(path) => Arc::new(FileQuestionSource::new(path.clone())),
        CatalogSource::Remote(url) => Arc::new(HttpQuestionSource::new(url.clone())),
    }
}
