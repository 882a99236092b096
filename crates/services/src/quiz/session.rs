use std::num::NonZeroU32;
use std::sync::Arc;

use quiz_core::model::{GameResult, Question};
use tokio::sync::mpsc;

use super::events::QuizEvent;
use crate::config::DEFAULT_QUESTIONS_AMOUNT;
use crate::error::QuizError;
use crate::questions::QuestionSource;
use crate::results_aggregator::ResultsAggregator;
use crate::Clock;

/// Lifecycle of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Idle,
    Loading,
    AwaitingAnswer,
    Evaluating,
    Finished,
    /// Load failure or short catalog; `start` may be called again.
    Failed,
}

/// Ticket for the transition that follows an answer.
///
/// Bound to one round and one question, so a ticket from before a restart
/// is rejected by [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    round: u64,
    index: u32,
}

/// What `submit_answer` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub is_correct: bool,
    pub advance: PendingAdvance,
}

/// What `advance` did with a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion { index: u32 },
    Finished(GameResult),
    /// The ticket belonged to a superseded round or question.
    Stale,
}

/// Single-round quiz state machine.
///
/// Every transition is reported on the event channel returned by
/// [`QuizSession::new`]. The session never waits on its own; the caller (see
/// `QuizRunner`) decides when the post-answer transition happens.
pub struct QuizSession {
    questions_amount: NonZeroU32,
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    results: ResultsAggregator,
    events: mpsc::UnboundedSender<QuizEvent>,
    phase: QuizPhase,
    round: u64,
    current_index: u32,
    correct_answers: u32,
    current_question: Option<Question>,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        source: Arc<dyn QuestionSource>,
        results: ResultsAggregator,
    ) -> (Self, mpsc::UnboundedReceiver<QuizEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            questions_amount: DEFAULT_QUESTIONS_AMOUNT,
            clock: Clock::default(),
            source,
            results,
            events,
            phase: QuizPhase::Idle,
            round: 0,
            current_index: 0,
            correct_answers: 0,
            current_question: None,
        };
        (session, rx)
    }

    #[must_use]
    pub fn with_questions_amount(mut self, amount: NonZeroU32) -> Self {
        self.questions_amount = amount;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn questions_amount(&self) -> u32 {
        self.questions_amount.get()
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Reset the round, load the catalog and deliver the first question.
    ///
    /// Failures are also emitted as events.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DataLoad` or `QuizError::CatalogExhausted`.
    pub async fn start(&mut self) -> Result<(), QuizError> {
        self.round = self.round.wrapping_add(1);
        self.current_index = 0;
        self.correct_answers = 0;
        self.current_question = None;
        self.phase = QuizPhase::Loading;
        log::info!("starting round {}", self.round);

        if let Err(err) = self.source.load_catalog().await {
            log::warn!("catalog load failed: {err}");
            self.phase = QuizPhase::Failed;
            self.emit(QuizEvent::DataLoadError(err.clone()));
            return Err(err.into());
        }

        self.fetch_current().await
    }

    /// Abandon the current round, without recording it, and start a new one.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::start`].
    pub async fn restart(&mut self) -> Result<(), QuizError> {
        if matches!(self.phase, QuizPhase::AwaitingAnswer | QuizPhase::Evaluating) {
            log::debug!(
                "abandoning round {} at question {}",
                self.round,
                self.current_index + 1
            );
        }
        self.start().await
    }

    /// Score the pending question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` when no question is awaiting an
    /// answer, e.g. for a repeated tap during the feedback delay.
    pub fn submit_answer(&mut self, choice: bool) -> Result<AnsweredQuestion, QuizError> {
        if self.phase != QuizPhase::AwaitingAnswer {
            log::debug!("answer ignored in phase {:?}", self.phase);
            return Err(QuizError::NoActiveQuestion);
        }
        let Some(question) = self.current_question.take() else {
            log::debug!("answer ignored: no current question");
            return Err(QuizError::NoActiveQuestion);
        };

        let is_correct = question.is_correct(choice);
        if is_correct {
            self.correct_answers += 1;
        }
        self.phase = QuizPhase::Evaluating;
        self.emit(QuizEvent::AnswerEvaluated {
            index: self.current_index,
            is_correct,
        });

        Ok(AnsweredQuestion {
            is_correct,
            advance: PendingAdvance {
                round: self.round,
                index: self.current_index,
            },
        })
    }

    /// Move past the answered question: fetch the next one or finish the round.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DataLoad` or `QuizError::CatalogExhausted` when the
    /// next question cannot be delivered, and `QuizError::Persistence` when
    /// the finished round cannot be stored (the result is still emitted).
    pub async fn advance(&mut self, pending: PendingAdvance) -> Result<AdvanceOutcome, QuizError> {
        let current = PendingAdvance {
            round: self.round,
            index: self.current_index,
        };
        if self.phase != QuizPhase::Evaluating || pending != current {
            log::debug!("dropping stale advance {pending:?}, now at {current:?}");
            return Ok(AdvanceOutcome::Stale);
        }

        if self.current_index + 1 < self.questions_amount.get() {
            self.current_index += 1;
            self.phase = QuizPhase::Loading;
            self.fetch_current().await?;
            return Ok(AdvanceOutcome::NextQuestion {
                index: self.current_index,
            });
        }

        self.finish().await.map(AdvanceOutcome::Finished)
    }

    async fn fetch_current(&mut self) -> Result<(), QuizError> {
        match self.source.next_question().await {
            Ok(Some(question)) => {
                log::debug!(
                    "question {}/{} ready",
                    self.current_index + 1,
                    self.questions_amount
                );
                self.current_question = Some(question.clone());
                self.phase = QuizPhase::AwaitingAnswer;
                self.emit(QuizEvent::QuestionReady {
                    question,
                    index: self.current_index,
                    total: self.questions_amount.get(),
                });
                Ok(())
            }
            Ok(None) => {
                let delivered = self.current_index;
                let expected = self.questions_amount.get();
                log::warn!("catalog exhausted after {delivered} of {expected} questions");
                self.phase = QuizPhase::Failed;
                self.emit(QuizEvent::CatalogExhausted {
                    delivered,
                    expected,
                });
                Err(QuizError::CatalogExhausted {
                    delivered,
                    expected,
                })
            }
            Err(err) => {
                log::warn!("question fetch failed: {err}");
                self.phase = QuizPhase::Failed;
                self.emit(QuizEvent::DataLoadError(err.clone()));
                Err(err.into())
            }
        }
    }

    async fn finish(&mut self) -> Result<GameResult, QuizError> {
        let result = GameResult::new(
            self.correct_answers,
            self.questions_amount.get(),
            self.clock.now(),
        )
        .map_err(quiz_core::Error::from)?;
        self.phase = QuizPhase::Finished;
        log::info!(
            "round {} finished: {}/{}",
            self.round,
            result.correct(),
            result.total()
        );

        match self.results.store(result).await {
            Ok(summary) => {
                self.emit(QuizEvent::RoundFinished {
                    result,
                    summary: Some(summary),
                });
                Ok(result)
            }
            Err(err) => {
                log::warn!("could not store round result: {err}");
                self.emit(QuizEvent::RoundFinished {
                    result,
                    summary: None,
                });
                self.emit(QuizEvent::PersistenceError(err.clone()));
                Err(err.into())
            }
        }
    }

    fn emit(&self, event: QuizEvent) {
        if self.events.send(event).is_err() {
            log::debug!("event dropped: no listener");
        }
    }
}
