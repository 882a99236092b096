use quiz_core::model::{GameResult, Question, StatisticsSnapshot};
use storage::repository::StorageError;

use crate::error::DataLoadError;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    /// A question is waiting for an answer.
    QuestionReady {
        question: Question,
        index: u32,
        total: u32,
    },
    /// Feedback for the answer just given.
    AnswerEvaluated { index: u32, is_correct: bool },
    /// The round is over. `summary` is `None` when the result could not be stored.
    RoundFinished {
        result: GameResult,
        summary: Option<StatisticsSnapshot>,
    },
    DataLoadError(DataLoadError),
    CatalogExhausted { delivered: u32, expected: u32 },
    PersistenceError(StorageError),
}

impl QuizEvent {
    /// `"3/10"` style counter for `QuestionReady`.
    #[must_use]
    pub fn progress_label(&self) -> Option<String> {
        match self {
            QuizEvent::QuestionReady { index, total, .. } => Some(format!("{}/{total}", index + 1)),
            _ => None,
        }
    }
}
