use thiserror::Error;

use crate::model::{GameResultError, QuestionError, StatisticsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    GameResult(#[from] GameResultError),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}
