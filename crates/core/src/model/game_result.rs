use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameResultError {
    #[error("a game must contain at least one question")]
    EmptyGame,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    correct: u32,
    total: u32,
    date: DateTime<Utc>,
}

impl GameResult {
    /// Build the result of a finished round.
    ///
    /// # Errors
    ///
    /// Returns `GameResultError::EmptyGame` if `total` is zero.
    /// Returns `GameResultError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(correct: u32, total: u32, date: DateTime<Utc>) -> Result<Self, GameResultError> {
        if total == 0 {
            return Err(GameResultError::EmptyGame);
        }
        Self::from_persisted(correct, total, date)
    }

    /// Rehydrate a result from storage.
    ///
    /// Unlike [`GameResult::new`] this accepts `0/0`, which is how an
    /// untouched best-game slot is stored.
    ///
    /// # Errors
    ///
    /// Returns `GameResultError::CorrectExceedsTotal` if `correct > total`.
    pub fn from_persisted(
        correct: u32,
        total: u32,
        date: DateTime<Utc>,
    ) -> Result<Self, GameResultError> {
        if correct > total {
            return Err(GameResultError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            date,
        })
    }

    /// The `0/0` placeholder stored before any game has been played.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            correct: 0,
            total: 0,
            date: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.total == 0
    }

    /// Only `correct` is compared; equal scores are not better.
    #[must_use]
    pub fn is_better_than(&self, other: &GameResult) -> bool {
        self.correct > other.correct
    }
}

impl Default for GameResult {
    fn default() -> Self {
        Self::placeholder()
    }
}
