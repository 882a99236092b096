use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GameResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("correct answers ({correct}) exceed questions asked ({asked})")]
    CorrectExceedsAsked { correct: u64, asked: u64 },

    #[error("counter overflow while recording a game")]
    Overflow,
}

/// Cumulative statistics across every stored game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatisticsRecord {
    games_count: u64,
    total_correct_answers: u64,
    total_questions_asked: u64,
    best_game: GameResult,
}

/// Read-only summary shown after a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub games_count: u64,
    pub best_game: GameResult,
    /// Percentage in `0.0..=100.0`.
    pub total_accuracy: f64,
}

impl StatisticsRecord {
    /// Rehydrate a record from persisted counters.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::CorrectExceedsAsked` if the counters are inconsistent.
    pub fn from_persisted(
        games_count: u64,
        total_correct_answers: u64,
        total_questions_asked: u64,
        best_game: GameResult,
    ) -> Result<Self, StatisticsError> {
        if total_correct_answers > total_questions_asked {
            return Err(StatisticsError::CorrectExceedsAsked {
                correct: total_correct_answers,
                asked: total_questions_asked,
            });
        }
        Ok(Self {
            games_count,
            total_correct_answers,
            total_questions_asked,
            best_game,
        })
    }

    #[must_use]
    pub fn games_count(&self) -> u64 {
        self.games_count
    }

    #[must_use]
    pub fn total_correct_answers(&self) -> u64 {
        self.total_correct_answers
    }

    #[must_use]
    pub fn total_questions_asked(&self) -> u64 {
        self.total_questions_asked
    }

    #[must_use]
    pub fn best_game(&self) -> GameResult {
        self.best_game
    }

    /// Accuracy over every question ever asked, as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_accuracy(&self) -> f64 {
        if self.total_questions_asked == 0 {
            return 0.0;
        }
        100.0 * self.total_correct_answers as f64 / self.total_questions_asked as f64
    }

    /// Returns the record that results from storing `result`.
    ///
    /// `self` is left untouched, so a caller can persist the returned record
    /// in one write and keep the old one if that write fails.
    ///
    /// A first game that scored zero still replaces the `0/0` placeholder,
    /// otherwise the record would read `0/0` instead of `0/total`.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Overflow` if a counter would overflow.
    pub fn with_game(&self, result: &GameResult) -> Result<Self, StatisticsError> {
        let games_count = self
            .games_count
            .checked_add(1)
            .ok_or(StatisticsError::Overflow)?;
        let total_correct_answers = self
            .total_correct_answers
            .checked_add(u64::from(result.correct()))
            .ok_or(StatisticsError::Overflow)?;
        let total_questions_asked = self
            .total_questions_asked
            .checked_add(u64::from(result.total()))
            .ok_or(StatisticsError::Overflow)?;

        let first_zero_game = games_count == 1 && self.best_game.correct() == 0;
        let best_game = if result.is_better_than(&self.best_game) || first_zero_game {
            *result
        } else {
            self.best_game
        };

        Ok(Self {
            games_count,
            total_correct_answers,
            total_questions_asked,
            best_game,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            games_count: self.games_count,
            best_game: self.best_game,
            total_accuracy: self.total_accuracy(),
        }
    }
}
