mod game_result;
mod question;
mod statistics;

pub use game_result::{GameResult, GameResultError};
pub use question::{Question, QuestionError, QuestionImage};
pub use statistics::{StatisticsError, StatisticsRecord, StatisticsSnapshot};
