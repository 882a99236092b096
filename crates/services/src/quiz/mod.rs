mod events;
mod runner;
mod session;
mod summary;

pub use events::QuizEvent;
pub use runner::{QuizHandle, QuizRunner};
pub use session::{AdvanceOutcome, AnsweredQuestion, PendingAdvance, QuizPhase, QuizSession};
pub use summary::RoundSummary;
