use quiz_core::model::{GameResult, StatisticsSnapshot};
use quiz_core::time::format_short;

/// Text for the end-of-round dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl RoundSummary {
    #[must_use]
    pub fn new(result: &GameResult, summary: Option<&StatisticsSnapshot>) -> Self {
        let mut lines = vec![format!(
            "Your result: {}/{}",
            result.correct(),
            result.total()
        )];

        if let Some(summary) = summary {
            let best = summary.best_game;
            lines.push(format!("Quizzes played: {}", summary.games_count));
            lines.push(format!(
                "Record: {}/{} ({})",
                best.correct(),
                best.total(),
                format_short(best.date())
            ));
            lines.push(format!("Average accuracy: {:.2}%", summary.total_accuracy));
        } else {
            lines.push("Statistics could not be saved.".to_owned());
        }

        Self {
            title: "This round is over!".to_owned(),
            message: lines.join("\n"),
            button_text: "Play again".to_owned(),
        }
    }
}
