use async_trait::async_trait;
use quiz_core::model::Question;

use super::catalog::{CatalogCursor, default_movie_catalog};
use super::QuestionSource;
use crate::error::DataLoadError;

enum Bundle {
    Movies,
    Questions(Vec<Question>),
}

/// Question source backed by a catalog compiled into the binary or built in memory.
pub struct BundledQuestionSource {
    bundle: Bundle,
    cursor: CatalogCursor,
}

impl BundledQuestionSource {
    /// The built-in movie catalog.
    #[must_use]
    pub fn movies() -> Self {
        Self {
            bundle: Bundle::Movies,
            cursor: CatalogCursor::default(),
        }
    }

    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            bundle: Bundle::Questions(questions),
            cursor: CatalogCursor::default(),
        }
    }
}

impl Default for BundledQuestionSource {
    fn default() -> Self {
        Self::movies()
    }
}

#[async_trait]
impl QuestionSource for BundledQuestionSource {
    async fn load_catalog(&self) -> Result<(), DataLoadError> {
        let questions = match &self.bundle {
            Bundle::Movies => default_movie_catalog()?,
            Bundle::Questions(questions) => questions.clone(),
        };
        self.cursor.reset(questions)
    }

    async fn next_question(&self) -> Result<Option<Question>, DataLoadError> {
        self.cursor.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requires_load_before_reading() {
        let source = BundledQuestionSource::movies();
        assert_eq!(
            source.next_question().await,
            Err(DataLoadError::NotLoaded)
        );
    }

    #[tokio::test]
    async fn yields_movies_in_order_then_none() {
        let source = BundledQuestionSource::movies();
        source.load_catalog().await.unwrap();

        let mut names = Vec::new();
        while let Some(question) = source.next_question().await.unwrap() {
            names.push(question.image().name().unwrap_or_default().to_owned());
        }
        assert_eq!(names.len(), 10);
        assert_eq!(names.first().map(String::as_str), Some("The Godfather"));
        assert_eq!(names.last().map(String::as_str), Some("Vivarium"));
        assert_eq!(source.next_question().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reload_starts_over() {
        let q = Question::named("Tesla", "Rated above 6?", false).unwrap();
        let source = BundledQuestionSource::new(vec![q.clone()]);
        source.load_catalog().await.unwrap();
        assert_eq!(source.next_question().await.unwrap(), Some(q.clone()));
        source.load_catalog().await.unwrap();
        assert_eq!(source.next_question().await.unwrap(), Some(q));
    }
}
