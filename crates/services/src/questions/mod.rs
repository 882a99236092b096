mod bundled;
mod catalog;
mod file;
mod remote;

use async_trait::async_trait;
use quiz_core::model::Question;

pub use crate::error::DataLoadError;
pub use bundled::BundledQuestionSource;
pub use catalog::{default_movie_catalog, parse_catalog};
pub use file::FileQuestionSource;
pub use remote::HttpQuestionSource;

/// Supplies quiz questions from a bulk-loaded catalog.
///
/// Questions come back in catalog order, each at most once per load.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load the full catalog and rewind to its first question.
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError` if the catalog cannot be read or parsed.
    async fn load_catalog(&self) -> Result<(), DataLoadError>;

    /// Next unseen question, or `None` once the catalog is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError::NotLoaded` if no catalog has been loaded.
    async fn next_question(&self) -> Result<Option<Question>, DataLoadError>;
}
