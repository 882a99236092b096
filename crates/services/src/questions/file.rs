use std::path::PathBuf;

use async_trait::async_trait;
use quiz_core::model::Question;

use super::catalog::{CatalogCursor, parse_catalog};
use super::QuestionSource;
use crate::error::DataLoadError;

/// Question source that reads a JSON catalog from disk on every load.
pub struct FileQuestionSource {
    path: PathBuf,
    cursor: CatalogCursor,
}

impl FileQuestionSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: CatalogCursor::default(),
        }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    async fn load_catalog(&self) -> Result<(), DataLoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|err| DataLoadError::Io(format!("{}: {err}", self.path.display())))?;
        self.cursor.reset(parse_catalog(&bytes)?)
    }

    async fn next_question(&self) -> Result<Option<Question>, DataLoadError> {
        self.cursor.next()
    }
}
