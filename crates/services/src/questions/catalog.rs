use std::sync::Mutex;

use quiz_core::model::{Question, QuestionImage};
use serde::Deserialize;

use crate::error::DataLoadError;

const MOVIES_JSON: &str = include_str!("movies.json");

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    questions: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_bytes: Option<Vec<u8>>,
    text: String,
    correct_answer: bool,
}

impl CatalogEntry {
    fn into_question(self, position: usize) -> Result<Question, DataLoadError> {
        let image = match (self.image, self.image_bytes) {
            (Some(name), None) => QuestionImage::Named(name),
            (None, Some(bytes)) => QuestionImage::Bytes(bytes),
            _ => {
                return Err(DataLoadError::InvalidCatalog(format!(
                    "question {position} needs exactly one of image or image_bytes"
                )));
            }
        };
        Question::new(image, self.text, self.correct_answer)
            .map_err(|err| DataLoadError::InvalidCatalog(format!("question {position}: {err}")))
    }
}

/// Parse a catalog JSON document, keeping question order.
///
/// # Errors
///
/// Returns `DataLoadError::InvalidCatalog` for malformed JSON or invalid questions.
pub fn parse_catalog(json: &[u8]) -> Result<Vec<Question>, DataLoadError> {
    let document: CatalogDocument = serde_json::from_slice(json)
        .map_err(|err| DataLoadError::InvalidCatalog(err.to_string()))?;
    document
        .questions
        .into_iter()
        .enumerate()
        .map(|(position, entry)| entry.into_question(position + 1))
        .collect()
}

/// The ten built-in movie questions.
///
/// # Errors
///
/// Returns `DataLoadError::InvalidCatalog` if the embedded catalog is malformed.
pub fn default_movie_catalog() -> Result<Vec<Question>, DataLoadError> {
    parse_catalog(MOVIES_JSON.as_bytes())
}

/// Loaded questions plus the read position, shared by every source.
#[derive(Default)]
pub(crate) struct CatalogCursor {
    state: Mutex<Option<(Vec<Question>, usize)>>,
}

impl CatalogCursor {
    pub(crate) fn reset(&self, questions: Vec<Question>) -> Result<(), DataLoadError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| DataLoadError::Unavailable(e.to_string()))?;
        log::debug!("catalog loaded with {} questions", questions.len());
        *guard = Some((questions, 0));
        Ok(())
    }

    pub(crate) fn next(&self) -> Result<Option<Question>, DataLoadError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| DataLoadError::Unavailable(e.to_string()))?;
        let (questions, position) = guard.as_mut().ok_or(DataLoadError::NotLoaded)?;
        let question = questions.get(*position).cloned();
        if question.is_some() {
            *position += 1;
        }
        Ok(question)
    }
}
