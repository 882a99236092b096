use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("image name cannot be empty")]
    EmptyImageName,

    #[error("image payload cannot be empty")]
    EmptyImageBytes,
}

/// Image attached to a question.
///
/// The engine never decodes it; the presentation layer decides how to load
/// a named asset or render raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionImage {
    Named(String),
    Bytes(Vec<u8>),
}

impl QuestionImage {
    /// Asset name, if the image is referenced by name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            QuestionImage::Named(name) => Some(name),
            QuestionImage::Bytes(_) => None,
        }
    }
}

/// A single yes/no quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    image: QuestionImage,
    text: String,
    correct_answer: bool,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank or the image payload is empty.
    pub fn new(
        image: QuestionImage,
        text: impl Into<String>,
        correct_answer: bool,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        match &image {
            QuestionImage::Named(name) if name.trim().is_empty() => {
                return Err(QuestionError::EmptyImageName);
            }
            QuestionImage::Bytes(bytes) if bytes.is_empty() => {
                return Err(QuestionError::EmptyImageBytes);
            }
            _ => {}
        }

        Ok(Self {
            image,
            text,
            correct_answer,
        })
    }

    /// Shorthand for a question whose image is a named asset.
    ///
    /// # Errors
    ///
    /// Same as [`Question::new`].
    pub fn named(
        image: impl Into<String>,
        text: impl Into<String>,
        correct_answer: bool,
    ) -> Result<Self, QuestionError> {
        Self::new(QuestionImage::Named(image.into()), text, correct_answer)
    }

    #[must_use]
    pub fn image(&self) -> &QuestionImage {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Whether `choice` matches the expected answer.
    #[must_use]
    pub fn is_correct(&self, choice: bool) -> bool {
        choice == self.correct_answer
    }
}
