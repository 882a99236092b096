//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by question sources.
///
/// Causes are kept as strings so the error can ride inside `QuizEvent`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataLoadError {
    #[error("catalog has not been loaded")]
    NotLoaded,
    #[error("catalog could not be read: {0}")]
    Io(String),
    #[error("catalog request failed with status {0}")]
    HttpStatus(u16),
    #[error("catalog request failed: {0}")]
    Http(String),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("question source unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for DataLoadError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Errors emitted by `QuizSession` and `QuizHandle`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
    #[error("catalog ran out after {delivered} of {expected} questions")]
    CatalogExhausted { delivered: u32, expected: u32 },
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
    #[error(transparent)]
    Persistence(#[from] StorageError),
    #[error(transparent)]
    Model(#[from] quiz_core::Error),
    #[error("quiz runner has stopped")]
    RunnerStopped,
}

/// Errors emitted while reading `QuizConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {raw:?}")]
    InvalidNumber { key: &'static str, raw: String },
    #[error("a round needs at least one question")]
    ZeroQuestions,
    #[error("invalid catalog URL {0:?}")]
    InvalidCatalogUrl(String),
    #[error("set either a catalog URL or a catalog path, not both")]
    ConflictingCatalogs,
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
