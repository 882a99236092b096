use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
///
/// Causes are carried as strings so the error stays `Clone` and can be
/// forwarded to the presentation layer inside events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The six logical fields of the statistics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    GamesCount,
    BestGameCorrect,
    BestGameTotal,
    BestGameDate,
    TotalCorrectAnswers,
    TotalQuestionsAsked,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::GamesCount,
        StatKey::BestGameCorrect,
        StatKey::BestGameTotal,
        StatKey::BestGameDate,
        StatKey::TotalCorrectAnswers,
        StatKey::TotalQuestionsAsked,
    ];

    /// Stable key name used by persistent backends.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::GamesCount => "gamesCount",
            StatKey::BestGameCorrect => "bestGameCorrect",
            StatKey::BestGameTotal => "bestGameTotal",
            StatKey::BestGameDate => "bestGameDate",
            StatKey::TotalCorrectAnswers => "totalCorrectAnswers",
            StatKey::TotalQuestionsAsked => "totalQuestionsAsked",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored under a [`StatKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatValue {
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl StatValue {
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the value is not an integer.
    pub fn as_int(&self, key: StatKey) -> Result<i64, StorageError> {
        match self {
            StatValue::Int(v) => Ok(*v),
            StatValue::Timestamp(_) => Err(StorageError::Serialization(format!(
                "expected integer for {key}"
            ))),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the value is not a timestamp.
    pub fn as_timestamp(&self, key: StatKey) -> Result<DateTime<Utc>, StorageError> {
        match self {
            StatValue::Timestamp(t) => Ok(*t),
            StatValue::Int(_) => Err(StorageError::Serialization(format!(
                "expected timestamp for {key}"
            ))),
        }
    }
}

/// Key/value contract for the durable statistics record.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    /// Read a single field. Missing fields return `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError>;

    /// Write a single field.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: StatKey, value: StatValue) -> Result<(), StorageError>;

    /// Write several fields as one unit: either all are stored or none are.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be stored; no field changes.
    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError>;
}

/// In-memory statistics store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct InMemoryStatisticsStore {
    values: Arc<Mutex<HashMap<StatKey, StatValue>>>,
}

impl InMemoryStatisticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatisticsStore for InMemoryStatisticsStore {
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).copied())
    }

    async fn set(&self, key: StatKey, value: StatValue) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value);
        Ok(())
    }

    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.extend(entries.iter().copied());
        Ok(())
    }
}

/// Storage handles behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub statistics: Arc<dyn StatisticsStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            statistics: Arc::new(InMemoryStatisticsStore::new()),
        }
    }
}
