//! Mapping between `StatisticsRecord` and the six stored fields.

use chrono::{DateTime, Utc};
use quiz_core::model::{GameResult, StatisticsRecord};

use crate::repository::{StatKey, StatValue, StatisticsStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u64_from_i64(key: StatKey, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("negative {key}: {v}")))
}

fn u32_from_i64(key: StatKey, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {key}: {v}")))
}

fn i64_from_u64(key: StatKey, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{key} overflow")))
}

async fn read_int(store: &dyn StatisticsStore, key: StatKey) -> Result<i64, StorageError> {
    match store.get(key).await? {
        Some(value) => value.as_int(key),
        None => Ok(0),
    }
}

async fn read_date(
    store: &dyn StatisticsStore,
    key: StatKey,
) -> Result<DateTime<Utc>, StorageError> {
    match store.get(key).await? {
        Some(value) => value.as_timestamp(key),
        None => Ok(DateTime::<Utc>::UNIX_EPOCH),
    }
}

/// Read the full record. Missing fields default to zero and the epoch.
///
/// # Errors
///
/// Returns `StorageError` if a field cannot be read or the stored counters are inconsistent.
pub async fn load_record(store: &dyn StatisticsStore) -> Result<StatisticsRecord, StorageError> {
    let games_count = u64_from_i64(
        StatKey::GamesCount,
        read_int(store, StatKey::GamesCount).await?,
    )?;
    let total_correct = u64_from_i64(
        StatKey::TotalCorrectAnswers,
        read_int(store, StatKey::TotalCorrectAnswers).await?,
    )?;
    let total_asked = u64_from_i64(
        StatKey::TotalQuestionsAsked,
        read_int(store, StatKey::TotalQuestionsAsked).await?,
    )?;
    let best_correct = u32_from_i64(
        StatKey::BestGameCorrect,
        read_int(store, StatKey::BestGameCorrect).await?,
    )?;
    let best_total = u32_from_i64(
        StatKey::BestGameTotal,
        read_int(store, StatKey::BestGameTotal).await?,
    )?;
    let best_date = read_date(store, StatKey::BestGameDate).await?;

    let best_game = GameResult::from_persisted(best_correct, best_total, best_date).map_err(ser)?;
    StatisticsRecord::from_persisted(games_count, total_correct, total_asked, best_game)
        .map_err(ser)
}

/// All six fields of `record`, ready for a single `set_many` call.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a counter does not fit the storage integer.
pub fn record_entries(record: &StatisticsRecord) -> Result<Vec<(StatKey, StatValue)>, StorageError> {
    let best = record.best_game();
    Ok(vec![
        (
            StatKey::GamesCount,
            StatValue::Int(i64_from_u64(StatKey::GamesCount, record.games_count())?),
        ),
        (
            StatKey::TotalCorrectAnswers,
            StatValue::Int(i64_from_u64(
                StatKey::TotalCorrectAnswers,
                record.total_correct_answers(),
            )?),
        ),
        (
            StatKey::TotalQuestionsAsked,
            StatValue::Int(i64_from_u64(
                StatKey::TotalQuestionsAsked,
                record.total_questions_asked(),
            )?),
        ),
        (StatKey::BestGameCorrect, StatValue::Int(i64::from(best.correct()))),
        (StatKey::BestGameTotal, StatValue::Int(i64::from(best.total()))),
        (StatKey::BestGameDate, StatValue::Timestamp(best.date())),
    ])
}

/// Persist `record` in one all-or-nothing write.
///
/// # Errors
///
/// Returns `StorageError` if the write fails; the stored record is unchanged.
pub async fn save_record(
    store: &dyn StatisticsStore,
    record: &StatisticsRecord,
) -> Result<(), StorageError> {
    let entries = record_entries(record)?;
    store.set_many(&entries).await
}
