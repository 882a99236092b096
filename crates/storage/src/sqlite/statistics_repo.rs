use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{StatKey, StatValue, StatisticsStore, StorageError};

const UPSERT: &str = r"
    INSERT INTO statistics (key, int_value, time_value)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        int_value = excluded.int_value,
        time_value = excluded.time_value
";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn columns(value: StatValue) -> (Option<i64>, Option<DateTime<Utc>>) {
    match value {
        StatValue::Int(v) => (Some(v), None),
        StatValue::Timestamp(t) => (None, Some(t)),
    }
}

fn map_value_row(key: StatKey, row: &sqlx::sqlite::SqliteRow) -> Result<StatValue, StorageError> {
    let int_value: Option<i64> = row.try_get("int_value").map_err(ser)?;
    let time_value: Option<DateTime<Utc>> = row.try_get("time_value").map_err(ser)?;
    match (int_value, time_value) {
        (Some(v), None) => Ok(StatValue::Int(v)),
        (None, Some(t)) => Ok(StatValue::Timestamp(t)),
        _ => Err(StorageError::Serialization(format!(
            "malformed statistics row for {key}"
        ))),
    }
}

#[async_trait]
impl StatisticsStore for SqliteRepository {
    async fn get(&self, key: StatKey) -> Result<Option<StatValue>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT int_value, time_value
                FROM statistics
                WHERE key = ?1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| map_value_row(key, &row)).transpose()
    }

    async fn set(&self, key: StatKey, value: StatValue) -> Result<(), StorageError> {
        let (int_value, time_value) = columns(value);
        sqlx::query(UPSERT)
            .bind(key.as_str())
            .bind(int_value)
            .bind(time_value)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(StatKey, StatValue)]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for (key, value) in entries {
            let (int_value, time_value) = columns(*value);
            sqlx::query(UPSERT)
                .bind(key.as_str())
                .bind(int_value)
                .bind(time_value)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        log::debug!("stored {} statistics fields", entries.len());
        Ok(())
    }
}
