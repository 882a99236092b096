use std::sync::Arc;

use quiz_core::model::{GameResult, StatisticsSnapshot};
use storage::repository::{StatisticsStore, StorageError};
use storage::statistics::{load_record, save_record};
use tokio::sync::Mutex;

/// Folds finished rounds into the persistent statistics record.
#[derive(Clone)]
pub struct ResultsAggregator {
    store: Arc<dyn StatisticsStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ResultsAggregator {
    #[must_use]
    pub fn new(store: Arc<dyn StatisticsStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Record a finished round and return the updated snapshot.
    ///
    /// The six fields are written in a single batch, so a failed write leaves
    /// the stored record exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or written.
    pub async fn store(&self, result: GameResult) -> Result<StatisticsSnapshot, StorageError> {
        let _guard = self.write_lock.lock().await;

        let current = load_record(self.store.as_ref()).await?;
        let next = current
            .with_game(&result)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        save_record(self.store.as_ref(), &next).await?;

        log::info!(
            "stored game {}/{} (games played: {}, best: {}/{})",
            result.correct(),
            result.total(),
            next.games_count(),
            next.best_game().correct(),
            next.best_game().total(),
        );
        Ok(next.snapshot())
    }

    /// Current snapshot without recording anything.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read.
    pub async fn snapshot(&self) -> Result<StatisticsSnapshot, StorageError> {
        let record = load_record(self.store.as_ref()).await?;
        Ok(record.snapshot())
    }
}
