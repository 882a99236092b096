#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
pub mod statistics;

pub use repository::{InMemoryStatisticsStore, StatKey, StatValue, StatisticsStore, Storage, StorageError};
