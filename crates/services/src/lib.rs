#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod questions;
pub mod quiz;
pub mod results_aggregator;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use config::{CatalogSource, QuizConfig};
pub use error::{AppServicesError, ConfigError, DataLoadError, QuizError};
pub use questions::{BundledQuestionSource, FileQuestionSource, HttpQuestionSource, QuestionSource};
pub use quiz::{QuizEvent, QuizHandle, QuizPhase, QuizRunner, QuizSession, RoundSummary};
pub use results_aggregator::ResultsAggregator;
