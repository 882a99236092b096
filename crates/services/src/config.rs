use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_QUESTIONS_AMOUNT: NonZeroU32 = NonZeroU32::new(10).unwrap();
pub const DEFAULT_ANSWER_DWELL: Duration = Duration::from_millis(1000);

/// Where the question catalog comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CatalogSource {
    /// The built-in movie catalog.
    #[default]
    Bundled,
    File(PathBuf),
    Remote(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub questions_amount: NonZeroU32,
    /// How long answer feedback stays on screen before the next question.
    pub answer_dwell: Duration,
    pub catalog: CatalogSource,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_amount: DEFAULT_QUESTIONS_AMOUNT,
            answer_dwell: DEFAULT_ANSWER_DWELL,
            catalog: CatalogSource::Bundled,
        }
    }
}

impl QuizConfig {
    /// Read overrides from `QUIZ_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`QuizConfig::from_env`] with a custom variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("QUIZ_QUESTIONS_AMOUNT") {
            let amount = parse_number("QUIZ_QUESTIONS_AMOUNT", &raw)?;
            config = config.with_questions_amount(amount)?;
        }

        if let Some(raw) = get("QUIZ_ANSWER_DWELL_MS") {
            let millis = parse_number("QUIZ_ANSWER_DWELL_MS", &raw)?;
            config.answer_dwell = Duration::from_millis(u64::from(millis));
        }

        match (get("QUIZ_CATALOG_URL"), get("QUIZ_CATALOG_PATH")) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingCatalogs),
            (Some(url), None) => config = config.with_remote_catalog(url)?,
            (None, Some(path)) => config.catalog = CatalogSource::File(PathBuf::from(path)),
            (None, None) => {}
        }

        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ZeroQuestions` if `amount` is zero.
    pub fn with_questions_amount(mut self, amount: u32) -> Result<Self, ConfigError> {
        self.questions_amount = NonZeroU32::new(amount).ok_or(ConfigError::ZeroQuestions)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_answer_dwell(mut self, dwell: Duration) -> Self {
        self.answer_dwell = dwell;
        self
    }

    #[must_use]
    pub fn with_catalog_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog = CatalogSource::File(path.into());
        self
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCatalogUrl` unless `url` is an absolute http(s) URL.
    pub fn with_remote_catalog(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_owned();
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                self.catalog = CatalogSource::Remote(url);
                Ok(self)
            }
            _ => Err(ConfigError::InvalidCatalogUrl(url)),
        }
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        raw: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.questions_amount.get(), 10);
        assert_eq!(config.answer_dwell, Duration::from_secs(1));
    }

    #[test]
    fn reads_overrides() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("QUIZ_QUESTIONS_AMOUNT", "5"),
            ("QUIZ_ANSWER_DWELL_MS", "250"),
            ("QUIZ_CATALOG_PATH", "movies.json"),
        ]))
        .unwrap();
        assert_eq!(config.questions_amount.get(), 5);
        assert_eq!(config.answer_dwell, Duration::from_millis(250));
        assert_eq!(config.catalog, CatalogSource::File("movies.json".into()));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert_eq!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_QUESTIONS_AMOUNT", "0")])).unwrap_err(),
            ConfigError::ZeroQuestions
        );
        assert!(matches!(
            QuizConfig::from_lookup(lookup(&[("QUIZ_ANSWER_DWELL_MS", "soon")])).unwrap_err(),
            ConfigError::InvalidNumber { key: "QUIZ_ANSWER_DWELL_MS", .. }
        ));
    }

    #[test]
    fn validates_catalog_url() {
        let config = QuizConfig::from_lookup(lookup(&[(
            "QUIZ_CATALOG_URL",
            "https://example.com/movies.json",
        )]))
        .unwrap();
        assert_eq!(
            config.catalog,
            CatalogSource::Remote("https://example.com/movies.json".into())
        );

        assert!(matches!(
            QuizConfig::default().with_remote_catalog("ftp://example.com/x"),
            Err(ConfigError::InvalidCatalogUrl(_))
        ));
        assert_eq!(
            QuizConfig::from_lookup(lookup(&[
                ("QUIZ_CATALOG_URL", "https://example.com/a.json"),
                ("QUIZ_CATALOG_PATH", "a.json"),
            ]))
            .unwrap_err(),
            ConfigError::ConflictingCatalogs
        );
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = QuizConfig::from_lookup(lookup(&[("QUIZ_QUESTIONS_AMOUNT", "  ")])).unwrap();
        assert_eq!(config.questions_amount, DEFAULT_QUESTIONS_AMOUNT);
    }
}
