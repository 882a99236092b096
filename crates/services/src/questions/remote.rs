use async_trait::async_trait;
use quiz_core::model::Question;
use reqwest::Client;

use super::catalog::{CatalogCursor, parse_catalog};
use super::QuestionSource;
use crate::error::DataLoadError;

/// Question source that fetches a JSON catalog over HTTP.
pub struct HttpQuestionSource {
    client: Client,
    url: String,
    cursor: CatalogCursor,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    #[must_use]
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cursor: CatalogCursor::default(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn load_catalog(&self) -> Result<(), DataLoadError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(DataLoadError::HttpStatus(response.status().as_u16()));
        }
        let body = response.bytes().await?;
        self.cursor.reset(parse_catalog(&body)?)
    }

    async fn next_question(&self) -> Result<Option<Question>, DataLoadError> {
        self.cursor.next()
    }
}
