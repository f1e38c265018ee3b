use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{rows_from_records, RawUniverseRecord, UniverseError, UniverseProvider};
use crate::types::UniverseRow;

/// Fetches the universe as a JSON array of `{symbol, country, sector}` objects.
#[derive(Debug, Clone)]
pub struct HttpUniverseProvider {
    client: Client,
    url: String,
}

impl HttpUniverseProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UniverseError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn parse(body: &str) -> Result<Vec<UniverseRow>, UniverseError> {
        let records: Vec<RawUniverseRecord> = serde_json::from_str(body)?;
        rows_from_records(records)
    }
}

#[async_trait]
impl UniverseProvider for HttpUniverseProvider {
    async fn fetch_rows(&self) -> Result<Vec<UniverseRow>, UniverseError> {
        debug!("Fetching universe from {}", self.url);
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse(&body)
    }

    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }
}
