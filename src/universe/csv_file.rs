use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::{rows_from_records, RawUniverseRecord, UniverseError, UniverseProvider};
use crate::types::UniverseRow;

/// Reads the universe from a CSV file with `symbol,country,sector` columns.
#[derive(Debug, Clone)]
pub struct CsvUniverseProvider {
    path: PathBuf,
}

impl CsvUniverseProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(bytes: &[u8]) -> Result<Vec<UniverseRow>, UniverseError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(bytes);

        let records = reader
            .deserialize::<RawUniverseRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        rows_from_records(records)
    }
}

#[async_trait]
impl UniverseProvider for CsvUniverseProvider {
    async fn fetch_rows(&self) -> Result<Vec<UniverseRow>, UniverseError> {
        debug!("Reading universe CSV from {}", self.path.display());
        let bytes = tokio::fs::read(&self.path).await.map_err(|source| UniverseError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Self::parse(&bytes)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}
