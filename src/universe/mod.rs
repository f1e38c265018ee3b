pub mod csv_file;
pub mod remote;
pub mod builtin;

pub use csv_file::*;
pub use remote::*;
pub use builtin::*;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{UniverseSettings, UniverseSource};
use crate::types::{UniverseOptions, UniverseRow};

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read universe file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse universe CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("universe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("universe response is not a JSON array of rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed universe row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },
}

/// Source of the tradable-symbol table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniverseProvider: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<UniverseRow>, UniverseError>;
    fn describe(&self) -> String;
}

/// Record shape shared by the CSV and HTTP providers before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUniverseRecord {
    pub symbol: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

impl RawUniverseRecord {
    /// Missing country becomes the empty string, blank sector becomes absent.
    pub fn into_row(self, index: usize) -> Result<UniverseRow, UniverseError> {
        let symbol = self.symbol.unwrap_or_default();
        if symbol.trim().is_empty() {
            return Err(UniverseError::MalformedRow {
                index,
                reason: "empty symbol".to_string(),
            });
        }

        Ok(UniverseRow {
            symbol,
            country: self.country.unwrap_or_default(),
            sector: self.sector.filter(|s| !s.trim().is_empty()),
        })
    }
}

pub fn rows_from_records(records: Vec<RawUniverseRecord>) -> Result<Vec<UniverseRow>, UniverseError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_row(index))
        .collect()
}

pub fn provider_from_settings(settings: &UniverseSettings) -> Result<Box<dyn UniverseProvider>, UniverseError> {
    let provider: Box<dyn UniverseProvider> = match &settings.source {
        UniverseSource::Builtin => Box::new(BuiltinUniverseProvider),
        UniverseSource::Csv { path } => Box::new(CsvUniverseProvider::new(path.clone())),
        UniverseSource::Http { url } => Box::new(HttpUniverseProvider::new(url.clone(), settings.timeout())?),
    };
    Ok(provider)
}

/// Fetch the universe once and derive the picker option lists.
///
/// Provider failures are returned to the caller and abort startup.
pub async fn load_universe(provider: &dyn UniverseProvider) -> Result<UniverseOptions, UniverseError> {
    let rows = provider.fetch_rows().await?;
    let options = UniverseOptions::from_rows(&rows);

    if options.is_empty() {
        warn!("Universe provider {} returned no rows; pickers will be empty", provider.describe());
    } else {
        info!(
            "Loaded {} universe rows from {}: {} symbols, {} countries, {} sectors",
            rows.len(),
            provider.describe(),
            options.symbols.len(),
            options.countries.len(),
            options.sectors.len()
        );
    }

    Ok(options)
}
