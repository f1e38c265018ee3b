use async_trait::async_trait;

use super::{UniverseError, UniverseProvider};
use crate::types::UniverseRow;

const SAMPLE_UNIVERSE: &[(&str, &str, Option<&str>)] = &[
    ("AAPL", "United States", Some("Technology")),
    ("MSFT", "United States", Some("Technology")),
    ("NVDA", "United States", Some("Technology")),
    ("JPM", "United States", Some("Financial Services")),
    ("XOM", "United States", Some("Energy")),
    ("JNJ", "United States", Some("Healthcare")),
    ("SAP", "Germany", Some("Technology")),
    ("SIE", "Germany", Some("Industrials")),
    ("AIR", "France", Some("Industrials")),
    ("MC", "France", Some("Consumer Cyclical")),
    ("TTE", "France", Some("Energy")),
    ("NESN", "Switzerland", Some("Consumer Defensive")),
    ("NOVN", "Switzerland", Some("Healthcare")),
    ("SHEL", "United Kingdom", Some("Energy")),
    ("HSBA", "United Kingdom", Some("Financial Services")),
    ("7203", "Japan", Some("Consumer Cyclical")),
    ("SPY", "", None),
];

/// Small fixed universe used when no external source is configured.
#[derive(Debug, Clone, Default)]
pub struct BuiltinUniverseProvider;

impl BuiltinUniverseProvider {
    pub fn rows() -> Vec<UniverseRow> {
        SAMPLE_UNIVERSE
            .iter()
            .map(|(symbol, country, sector)| UniverseRow::new(*symbol, *country, *sector))
            .collect()
    }
}

#[async_trait]
impl UniverseProvider for BuiltinUniverseProvider {
    async fn fetch_rows(&self) -> Result<Vec<UniverseRow>, UniverseError> {
        Ok(Self::rows())
    }

    fn describe(&self) -> String {
        "builtin".to_string()
    }
}
