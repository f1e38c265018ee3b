use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One tradable symbol as delivered by a universe provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseRow {
    pub symbol: String,
    /// Empty string when the provider has no country for the symbol.
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sector: Option<String>,
}

impl UniverseRow {
    pub fn new(symbol: impl Into<String>, country: impl Into<String>, sector: Option<&str>) -> Self {
        Self {
            symbol: symbol.into(),
            country: country.into(),
            sector: sector.map(str::to_string),
        }
    }
}

/// The three option lists shown in the symbol, sector and country pickers.
///
/// Built once at startup and shared read-only between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseOptions {
    pub symbols: Vec<String>,
    pub countries: Vec<String>,
    pub sectors: Vec<String>,
}

impl UniverseOptions {
    /// Derive deduplicated option lists, keeping first-seen order.
    ///
    /// Rows with an empty country are left out of the country list and rows
    /// without a sector are left out of the sector list.
    pub fn from_rows(rows: &[UniverseRow]) -> Self {
        let mut options = Self::default();
        let mut seen_symbols = HashSet::new();
        let mut seen_countries = HashSet::new();
        let mut seen_sectors = HashSet::new();

        for row in rows {
            if seen_symbols.insert(row.symbol.as_str()) {
                options.symbols.push(row.symbol.clone());
            }
            if !row.country.is_empty() && seen_countries.insert(row.country.as_str()) {
                options.countries.push(row.country.clone());
            }
            if let Some(sector) = &row.sector {
                if seen_sectors.insert(sector.as_str()) {
                    options.sectors.push(sector.clone());
                }
            }
        }

        options
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn picker_options(&self, picker: Picker) -> &[String] {
        match picker {
            Picker::Symbols => &self.symbols,
            Picker::Sectors => &self.sectors,
            Picker::Countries => &self.countries,
        }
    }
}

/// The three multi-select widgets of the parameter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Picker {
    Symbols,
    Sectors,
    Countries,
}

impl std::fmt::Display for Picker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Picker::Symbols => write!(f, "symbols"),
            Picker::Sectors => write!(f, "sectors"),
            Picker::Countries => write!(f, "countries"),
        }
    }
}
