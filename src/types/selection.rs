use serde::{Deserialize, Serialize};

use super::Picker;

/// How the user narrows the universe. Radio values 1 to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    BySymbol,
    BySector,
    ByCountry,
    Default,
}

impl PickMode {
    pub const ALL: [PickMode; 4] = [
        PickMode::BySymbol,
        PickMode::BySector,
        PickMode::ByCountry,
        PickMode::Default,
    ];

    pub fn radio_value(self) -> i64 {
        match self {
            PickMode::BySymbol => 1,
            PickMode::BySector => 2,
            PickMode::ByCountry => 3,
            PickMode::Default => 4,
        }
    }

    /// Map a radio value to a mode. Anything outside 1..=4 means no mode.
    pub fn from_radio(value: i64) -> Option<PickMode> {
        match value {
            1 => Some(PickMode::BySymbol),
            2 => Some(PickMode::BySector),
            3 => Some(PickMode::ByCountry),
            4 => Some(PickMode::Default),
            _ => None,
        }
    }

    /// Lenient parse of whatever the radio control posted.
    ///
    /// Accepts integers and numeric strings; null, other types and
    /// out-of-range values all read as "no mode chosen".
    pub fn from_json(value: Option<&serde_json::Value>) -> Option<PickMode> {
        match value? {
            serde_json::Value::Number(n) => n.as_i64().and_then(Self::from_radio),
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok().and_then(Self::from_radio),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PickMode::BySymbol => "Select Stocks",
            PickMode::BySector => "Select Sectors",
            PickMode::ByCountry => "Select Countries",
            PickMode::Default => "Select Defaults",
        }
    }

    /// The picker whose selection feeds a run in this mode.
    pub fn active_picker(self) -> Option<Picker> {
        match self {
            PickMode::BySymbol => Some(Picker::Symbols),
            PickMode::BySector => Some(Picker::Sectors),
            PickMode::ByCountry => Some(Picker::Countries),
            PickMode::Default => None,
        }
    }
}

/// Disabled flags for the symbol, sector and country pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEnablement {
    pub symbols_disabled: bool,
    pub sectors_disabled: bool,
    pub countries_disabled: bool,
}

impl WidgetEnablement {
    pub const ALL_ENABLED: WidgetEnablement = WidgetEnablement::new(false, false, false);
    pub const ALL_DISABLED: WidgetEnablement = WidgetEnablement::new(true, true, true);

    pub const fn new(symbols_disabled: bool, sectors_disabled: bool, countries_disabled: bool) -> Self {
        Self {
            symbols_disabled,
            sectors_disabled,
            countries_disabled,
        }
    }

    pub fn as_tuple(&self) -> (bool, bool, bool) {
        (self.symbols_disabled, self.sectors_disabled, self.countries_disabled)
    }

}

impl Default for WidgetEnablement {
    /// Pickers render enabled until a pick mode is chosen.
    fn default() -> Self {
        Self::ALL_ENABLED
    }
}

/// Whether the "Parameters for Backtest" card is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVisibility {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelVisibility {
    pub fn is_open(self) -> bool {
        self == PanelVisibility::Expanded
    }
}

/// Values currently chosen in each picker, disabled or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub symbols: Vec<String>,
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
}

impl Selections {
    pub fn get(&self, picker: Picker) -> &[String] {
        match picker {
            Picker::Symbols => &self.symbols,
            Picker::Sectors => &self.sectors,
            Picker::Countries => &self.countries,
        }
    }

    pub fn set(&mut self, picker: Picker, values: Vec<String>) {
        match picker {
            Picker::Symbols => self.symbols = values,
            Picker::Sectors => self.sectors = values,
            Picker::Countries => self.countries = values,
        }
    }
}
