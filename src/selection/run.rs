use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Picker, PickMode, Selections, StrategyName, UniverseOptions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("choose how to pick tickers before running a backtest")]
    NoActivePicker,

    #[error("the {picker} picker has no selection")]
    EmptySelection { picker: Picker },

    #[error("choose a strategy before running a backtest")]
    NoStrategy,

    #[error("'{value}' is not a valid {picker} option")]
    UnknownOption { picker: Picker, value: String },
}

/// The part of the universe a backtest should run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum UniverseSelection {
    Symbols(Vec<String>),
    Sectors(Vec<String>),
    Countries(Vec<String>),
    Default,
}

impl UniverseSelection {
    fn from_picker(picker: Picker, values: Vec<String>) -> Self {
        match picker {
            Picker::Symbols => UniverseSelection::Symbols(values),
            Picker::Sectors => UniverseSelection::Sectors(values),
            Picker::Countries => UniverseSelection::Countries(values),
        }
    }
}

/// Inputs handed to a backtest engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub universe: UniverseSelection,
    pub strategy: StrategyName,
    pub requested_at: DateTime<Utc>,
}

/// Assemble a run from the session's form state.
///
/// Only the picker enabled by `mode` is read; selections left in disabled
/// pickers are never submitted.
pub fn build_request(
    mode: Option<PickMode>,
    selections: &Selections,
    strategy: Option<StrategyName>,
    options: &UniverseOptions,
) -> Result<BacktestRequest, RunError> {
    let mode = mode.ok_or(RunError::NoActivePicker)?;
    let strategy = strategy.ok_or(RunError::NoStrategy)?;

    let universe = match mode.active_picker() {
        None => UniverseSelection::Default,
        Some(picker) => {
            let values = selections.get(picker);
            if values.is_empty() {
                return Err(RunError::EmptySelection { picker });
            }

            let allowed = options.picker_options(picker);
            if let Some(unknown) = values.iter().find(|v| !allowed.contains(*v)) {
                return Err(RunError::UnknownOption {
                    picker,
                    value: unknown.clone(),
                });
            }

            UniverseSelection::from_picker(picker, values.to_vec())
        }
    };

    Ok(BacktestRequest {
        universe,
        strategy,
        requested_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UniverseRow;

    fn options() -> UniverseOptions {
        UniverseOptions::from_rows(&[
            UniverseRow::new("XOM", "US", Some("Energy")),
            UniverseRow::new("MSFT", "US", Some("Tech")),
            UniverseRow::new("SAP", "DE", Some("Tech")),
        ])
    }

    fn selections() -> Selections {
        Selections {
            symbols: vec!["XOM".to_string()],
            sectors: vec!["Tech".to_string(), "Energy".to_string()],
            countries: vec!["DE".to_string()],
        }
    }

    #[test]
    fn test_only_active_picker_is_submitted() {
        let request = build_request(
            Some(PickMode::BySector),
            &selections(),
            Some(StrategyName::MomentumBasedStrategy),
            &options(),
        )
        .unwrap();

        assert_eq!(
            request.universe,
            UniverseSelection::Sectors(vec!["Tech".to_string(), "Energy".to_string()])
        );
        assert_eq!(request.strategy, StrategyName::MomentumBasedStrategy);
    }

    #[test]
    fn test_default_mode_ignores_selections() {
        let request = build_request(
            Some(PickMode::Default),
            &Selections::default(),
            Some(StrategyName::MinimumVarianceStrategy),
            &options(),
        )
        .unwrap();
        assert_eq!(request.universe, UniverseSelection::Default);
    }

    #[test]
    fn test_validation_errors() {
        let opts = options();
        let strategy = Some(StrategyName::DrawdownControlStrategy);

        assert_eq!(
            build_request(None, &selections(), strategy, &opts),
            Err(RunError::NoActivePicker)
        );
        assert_eq!(
            build_request(Some(PickMode::BySymbol), &selections(), None, &opts),
            Err(RunError::NoStrategy)
        );
        assert_eq!(
            build_request(Some(PickMode::ByCountry), &Selections::default(), strategy, &opts),
            Err(RunError::EmptySelection { picker: Picker::Countries })
        );

        let mut bad = selections();
        bad.symbols.push("ZZZ".to_string());
        assert_eq!(
            build_request(Some(PickMode::BySymbol), &bad, strategy, &opts),
            Err(RunError::UnknownOption {
                picker: Picker::Symbols,
                value: "ZZZ".to_string()
            })
        );
    }

    #[test]
    fn test_selection_wire_format() {
        let json = serde_json::to_value(UniverseSelection::Countries(vec!["US".to_string()])).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "countries", "values": ["US"]}));
        let json = serde_json::to_value(UniverseSelection::Default).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "default"}));
    }
}
