use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Backtesting strategies offered in the strategy dropdown.
///
/// Only the names are known here; the algorithms live in the backtest engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyName {
    DrawdownControlStrategy,
    MomentumBasedStrategy,
    MinimumVarianceStrategy,
    MaximumDiversificationStrategy,
    EqualRiskContributionStrategy,
}

impl StrategyName {
    pub const ALL: [StrategyName; 5] = [
        StrategyName::DrawdownControlStrategy,
        StrategyName::MomentumBasedStrategy,
        StrategyName::MinimumVarianceStrategy,
        StrategyName::MaximumDiversificationStrategy,
        StrategyName::EqualRiskContributionStrategy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DrawdownControlStrategy => "DrawdownControlStrategy",
            Self::MomentumBasedStrategy => "MomentumBasedStrategy",
            Self::MinimumVarianceStrategy => "MinimumVarianceStrategy",
            Self::MaximumDiversificationStrategy => "MaximumDiversificationStrategy",
            Self::EqualRiskContributionStrategy => "EqualRiskContributionStrategy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DrawdownControlStrategy =>
                "Scales exposure down as the portfolio drawdown deepens.",
            Self::MomentumBasedStrategy =>
                "Overweights assets with the strongest trailing returns.",
            Self::MinimumVarianceStrategy =>
                "Weights chosen to minimise total portfolio variance.",
            Self::MaximumDiversificationStrategy =>
                "Maximises the ratio of weighted asset volatility to portfolio volatility.",
            Self::EqualRiskContributionStrategy =>
                "Every asset contributes the same share of portfolio risk.",
        }
    }
}

impl std::fmt::Display for StrategyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StrategyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|strategy| strategy.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown strategy: {}", s))
    }
}
