use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::currency::{round_half_up, to_decimal, PERCENT_DP};
use crate::error::CalculationError;
use crate::types::{Money, Percent, Rate};

/// Realistic-case figures the other scenarios are scaled from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBasis {
    pub roi_pct: Percent,
    pub net_profit: Money,
    pub projected_revenue: Money,
    /// Minor-unit digits of the reporting currency
    pub money_dp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub roi_pct: Percent,
    pub net_profit: Money,
    pub projected_revenue: Money,
    pub probability: Rate,
    /// ROI difference from the realistic case, in percentage points
    pub deviation_from_realistic: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub conservative: ScenarioOutcome,
    pub realistic: ScenarioOutcome,
    pub optimistic: ScenarioOutcome,
    /// Probability-weighted ROI across the three cases
    pub expected_roi_pct: Percent,
}

pub struct ScenarioGenerator<'a> {
    config: &'a ScenarioConfig,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(config: &'a ScenarioConfig) -> Self {
        ScenarioGenerator { config }
    }

    /// Scale the realistic case down and up.
    ///
    /// Factors apply to the magnitude of each figure (`x ± k·|x|`), so the
    /// ordering conservative ≤ realistic ≤ optimistic also holds for losses.
    pub fn generate(&self, basis: &ScenarioBasis) -> Result<ScenarioSet, CalculationError> {
        let down = to_decimal(1.0 - self.config.conservative_factor, 6, "scenarios.conservative")?;
        let up = to_decimal(self.config.optimistic_factor - 1.0, 6, "scenarios.optimistic")?;

        let conservative = self.outcome(basis, -down, self.config.conservative_probability)?;
        let realistic = self.outcome(basis, Decimal::ZERO, self.config.realistic_probability)?;
        let optimistic = self.outcome(basis, up, self.config.optimistic_probability)?;

        let expected = conservative.roi_pct * conservative.probability
            + realistic.roi_pct * realistic.probability
            + optimistic.roi_pct * optimistic.probability;

        Ok(ScenarioSet {
            expected_roi_pct: round_half_up(expected, PERCENT_DP),
            conservative,
            realistic,
            optimistic,
        })
    }

    fn outcome(
        &self,
        basis: &ScenarioBasis,
        shift: Decimal,
        probability: f64,
    ) -> Result<ScenarioOutcome, CalculationError> {
        let roi_pct = round_half_up(basis.roi_pct + shift * basis.roi_pct.abs(), PERCENT_DP);
        let net_profit =
            round_half_up(basis.net_profit + shift * basis.net_profit.abs(), basis.money_dp);
        // Revenue moves by the same amount as profit.
        let projected_revenue = round_half_up(
            basis.projected_revenue + (net_profit - basis.net_profit),
            basis.money_dp,
        );
        Ok(ScenarioOutcome {
            roi_pct,
            net_profit,
            projected_revenue,
            probability: to_decimal(probability, 4, "scenarios.probability")?,
            deviation_from_realistic: roi_pct - basis.roi_pct,
        })
    }
}
