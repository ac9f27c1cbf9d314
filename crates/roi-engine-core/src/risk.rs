//! Composite risk scoring.
//!
//! Four factors are normalized to 0–100 against a severity ceiling, then
//! combined with configurable weights:
//!
//! 1. **Company**: organisational risk of the size class.
//! 2. **Project**: execution risk of the project type.
//! 3. **Industry**: sector risk of the target industry, plus a market-entry
//!    premium when the company moves into a new industry.
//! 4. **Market volatility**: volatility of the target industry.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::RiskWeights;
use crate::currency::{to_decimal, PERCENT_DP};
use crate::error::CalculationError;
use crate::resolver::CalculationContext;
use crate::types::Rate;

const COMPANY_CEILING: f64 = 0.40;
const PROJECT_CEILING: f64 = 0.40;
const INDUSTRY_CEILING: f64 = 0.50;
const VOLATILITY_CEILING: f64 = 0.60;
const MARKET_ENTRY_PREMIUM: f64 = 0.05;
const TOP_FACTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 30.0 => RiskCategory::Low,
            s if s < 55.0 => RiskCategory::Medium,
            s if s < 75.0 => RiskCategory::High,
            _ => RiskCategory::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    Company,
    Project,
    Industry,
    MarketVolatility,
}

impl RiskFactorKind {
    fn label(self) -> &'static str {
        match self {
            RiskFactorKind::Company => "organisational",
            RiskFactorKind::Project => "project execution",
            RiskFactorKind::Industry => "industry",
            RiskFactorKind::MarketVolatility => "market volatility",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: RiskFactorKind,
    pub weight: Rate,
    /// Normalized factor score, 0–100
    pub score: Decimal,
    /// `weight × score`
    pub contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: Decimal,
    pub category: RiskCategory,
    /// Highest contributions first
    pub contributing_factors: Vec<RiskFactor>,
    pub mitigation: String,
}

impl RiskAssessment {
    pub fn dominant_factor(&self) -> Option<RiskFactorKind> {
        self.contributing_factors.first().map(|f| f.factor)
    }

    pub fn exceeds(&self, threshold: Decimal) -> bool {
        self.score > threshold
    }
}

pub struct RiskScorer<'a> {
    weights: &'a RiskWeights,
}

impl<'a> RiskScorer<'a> {
    pub fn new(weights: &'a RiskWeights) -> Self {
        RiskScorer { weights }
    }

    pub fn assess(&self, ctx: &CalculationContext) -> Result<RiskAssessment, CalculationError> {
        let industry_risk = if ctx.is_new_market() {
            ctx.industry.risk_factor + MARKET_ENTRY_PREMIUM
        } else {
            ctx.industry.risk_factor
        };

        let mut raw = [
            (
                RiskFactorKind::Company,
                self.weights.company,
                normalize(ctx.company.risk_factor, COMPANY_CEILING),
            ),
            (
                RiskFactorKind::Project,
                self.weights.project,
                normalize(ctx.project.risk_level, PROJECT_CEILING),
            ),
            (
                RiskFactorKind::Industry,
                self.weights.industry,
                normalize(industry_risk, INDUSTRY_CEILING),
            ),
            (
                RiskFactorKind::MarketVolatility,
                self.weights.market_volatility,
                normalize(ctx.industry.volatility, VOLATILITY_CEILING),
            ),
        ];

        let score: f64 = raw.iter().map(|(_, w, s)| w * s).sum::<f64>().clamp(0.0, 100.0);
        let category = RiskCategory::from_score(score);

        // Stable sort keeps declaration order on ties.
        raw.sort_by(|a, b| (b.1 * b.2).total_cmp(&(a.1 * a.2)));
        let contributing_factors = raw
            .iter()
            .take(TOP_FACTORS)
            .map(|(factor, weight, s)| {
                Ok(RiskFactor {
                    factor: *factor,
                    weight: to_decimal(*weight, 4, "risk.weight")?,
                    score: to_decimal(*s, PERCENT_DP, "risk.factor_score")?,
                    contribution: to_decimal(weight * s, PERCENT_DP, "risk.contribution")?,
                })
            })
            .collect::<Result<Vec<_>, CalculationError>>()?;

        let dominant = raw[0].0;
        Ok(RiskAssessment {
            score: to_decimal(score, PERCENT_DP, "risk.score")?,
            category,
            contributing_factors,
            mitigation: mitigation(category, dominant),
        })
    }
}

/// Scale `value` against `ceiling` onto 0..=100.
fn normalize(value: f64, ceiling: f64) -> f64 {
    (value / ceiling * 100.0).clamp(0.0, 100.0)
}

fn mitigation(category: RiskCategory, dominant: RiskFactorKind) -> String {
    use RiskCategory as C;
    use RiskFactorKind as F;

    let text = match (category, dominant) {
        (C::Low, _) => "Standard project governance is sufficient; review progress at each milestone.",
        (C::Medium, F::Company) => {
            "Strengthen delivery capacity with experienced leads and a phased rollout."
        }
        (C::Medium, F::Project) => {
            "Split delivery into milestones with go/no-go reviews and keep a contingency reserve."
        }
        (C::Medium, F::Industry) => "Validate demand with a pilot before committing the full budget.",
        (C::Medium, F::MarketVolatility) => {
            "Keep spending flexible and revisit revenue assumptions quarterly."
        }
        (C::High, F::Company) => {
            "Bring in external expertise and secure executive sponsorship before launch."
        }
        (C::High, F::Project) => {
            "Run a proof of concept first and hold a dedicated risk reserve of at least 20%."
        }
        (C::High, F::Industry) => {
            "Engage regulatory and domain advisors early and stage the market entry."
        }
        (C::High, F::MarketVolatility) => {
            "Tie staged funding to market signals to limit exposure to swings."
        }
        (C::Critical, f) => {
            return format!(
                "Reassess scope before committing: {} risk dominates. Consider a smaller pilot, \
                 a delivery partner or risk transfer.",
                f.label()
            )
        }
    };
    text.to_string()
}

/// Score threshold above which recommendations call for risk mitigation.
pub const HIGH_RISK_THRESHOLD: Decimal = dec!(70);
/// Score threshold above which recommendations call for a risk assessment.
pub const ELEVATED_RISK_THRESHOLD: Decimal = dec!(50);
