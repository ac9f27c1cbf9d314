//! Market insights for the target industry and plain-language recommendations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    CompanySize, ComplexityTier, Industry, MarketSize, RegulatoryTier,
};
use crate::currency::{to_decimal, PERCENT_DP};
use crate::dcf::Payback;
use crate::error::CalculationError;
use crate::resolver::CalculationContext;
use crate::risk::{RiskAssessment, ELEVATED_RISK_THRESHOLD, HIGH_RISK_THRESHOLD};
use crate::types::{Percent, Rate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attractiveness {
    VeryHigh,
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInsights {
    pub industry: Industry,
    pub market_size: MarketSize,
    pub growth_rate: Rate,
    pub volatility: Rate,
    pub regulatory: RegulatoryTier,
    pub risk_description: String,
    /// `growth·50 − risk·30 − volatility·20`
    pub attractiveness_score: Decimal,
    pub attractiveness: Attractiveness,
}

pub fn market_insights(ctx: &CalculationContext) -> Result<MarketInsights, CalculationError> {
    let p = &ctx.industry;
    let score = p.growth_rate * 50.0 - p.risk_factor * 30.0 - p.volatility * 20.0;
    let attractiveness = match score {
        s if s >= 15.0 => Attractiveness::VeryHigh,
        s if s >= 10.0 => Attractiveness::High,
        s if s >= 5.0 => Attractiveness::Moderate,
        _ => Attractiveness::Low,
    };
    let risk_description = match p.risk_factor {
        r if r < 0.10 => "Low risk, stable market conditions",
        r if r < 0.20 => "Moderate risk, some market uncertainty",
        r if r < 0.30 => "High risk, volatile market conditions",
        _ => "Very high risk, highly speculative market",
    };

    Ok(MarketInsights {
        industry: ctx.target_industry,
        market_size: p.market_size,
        growth_rate: to_decimal(p.growth_rate, 4, "insights.growth_rate")?,
        volatility: to_decimal(p.volatility, 4, "insights.volatility")?,
        regulatory: p.regulatory,
        risk_description: risk_description.to_string(),
        attractiveness_score: to_decimal(score, PERCENT_DP, "insights.attractiveness_score")?,
        attractiveness,
    })
}

/// Recommendations drawn from risk, return, payback and profile traits.
pub fn recommendations(
    ctx: &CalculationContext,
    roi_pct: Percent,
    payback: Payback,
    risk: &RiskAssessment,
) -> Vec<String> {
    let mut out = Vec::new();

    if risk.exceeds(HIGH_RISK_THRESHOLD) {
        out.push(
            "High risk profile: build a detailed risk mitigation plan and consider a phased rollout."
                .to_string(),
        );
    } else if risk.exceeds(ELEVATED_RISK_THRESHOLD) {
        out.push(
            "Moderate risk: run a thorough risk assessment and keep contingency plans ready."
                .to_string(),
        );
    }

    if roi_pct > dec!(200) {
        out.push(
            "Exceptional projected return: prioritise execution quality and speed to market."
                .to_string(),
        );
    } else if roi_pct > dec!(100) {
        out.push("Strong projected return: the project is well positioned for success.".to_string());
    } else if roi_pct < dec!(50) {
        out.push(
            "Modest projected return: revisit scope or pursue efficiency gains before committing."
                .to_string(),
        );
    }

    match payback {
        Payback::Month { month } if month > 24 => out.push(
            "Long payback period: secure funding for the full horizon and track milestones closely."
                .to_string(),
        ),
        Payback::Month { month } if month < 12 => out.push(
            "Quick payback: the investment recovers its cost within the first year.".to_string(),
        ),
        Payback::BeyondHorizon => out.push(
            "The investment is not recovered within the projection horizon: extend the horizon \
             or reduce cost before committing."
                .to_string(),
        ),
        _ => {}
    }

    if ctx.industry.regulatory == RegulatoryTier::VeryHigh {
        out.push(
            "Very high regulatory complexity: involve compliance experts and budget for approvals."
                .to_string(),
        );
    }
    if ctx.industry.volatility > 0.30 {
        out.push(
            "Volatile market: keep the plan flexible and monitor market signals closely."
                .to_string(),
        );
    }
    if ctx.project.complexity == ComplexityTier::VeryHigh {
        out.push(
            "Very high delivery complexity: staff senior engineers and validate architecture early."
                .to_string(),
        );
    }
    if ctx.is_new_market() {
        out.push(format!(
            "Entering {} from {}: validate demand with a pilot before scaling.",
            ctx.target_industry, ctx.current_industry
        ));
    }

    match ctx.company_size {
        CompanySize::Startup => out.push(
            "Startup: focus on an MVP and iterate on customer feedback.".to_string(),
        ),
        CompanySize::Enterprise => out.push(
            "Enterprise: use existing resources and partnerships to accelerate delivery."
                .to_string(),
        ),
        CompanySize::Small | CompanySize::Medium => {}
    }

    out
}
