//! Expected project cost and its overrun band.
//!
//! The planned cost is the investment envelope. Execution overrun is bounded
//! by an `overrun_fraction` that grows with delivery complexity and with the
//! size of the budget: small projects run with tight variance, very large
//! programmes carry more. The expected overrun is half the bound, giving
//!
//! ```text
//! total_cost = planned × (1 + overrun_fraction / 2)
//! interval   = [planned, planned × (1 + overrun_fraction)]
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::catalog::{CompanyProfile, ComplexityTier, IndustryProfile, ProjectTypeProfile};
use crate::error::CalculationError;
use crate::resolver::CalculationContext;

/// Upper overrun bound by complexity tier, before the size-bracket scale.
pub fn complexity_overrun(tier: ComplexityTier) -> f64 {
    match tier {
        ComplexityTier::Low => 0.10,
        ComplexityTier::Medium => 0.15,
        ComplexityTier::High => 0.22,
        ComplexityTier::VeryHigh => 0.30,
    }
}

/// Overrun scale by investment bracket (catalog currency).
pub fn bracket_scale(investment: f64) -> f64 {
    match investment {
        x if x < 10_000.0 => 0.6,
        x if x < 100_000.0 => 0.8,
        x if x < 1_000_000.0 => 1.0,
        x if x < 10_000_000.0 => 1.15,
        _ => 1.3,
    }
}

pub fn industry_adjustment(industry: &IndustryProfile) -> f64 {
    1.0 + industry.regulatory.cost_overhead()
}

/// Catalog-currency cost estimate: base × company multiplier × industry adjustment.
pub fn estimated_cost(
    project: &ProjectTypeProfile,
    company: &CompanyProfile,
    industry: &IndustryProfile,
) -> f64 {
    project.base_cost * company.cost_multiplier * industry_adjustment(industry)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedMultiplier {
    pub name: String,
    pub factor: f64,
}

/// Central cost estimate in the request currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    /// Catalog figures; unknown without a catalog exchange rate
    pub base_cost: Option<f64>,
    pub multipliers: Vec<AppliedMultiplier>,
    pub estimated_cost: Option<f64>,
    pub planned_cost: f64,
    pub overrun_fraction: f64,
    pub contingency: f64,
    pub total_cost: f64,
    pub lower: f64,
    pub upper: f64,
    /// Standard deviation of the cost factor implied by the interval
    pub cost_factor_std_dev: f64,
}

impl CostEstimate {
    /// Total cost for a sampled cost factor.
    pub fn total_for(&self, cost_factor: f64) -> f64 {
        self.planned_cost * cost_factor
    }

    pub fn central_factor(&self) -> f64 {
        1.0 + self.overrun_fraction / 2.0
    }
}

pub struct CostModel {
    z: f64,
}

impl CostModel {
    pub fn new(confidence_level: f64) -> Result<Self, CalculationError> {
        Ok(CostModel {
            z: z_score(confidence_level)?,
        })
    }

    pub fn estimate(&self, ctx: &CalculationContext) -> CostEstimate {
        let company_multiplier = ctx.company.cost_multiplier;
        let industry_multiplier = industry_adjustment(&ctx.industry);
        let base_cost = ctx.catalog_rate.map(|rate| ctx.project.base_cost * rate);
        let estimated = base_cost.map(|base| base * company_multiplier * industry_multiplier);

        let planned = ctx.investment;
        let overrun_fraction = complexity_overrun(ctx.project.complexity)
            * bracket_scale(ctx.investment_in_catalog_currency());
        let half = overrun_fraction / 2.0;

        CostEstimate {
            base_cost,
            multipliers: vec![
                AppliedMultiplier {
                    name: format!("company_size:{}", ctx.company_size),
                    factor: company_multiplier,
                },
                AppliedMultiplier {
                    name: format!("industry_regulation:{}", ctx.industry.regulatory),
                    factor: industry_multiplier,
                },
            ],
            estimated_cost: estimated,
            planned_cost: planned,
            overrun_fraction,
            contingency: planned * half,
            total_cost: planned * (1.0 + half),
            lower: planned,
            upper: planned * (1.0 + overrun_fraction),
            cost_factor_std_dev: half / self.z,
        }
    }
}

/// Two-sided standard normal quantile for a confidence level.
pub fn z_score(confidence_level: f64) -> Result<f64, CalculationError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(CalculationError::InvalidConfig {
            field: "confidence_level".into(),
            reason: format!("must be within (0, 1), got {confidence_level}"),
        });
    }
    let standard = Normal::new(0.0, 1.0).map_err(|e| CalculationError::InvalidConfig {
        field: "confidence_level".into(),
        reason: e.to_string(),
    })?;
    Ok(standard.inverse_cdf(0.5 + confidence_level / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProfileCatalog;
    use crate::resolver::{CalculationRequest, ParameterResolver};
    use rust_decimal::Decimal;

    fn context(size: &str, project: &str, industry: &str, investment: i64) -> CalculationContext {
        let catalog = ProfileCatalog::default();
        ParameterResolver::new(&catalog)
            .resolve(&CalculationRequest {
                company_size: size.into(),
                project_type: project.into(),
                target_industry: industry.into(),
                investment: Some(Decimal::from(investment)),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_z_score_95() {
        assert!((z_score(0.95).unwrap() - 1.959964).abs() < 1e-5);
        assert!(z_score(1.0).is_err());
    }

    #[test]
    fn test_small_low_complexity_overrun_is_tight() {
        let ctx = context("startup", "marketing_campaign", "ecommerce", 1_000);
        let est = CostModel::new(0.95).unwrap().estimate(&ctx);
        assert!(est.overrun_fraction <= 0.15, "overrun {}", est.overrun_fraction);
        assert!((est.overrun_fraction - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_overrun_grows_with_bracket_and_complexity() {
        let model = CostModel::new(0.95).unwrap();
        let small = model.estimate(&context("enterprise", "blockchain_platform", "crypto", 50_000));
        let large =
            model.estimate(&context("enterprise", "blockchain_platform", "crypto", 20_000_000));
        assert!(small.overrun_fraction < large.overrun_fraction);

        let low = model.estimate(&context("small", "marketing_campaign", "saas", 200_000));
        let high = model.estimate(&context("small", "ai_integration", "saas", 200_000));
        assert!(low.overrun_fraction < high.overrun_fraction);
    }

    #[test]
    fn test_total_cost_inside_interval() {
        let est = CostModel::new(0.95)
            .unwrap()
            .estimate(&context("medium", "product_development", "fintech", 100_000));
        assert!(est.total_cost > 0.0);
        assert!(est.lower <= est.total_cost && est.total_cost <= est.upper);
        // High complexity, 100k bracket: 0.22 bound, 11% expected
        assert!((est.total_cost - 111_000.0).abs() < 1e-6);
        assert_eq!(est.multipliers.len(), 2);
        assert!((est.estimated_cost.unwrap() - 243_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_estimate_without_catalog_rate() {
        let catalog = ProfileCatalog::default();
        let ctx = ParameterResolver::new(&catalog)
            .resolve(&CalculationRequest {
                company_size: "medium".into(),
                project_type: "product_development".into(),
                target_industry: "fintech".into(),
                currency: "EUR".into(),
                investment: Some(Decimal::from(100_000)),
                ..Default::default()
            })
            .unwrap();
        let est = CostModel::new(0.95).unwrap().estimate(&ctx);
        assert_eq!(est.base_cost, None);
        assert_eq!(est.estimated_cost, None);
        // Face-value bracket: same band as 100k USD
        assert!((est.overrun_fraction - 0.22).abs() < 1e-12);
        assert!((est.total_cost - 111_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_cost_std_dev_matches_interval() {
        let est = CostModel::new(0.95)
            .unwrap()
            .estimate(&context("small", "mobile_app", "gaming", 300_000));
        let half_width = (est.upper - est.lower) / 2.0 / est.planned_cost;
        assert!((est.cost_factor_std_dev * 1.959964 - half_width).abs() < 1e-5);
    }
}
