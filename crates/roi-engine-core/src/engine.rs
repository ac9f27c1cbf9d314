//! The `compute` pipeline.
//!
//! Resolver → cost model → projector → DCF → risk → Monte Carlo → scenarios
//! → plan → formatter. Each call builds its own context and result; the engine only
//! holds the read-only catalog and configuration.

use std::time::Instant;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info_span, warn};

use crate::cashflow::{CashFlowProjector, ProjectionInputs};
use crate::catalog::ProfileCatalog;
use crate::config::EngineConfig;
use crate::cost_model::CostModel;
use crate::currency::{to_decimal, CurrencyFormatter, PERCENT_DP, RATE_DP};
use crate::dcf;
use crate::error::{CalculationError, ValidationError};
use crate::insights::{market_insights, recommendations};
use crate::monte_carlo::{MonteCarloSimulator, TrialModel};
use crate::planning::{execution_plan, PlanInputs};
use crate::resolver::{CalculationContext, CalculationRequest, ParameterResolver};
use crate::result::{
    monthly_cash_flows, CalculationResult, CostBreakdown, IrrOutcome, SimulationReport,
};
use crate::risk::RiskScorer;
use crate::scenarios::{ScenarioBasis, ScenarioGenerator};
use crate::sensitivity::SensitivityAnalyzer;
use crate::types::{with_metadata, ComputationOutput, Interval};
use crate::EngineResult;

const METHODOLOGY: &str =
    "S-curve cash flow projection with risk-adjusted DCF, Newton IRR and Monte Carlo variance";

/// ROI engine bound to one catalog and one configuration.
#[derive(Debug, Clone)]
pub struct RoiEngine {
    catalog: ProfileCatalog,
    config: EngineConfig,
}

impl Default for RoiEngine {
    fn default() -> Self {
        RoiEngine {
            catalog: ProfileCatalog::default(),
            config: EngineConfig::default(),
        }
    }
}

impl RoiEngine {
    pub fn new(catalog: ProfileCatalog, config: EngineConfig) -> Result<Self, CalculationError> {
        config.validate()?;
        Ok(RoiEngine { catalog, config })
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a request without running any calculation.
    pub fn validate(&self, request: &CalculationRequest) -> Result<CalculationContext, ValidationError> {
        ParameterResolver::new(&self.catalog).resolve(request)
    }

    /// Compute with the configured seed, or a fresh one from OS entropy.
    pub fn compute(&self, request: &CalculationRequest) -> EngineResult<CalculationResult> {
        let seed = self.config.simulation.seed.unwrap_or_else(rand::random);
        self.compute_seeded(request, seed)
    }

    /// Compute with the master seed drawn from a caller-supplied generator.
    pub fn compute_with_rng<R: RngCore + ?Sized>(
        &self,
        request: &CalculationRequest,
        rng: &mut R,
    ) -> EngineResult<CalculationResult> {
        self.compute_seeded(request, rng.next_u64())
    }

    pub fn compute_seeded(
        &self,
        request: &CalculationRequest,
        seed: u64,
    ) -> EngineResult<CalculationResult> {
        let span = info_span!("compute", seed, project_type = %request.project_type);
        let _guard = span.enter();

        let ctx = self.validate(request)?;
        Ok(self.calculate(&ctx, seed)?)
    }

    /// [`compute`](Self::compute) wrapped in the standard output envelope.
    pub fn compute_with_metadata(
        &self,
        request: &CalculationRequest,
    ) -> EngineResult<ComputationOutput<CalculationResult>> {
        let start = Instant::now();
        let result = self.compute(request)?;
        let elapsed = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

        Ok(with_metadata(
            METHODOLOGY,
            &self.config,
            result.warnings.clone(),
            elapsed,
            result,
        )?)
    }

    fn calculate(
        &self,
        ctx: &CalculationContext,
        seed: u64,
    ) -> Result<CalculationResult, CalculationError> {
        let config = &self.config;
        let mut warnings = ctx.warnings.clone();

        let cost = CostModel::new(config.simulation.confidence_level)?.estimate(ctx);
        let projector = CashFlowProjector::new(&config.projection);
        let base = ProjectionInputs::from_context(ctx, cost.total_cost);
        let series = projector.project(&base);
        let flows = series.flows();

        let annual_rate = dcf::discount_rate(&config.discount, ctx);
        let monthly_rate = dcf::monthly_rate(annual_rate);
        let npv = dcf::npv(monthly_rate, &flows)?;
        let payback = dcf::payback_period(&flows);

        let irr = match dcf::irr(&flows, monthly_rate) {
            Ok(solution) => IrrOutcome::Defined {
                annual_rate: to_decimal(dcf::annualize(solution.rate), RATE_DP, "irr.annual_rate")?,
                monthly_rate: to_decimal(solution.rate, RATE_DP, "irr.monthly_rate")?,
                iterations: solution.iterations,
            },
            Err(e) => {
                warn!(error = %e, "IRR undefined");
                warnings.push(format!("IRR could not be determined: {e}"));
                IrrOutcome::Undefined {
                    reason: e.to_string(),
                }
            }
        };

        let risk = RiskScorer::new(&config.risk_weights).assess(ctx)?;
        let risk_score = risk.score.to_f64().ok_or_else(|| CalculationError::NonFinite {
            field: "risk.score".into(),
        })?;

        let model = TrialModel {
            cost: &cost,
            projector: &projector,
            base,
            monthly_discount_rate: monthly_rate,
            revenue_std_dev: TrialModel::revenue_spread(
                ctx.project.risk_level,
                ctx.project.roi_potential,
                ctx.industry.volatility,
            ),
            base_risk_score: risk_score,
            mode: config.simulation.mode,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let summary = MonteCarloSimulator::new(&config.simulation).run(&model, &mut rng)?;

        let sensitivity = SensitivityAnalyzer::new(&projector).analyze(&base)?;

        let fmt = self.formatter(ctx)?;
        let level = to_decimal(config.simulation.confidence_level, 4, "confidence_level")?;

        let roi_pct = to_decimal(series.roi_pct(ctx.investment), PERCENT_DP, "roi_pct")?;
        let net_profit = fmt.money(series.net_profit(), "net_profit")?;
        let projected_revenue = fmt.money(series.total_revenue(), "projected_revenue")?;

        let scenarios = ScenarioGenerator::new(&config.scenarios).generate(&ScenarioBasis {
            roi_pct,
            net_profit,
            projected_revenue,
            money_dp: fmt.currency().precision(),
        })?;

        let roi_confidence_interval = Interval {
            lower: to_decimal(summary.roi_pct.lower, PERCENT_DP, "roi_confidence_interval")?,
            upper: to_decimal(summary.roi_pct.upper, PERCENT_DP, "roi_confidence_interval")?,
            level,
        };

        let recommendations = recommendations(ctx, roi_pct, payback, &risk);
        let plan = execution_plan(
            &PlanInputs {
                series: &series,
                investment: ctx.investment,
                operating_cost_ratio: ctx.project.operating_cost_ratio,
                growth_rate: ctx.industry.growth_rate,
                roi_pct: series.roi_pct(ctx.investment),
                risk_score,
                payback,
            },
            &fmt,
        )?;

        debug!(
            roi_pct = %roi_pct,
            npv,
            payback = ?payback,
            risk = %risk.score,
            "calculation complete"
        );

        Ok(CalculationResult {
            company_name: ctx.company_name.clone(),
            company_size: ctx.company_size,
            project_type: ctx.project_type,
            target_industry: ctx.target_industry,
            currency: fmt.currency(),
            conversion_rate: fmt.conversion_rate(),
            investment: fmt.money(ctx.investment, "investment")?,
            timeline_months: ctx.timeline_months,
            cost: CostBreakdown::from_estimate(&cost, level, &fmt)?,
            projected_revenue,
            operating_costs: fmt.money(series.total_operating_cost(), "operating_costs")?,
            taxes: fmt.money(series.total_tax(), "taxes")?,
            net_profit,
            roi_pct,
            npv: fmt.money(npv, "npv")?,
            discount_rate: to_decimal(annual_rate, RATE_DP, "discount_rate")?,
            irr,
            payback,
            initial_outlay: fmt.money(series.initial_outlay, "initial_outlay")?,
            cash_flows: monthly_cash_flows(&series, ctx.start_date, &fmt)?,
            simulation: SimulationReport::from_summary(
                &summary,
                seed,
                config.simulation.mode,
                &fmt,
            )?,
            roi_confidence_interval,
            scenarios,
            risk,
            sensitivity,
            insights: market_insights(ctx)?,
            plan,
            recommendations,
            warnings,
        })
    }

    fn formatter(&self, ctx: &CalculationContext) -> Result<CurrencyFormatter, CalculationError> {
        if ctx.report_currency == ctx.currency {
            return Ok(CurrencyFormatter::new(ctx.currency));
        }
        let rates = ctx
            .exchange_rates
            .as_ref()
            .ok_or_else(|| CalculationError::MissingRate {
                currency: ctx.report_currency.to_string(),
            })?;
        CurrencyFormatter::converting(ctx.currency, ctx.report_currency, rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::error::EngineError;
    use crate::types::Currency;
    use rust_decimal_macros::dec;

    fn engine() -> RoiEngine {
        let config = EngineConfig {
            simulation: SimulationConfig {
                trials: 200,
                seed: Some(7),
                ..Default::default()
            },
            ..Default::default()
        };
        RoiEngine::new(ProfileCatalog::default(), config).unwrap()
    }

    fn request() -> CalculationRequest {
        CalculationRequest {
            company_name: "Acme Labs".into(),
            company_size: "medium".into(),
            project_type: "product_development".into(),
            target_industry: "fintech".into(),
            investment: Some(dec!(100000)),
            ..Default::default()
        }
    }

    #[test]
    fn test_configured_seed_is_recorded() {
        let result = engine().compute(&request()).unwrap();
        assert_eq!(result.simulation.seed, 7);
        assert_eq!(result.simulation.trials, 200);
    }

    #[test]
    fn test_validation_error_short_circuits() {
        let mut req = request();
        req.timeline_months = Some(0);
        match engine().compute(&req) {
            Err(EngineError::Validation(e)) => assert!(e.has_field("timeline_months")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.simulation.trials = 5;
        assert!(RoiEngine::new(ProfileCatalog::default(), config).is_err());

        let mut config = EngineConfig::default();
        config.discount.base_rate = f64::NAN;
        assert!(RoiEngine::new(ProfileCatalog::default(), config).is_err());
    }

    #[test]
    fn test_payback_is_never_the_outlay_month() {
        let mut config = EngineConfig::default();
        config.projection.upfront_cost_share = 0.0;
        assert!(RoiEngine::new(ProfileCatalog::default(), config.clone()).is_err());

        config.projection.upfront_cost_share = 0.01;
        config.simulation.trials = 100;
        config.simulation.seed = Some(3);
        let engine = RoiEngine::new(ProfileCatalog::default(), config).unwrap();
        let result = engine.compute(&request()).unwrap();
        assert_ne!(result.payback, dcf::Payback::Month { month: 0 });
        assert!(result.cash_flows[0].cumulative < rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn test_report_currency_conversion() {
        let mut req = request();
        req.report_currency = Some("EUR".into());
        req.exchange_rates = Some(crate::currency::RateTable {
            base: Currency::USD,
            rates: [(Currency::EUR, dec!(0.9))].into_iter().collect(),
        });
        let usd = engine().compute(&request()).unwrap();
        let eur = engine().compute(&req).unwrap();
        assert_eq!(eur.currency, Currency::EUR);
        assert_eq!(eur.conversion_rate, dec!(0.9));
        assert_eq!(eur.investment, dec!(90000.00));
        assert_eq!(eur.roi_pct, usd.roi_pct);
    }

    #[test]
    fn test_stress_mode_is_reported_and_adverse() {
        let mut config = engine().config().clone();
        config.simulation.mode = crate::config::SimulationMode::StressTest;
        let stressed = RoiEngine::new(ProfileCatalog::default(), config)
            .unwrap()
            .compute(&request())
            .unwrap();
        let standard = engine().compute(&request()).unwrap();

        assert_eq!(stressed.simulation.mode, crate::config::SimulationMode::StressTest);
        assert!(stressed.simulation.roi_pct.mean < standard.simulation.roi_pct.mean);
        assert!(stressed.simulation.cost.mean > standard.simulation.cost.mean);
        // Central estimate is unaffected by the simulation mode
        assert_eq!(stressed.roi_pct, standard.roi_pct);

        let bands = &stressed.simulation.risk_distribution;
        let total = bands.low + bands.medium + bands.high + bands.critical;
        assert!((total - dec!(100)).abs() <= dec!(0.05));
    }

    #[test]
    fn test_plan_matches_projection() {
        let result = engine().compute(&request()).unwrap();
        let plan = &result.plan;
        assert_eq!(plan.milestones.len(), 4);
        assert_eq!(plan.milestones[3].month, result.timeline_months);
        assert_eq!(plan.kpis.break_even_month, result.payback.month());
        assert!(
            (plan.milestones[3].cumulative_revenue - result.projected_revenue).abs()
                <= dec!(0.05)
        );
        assert!(plan.success_probability >= dec!(10) && plan.success_probability <= dec!(85));
    }

    #[test]
    fn test_metadata_envelope() {
        let output = engine().compute_with_metadata(&request()).unwrap();
        assert_eq!(output.methodology, METHODOLOGY);
        assert_eq!(output.warnings, output.result.warnings);
        assert_eq!(output.assumptions["simulation"]["trials"], 200);
        assert!(output.metadata.computation_time_us < u64::MAX);
    }
}
