//! Caller-facing result types.
//!
//! Everything here is denominated in `Decimal` and already rounded for the
//! report currency. Nothing refers back to the request.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CompanySize, Industry, ProjectType};
use crate::cashflow::{period_end, CashFlowSeries};
use crate::config::SimulationMode;
use crate::cost_model::CostEstimate;
use crate::currency::{to_decimal, CurrencyFormatter, PERCENT_DP};
use crate::dcf::Payback;
use crate::error::CalculationError;
use crate::insights::MarketInsights;
use crate::monte_carlo::{DistributionStats, RiskDistribution, SimulationSummary};
use crate::planning::ExecutionPlan;
use crate::risk::RiskAssessment;
use crate::scenarios::ScenarioSet;
use crate::sensitivity::SensitivityReport;
use crate::types::{Currency, Interval, Money, Percent, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMultiplier {
    pub name: String,
    pub factor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Catalog base cost of the project type; absent without a catalog exchange rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<Money>,
    pub multipliers: Vec<CostMultiplier>,
    /// Base cost after multipliers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Money>,
    /// Investment envelope the overrun applies to
    pub planned_cost: Money,
    pub overrun_fraction: Rate,
    /// Expected overrun on top of the planned cost
    pub contingency: Money,
    pub total_cost: Money,
    pub confidence_interval: Interval<Money>,
}

impl CostBreakdown {
    pub(crate) fn from_estimate(
        estimate: &CostEstimate,
        level: Rate,
        fmt: &CurrencyFormatter,
    ) -> Result<Self, CalculationError> {
        let multipliers = estimate
            .multipliers
            .iter()
            .map(|m| {
                Ok(CostMultiplier {
                    name: m.name.clone(),
                    factor: to_decimal(m.factor, 4, "cost.multiplier")?,
                })
            })
            .collect::<Result<Vec<_>, CalculationError>>()?;

        Ok(CostBreakdown {
            base_cost: estimate
                .base_cost
                .map(|v| fmt.money(v, "cost.base_cost"))
                .transpose()?,
            multipliers,
            estimated_cost: estimate
                .estimated_cost
                .map(|v| fmt.money(v, "cost.estimated_cost"))
                .transpose()?,
            planned_cost: fmt.money(estimate.planned_cost, "cost.planned_cost")?,
            overrun_fraction: to_decimal(estimate.overrun_fraction, 4, "cost.overrun_fraction")?,
            contingency: fmt.money(estimate.contingency, "cost.contingency")?,
            total_cost: fmt.money(estimate.total_cost, "cost.total_cost")?,
            confidence_interval: Interval {
                lower: fmt.money(estimate.lower, "cost.lower")?,
                upper: fmt.money(estimate.upper, "cost.upper")?,
                level,
            },
        })
    }
}

/// One projected month in the report currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub revenue: Money,
    pub operating_cost: Money,
    pub build_cost: Money,
    pub tax: Money,
    pub net: Money,
    pub cumulative: Money,
}

pub(crate) fn monthly_cash_flows(
    series: &CashFlowSeries,
    start: Option<NaiveDate>,
    fmt: &CurrencyFormatter,
) -> Result<Vec<MonthlyCashFlow>, CalculationError> {
    series
        .periods
        .iter()
        .map(|p| {
            Ok(MonthlyCashFlow {
                month: p.month,
                period_end: start.and_then(|d| period_end(d, p.month)),
                revenue: fmt.money(p.revenue, "cash_flows.revenue")?,
                operating_cost: fmt.money(p.operating_cost, "cash_flows.operating_cost")?,
                build_cost: fmt.money(p.build_cost, "cash_flows.build_cost")?,
                tax: fmt.money(p.tax, "cash_flows.tax")?,
                net: fmt.money(p.net, "cash_flows.net")?,
                cumulative: fmt.money(p.cumulative, "cash_flows.cumulative")?,
            })
        })
        .collect()
}

/// Internal rate of return, or the reason it could not be found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IrrOutcome {
    Defined {
        annual_rate: Rate,
        monthly_rate: Rate,
        iterations: u32,
    },
    Undefined {
        reason: String,
    },
}

impl IrrOutcome {
    pub fn annual_rate(&self) -> Option<Rate> {
        match self {
            IrrOutcome::Defined { annual_rate, .. } => Some(*annual_rate),
            IrrOutcome::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, IrrOutcome::Defined { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub mean: Decimal,
    pub std_dev: Decimal,
    pub median: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub interval: Interval<Decimal>,
}

impl Distribution {
    fn money(
        stats: &DistributionStats,
        level: Rate,
        fmt: &CurrencyFormatter,
        field: &str,
    ) -> Result<Self, CalculationError> {
        Self::convert(stats, level, field, |v, f| fmt.money(v, f))
    }

    fn percent(stats: &DistributionStats, level: Rate, field: &str) -> Result<Self, CalculationError> {
        Self::convert(stats, level, field, |v, f| to_decimal(v, PERCENT_DP, f))
    }

    fn convert(
        stats: &DistributionStats,
        level: Rate,
        field: &str,
        f: impl Fn(f64, &str) -> Result<Decimal, CalculationError>,
    ) -> Result<Self, CalculationError> {
        Ok(Distribution {
            mean: f(stats.mean, field)?,
            std_dev: f(stats.std_dev, field)?,
            median: f(stats.median, field)?,
            min: f(stats.min, field)?,
            max: f(stats.max, field)?,
            interval: Interval {
                lower: f(stats.lower, field)?,
                upper: f(stats.upper, field)?,
                level,
            },
        })
    }
}

/// Percentage of trials per risk category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    pub low: Percent,
    pub medium: Percent,
    pub high: Percent,
    pub critical: Percent,
}

impl RiskBands {
    fn from_distribution(d: &RiskDistribution) -> Result<Self, CalculationError> {
        let pct = |v: f64, field: &str| to_decimal(v * 100.0, PERCENT_DP, field);
        Ok(RiskBands {
            low: pct(d.low, "simulation.risk_distribution.low")?,
            medium: pct(d.medium, "simulation.risk_distribution.medium")?,
            high: pct(d.high, "simulation.risk_distribution.high")?,
            critical: pct(d.critical, "simulation.risk_distribution.critical")?,
        })
    }
}

/// Monte Carlo distribution summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub trials: u32,
    /// Master seed the trial seeds were drawn from
    pub seed: u64,
    pub mode: SimulationMode,
    pub confidence_level: Rate,
    pub cost: Distribution,
    pub revenue: Distribution,
    pub roi_pct: Distribution,
    pub npv: Distribution,
    pub probability_positive_roi: Percent,
    pub risk_distribution: RiskBands,
}

impl SimulationReport {
    pub(crate) fn from_summary(
        summary: &SimulationSummary,
        seed: u64,
        mode: SimulationMode,
        fmt: &CurrencyFormatter,
    ) -> Result<Self, CalculationError> {
        let level = to_decimal(summary.confidence_level, 4, "simulation.confidence_level")?;
        Ok(SimulationReport {
            trials: summary.trials,
            seed,
            mode,
            confidence_level: level,
            cost: Distribution::money(&summary.cost, level, fmt, "simulation.cost")?,
            revenue: Distribution::money(&summary.revenue, level, fmt, "simulation.revenue")?,
            roi_pct: Distribution::percent(&summary.roi_pct, level, "simulation.roi_pct")?,
            npv: Distribution::money(&summary.npv, level, fmt, "simulation.npv")?,
            probability_positive_roi: to_decimal(
                summary.probability_positive_roi * 100.0,
                PERCENT_DP,
                "simulation.probability_positive_roi",
            )?,
            risk_distribution: RiskBands::from_distribution(&summary.risk_distribution)?,
        })
    }
}

/// Everything `compute` hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub company_name: String,
    pub company_size: CompanySize,
    pub project_type: ProjectType,
    pub target_industry: Industry,
    /// Currency of every monetary figure below
    pub currency: Currency,
    /// Rate applied from the request currency (1 without conversion)
    pub conversion_rate: Decimal,
    pub investment: Money,
    pub timeline_months: u32,
    pub cost: CostBreakdown,
    pub projected_revenue: Money,
    pub operating_costs: Money,
    pub taxes: Money,
    pub net_profit: Money,
    pub roi_pct: Percent,
    pub npv: Money,
    /// Annual risk-adjusted discount rate
    pub discount_rate: Rate,
    pub irr: IrrOutcome,
    pub payback: Payback,
    pub initial_outlay: Money,
    pub cash_flows: Vec<MonthlyCashFlow>,
    pub simulation: SimulationReport,
    pub roi_confidence_interval: Interval<Percent>,
    pub scenarios: ScenarioSet,
    pub risk: RiskAssessment,
    pub sensitivity: SensitivityReport,
    pub insights: MarketInsights,
    pub plan: ExecutionPlan,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}
