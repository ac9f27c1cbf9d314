//! Execution plan derived from the central projection.
//!
//! Milestones sit at 25/50/75/100% of the timeline and report what the
//! projection has spent and earned by then. KPI targets are the monthly
//! run-rates implied by the same projection.

use serde::{Deserialize, Serialize};

use crate::cashflow::CashFlowSeries;
use crate::currency::{to_decimal, CurrencyFormatter, PERCENT_DP};
use crate::dcf::Payback;
use crate::error::CalculationError;
use crate::types::{Money, Percent};

const MILESTONES: [(f64, &str); 4] = [
    (0.25, "MVP launch"),
    (0.50, "Market validation"),
    (0.75, "Scale preparation"),
    (1.00, "Full launch"),
];

const BASE_SUCCESS: f64 = 50.0;
const MIN_SUCCESS: f64 = 10.0;
const MAX_SUCCESS: f64 = 85.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub month: u32,
    pub name: String,
    /// Share of the timeline elapsed
    pub progress_pct: Percent,
    /// Outlay plus build cost paid through `month`
    pub cumulative_spend: Money,
    pub spend_share_pct: Percent,
    pub cumulative_revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTargets {
    pub monthly_revenue: Money,
    /// Half the investment spread over the timeline
    pub monthly_cash_burn: Money,
    pub gross_margin_pct: Percent,
    /// Half the projected ROI
    pub roi_milestone_pct: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_even_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub milestones: Vec<Milestone>,
    pub kpis: KpiTargets,
    /// Heuristic chance of delivering the plan, 10–85%
    pub success_probability: Percent,
}

/// Inputs the plan reads from a finished central estimate.
pub struct PlanInputs<'a> {
    pub series: &'a CashFlowSeries,
    pub investment: f64,
    pub operating_cost_ratio: f64,
    pub growth_rate: f64,
    pub roi_pct: f64,
    pub risk_score: f64,
    pub payback: Payback,
}

pub fn execution_plan(
    inputs: &PlanInputs<'_>,
    fmt: &CurrencyFormatter,
) -> Result<ExecutionPlan, CalculationError> {
    let series = inputs.series;
    let months = series.periods.len().max(1) as u32;
    let total_spend =
        series.initial_outlay + series.periods.iter().map(|p| p.build_cost).sum::<f64>();
    if total_spend <= 0.0 {
        return Err(CalculationError::DivisionByZero {
            context: "milestone spend share".into(),
        });
    }

    let milestones = MILESTONES
        .iter()
        .map(|(point, name)| {
            let month = ((months as f64 * point).ceil() as u32).clamp(1, months);
            let through = series.periods.iter().take_while(|p| p.month <= month);
            let (spend, revenue) = through.fold((series.initial_outlay, 0.0), |(s, r), p| {
                (s + p.build_cost, r + p.revenue)
            });
            Ok(Milestone {
                month,
                name: (*name).to_string(),
                progress_pct: to_decimal(point * 100.0, PERCENT_DP, "plan.progress_pct")?,
                cumulative_spend: fmt.money(spend, "plan.cumulative_spend")?,
                spend_share_pct: to_decimal(
                    spend / total_spend * 100.0,
                    PERCENT_DP,
                    "plan.spend_share_pct",
                )?,
                cumulative_revenue: fmt.money(revenue, "plan.cumulative_revenue")?,
            })
        })
        .collect::<Result<Vec<_>, CalculationError>>()?;

    let kpis = KpiTargets {
        monthly_revenue: fmt.money(series.total_revenue() / months as f64, "kpis.monthly_revenue")?,
        monthly_cash_burn: fmt.money(
            inputs.investment / (2.0 * months as f64),
            "kpis.monthly_cash_burn",
        )?,
        gross_margin_pct: to_decimal(
            (1.0 - inputs.operating_cost_ratio) * 100.0,
            PERCENT_DP,
            "kpis.gross_margin_pct",
        )?,
        roi_milestone_pct: to_decimal(inputs.roi_pct * 0.5, PERCENT_DP, "kpis.roi_milestone_pct")?,
        break_even_month: inputs.payback.month(),
    };

    Ok(ExecutionPlan {
        milestones,
        kpis,
        success_probability: to_decimal(
            success_probability(inputs.growth_rate, inputs.risk_score, inputs.roi_pct),
            1,
            "plan.success_probability",
        )?,
    })
}

/// Starts at 50%, moved by market growth, composite risk and projected ROI.
pub fn success_probability(growth_rate: f64, risk_score: f64, roi_pct: f64) -> f64 {
    let mut p = BASE_SUCCESS;
    if growth_rate > 0.10 {
        p += 10.0;
    } else if growth_rate < 0.03 {
        p -= 10.0;
    }
    if roi_pct > 100.0 {
        p += 15.0;
    } else if roi_pct < 50.0 {
        p -= 10.0;
    }
    p -= risk_score * 0.3;
    p.clamp(MIN_SUCCESS, MAX_SUCCESS)
}
