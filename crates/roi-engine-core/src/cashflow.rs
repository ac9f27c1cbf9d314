//! Month-by-month cash flow projection.
//!
//! Cost is front-loaded: an upfront share at month 0 and the remainder over a
//! linearly declining build phase. Revenue follows a normalized logistic
//! adoption curve, so early months earn little and the plateau earns most.
//! Tax is charged only on cumulative profit above its previous high, which
//! keeps loss-making months untaxed.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ProjectionConfig;
use crate::resolver::CalculationContext;

/// What drives gross revenue for one projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueDrivers {
    /// Gross revenue per unit of investment
    pub roi_potential: f64,
    /// Annual market growth rate
    pub growth_rate: f64,
    /// Company execution efficiency
    pub efficiency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub investment: f64,
    pub total_cost: f64,
    pub drivers: RevenueDrivers,
    pub operating_cost_ratio: f64,
    pub tax_rate: f64,
    pub timeline_months: u32,
}

impl ProjectionInputs {
    pub fn from_context(ctx: &CalculationContext, total_cost: f64) -> Self {
        ProjectionInputs {
            investment: ctx.investment,
            total_cost,
            drivers: RevenueDrivers {
                roi_potential: ctx.project.roi_potential,
                growth_rate: ctx.industry.growth_rate,
                efficiency: ctx.company.efficiency_factor,
            },
            operating_cost_ratio: ctx.project.operating_cost_ratio,
            tax_rate: ctx.company.tax_rate,
            timeline_months: ctx.timeline_months,
        }
    }
}

/// One projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    pub month: u32,
    pub revenue: f64,
    pub operating_cost: f64,
    pub build_cost: f64,
    pub tax: f64,
    pub net: f64,
    /// After-tax cumulative position including the initial outlay
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub initial_outlay: f64,
    pub periods: Vec<MonthlyFlow>,
}

impl CashFlowSeries {
    /// Flows indexed by month, month 0 being the negative outlay.
    pub fn flows(&self) -> Vec<f64> {
        std::iter::once(-self.initial_outlay)
            .chain(self.periods.iter().map(|p| p.net))
            .collect()
    }

    pub fn total_revenue(&self) -> f64 {
        self.periods.iter().map(|p| p.revenue).sum()
    }

    pub fn total_operating_cost(&self) -> f64 {
        self.periods.iter().map(|p| p.operating_cost).sum()
    }

    pub fn total_tax(&self) -> f64 {
        self.periods.iter().map(|p| p.tax).sum()
    }

    /// Final after-tax cumulative position.
    pub fn net_profit(&self) -> f64 {
        self.periods
            .last()
            .map(|p| p.cumulative)
            .unwrap_or(-self.initial_outlay)
    }

    /// `(net profit / investment) × 100`.
    pub fn roi_pct(&self, investment: f64) -> f64 {
        self.net_profit() / investment * 100.0
    }
}

pub struct CashFlowProjector<'a> {
    shape: &'a ProjectionConfig,
}

impl<'a> CashFlowProjector<'a> {
    pub fn new(shape: &'a ProjectionConfig) -> Self {
        CashFlowProjector { shape }
    }

    /// Gross revenue over the horizon before operating costs and tax.
    pub fn gross_revenue(&self, investment: f64, drivers: &RevenueDrivers, months: u32) -> f64 {
        let years = (months as f64 / 12.0).min(self.shape.growth_years_cap);
        let growth = drivers.growth_rate.clamp(0.0, self.shape.growth_cap);
        investment * drivers.roi_potential * (1.0 + growth * years) * drivers.efficiency
    }

    pub fn project(&self, inputs: &ProjectionInputs) -> CashFlowSeries {
        let months = inputs.timeline_months.max(1);
        let gross = self.gross_revenue(inputs.investment, &inputs.drivers, months);

        let upfront = inputs.total_cost * self.shape.upfront_cost_share;
        let build_total = inputs.total_cost - upfront;
        let build_months = ((months as f64 * self.shape.build_phase_fraction).ceil() as u32)
            .clamp(1, months);
        let build_weight_sum = (build_months * (build_months + 1)) as f64 / 2.0;

        let adoption = self.adoption_weights(months);

        let mut periods = Vec::with_capacity(months as usize);
        let mut pre_tax_cumulative = -upfront;
        let mut taxed_high = 0.0_f64;
        let mut cumulative = -upfront;

        for (idx, weight) in adoption.iter().enumerate() {
            let month = idx as u32 + 1;
            let revenue = gross * weight;
            let operating_cost = revenue * inputs.operating_cost_ratio;
            let build_cost = if month <= build_months {
                build_total * (build_months - month + 1) as f64 / build_weight_sum
            } else {
                0.0
            };

            let pre_tax = revenue - operating_cost - build_cost;
            pre_tax_cumulative += pre_tax;
            let tax = if pre_tax_cumulative > taxed_high {
                let taxable = pre_tax_cumulative - taxed_high;
                taxed_high = pre_tax_cumulative;
                taxable * inputs.tax_rate
            } else {
                0.0
            };

            let net = pre_tax - tax;
            cumulative += net;
            periods.push(MonthlyFlow {
                month,
                revenue,
                operating_cost,
                build_cost,
                tax,
                net,
                cumulative,
            });
        }

        CashFlowSeries {
            initial_outlay: upfront,
            periods,
        }
    }

    /// Normalized logistic weights for months 1..=n.
    fn adoption_weights(&self, months: u32) -> Vec<f64> {
        let k = self.shape.s_curve_steepness;
        let raw: Vec<f64> = (1..=months)
            .map(|m| {
                let progress = m as f64 / months as f64;
                1.0 / (1.0 + (-k * (progress - 0.5)).exp())
            })
            .collect();
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / total).collect()
    }
}

/// Last calendar day of projection month `month`; month 1 is the start month.
pub fn period_end(start: NaiveDate, month: u32) -> Option<NaiveDate> {
    start
        .with_day0(0)?
        .checked_add_months(Months::new(month))?
        .pred_opt()
}
