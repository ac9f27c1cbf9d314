use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DiscountConfig;
use crate::error::CalculationError;
use crate::resolver::CalculationContext;

/// Residual |NPV| accepted as a root, relative to the largest absolute flow.
pub const IRR_TOLERANCE: f64 = 1e-9;
pub const MAX_IRR_ITERATIONS: u32 = 100;

const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Annual risk-adjusted discount rate for a context.
pub fn discount_rate(config: &DiscountConfig, ctx: &CalculationContext) -> f64 {
    config.base_rate + ctx.industry.risk_factor * config.risk_premium_scale
}

/// Equivalent monthly rate of an annual rate.
pub fn monthly_rate(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}

/// Equivalent annual rate of a monthly rate.
pub fn annualize(monthly: f64) -> f64 {
    (1.0 + monthly).powi(12) - 1.0
}

/// Net present value of `flows`, where `flows[0]` is undiscounted (the outlay).
pub fn npv(rate: f64, flows: &[f64]) -> Result<f64, CalculationError> {
    if rate <= -1.0 {
        return Err(CalculationError::DivisionByZero {
            context: format!("NPV discount factor at rate {rate}"),
        });
    }
    let base = 1.0 + rate;
    let mut factor = 1.0;
    let mut total = 0.0;
    for cf in flows {
        total += cf / factor;
        factor *= base;
    }
    Ok(total)
}

/// Converged IRR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Per-period rate of the input flows
    pub rate: f64,
    pub iterations: u32,
}

/// Internal rate of return by Newton-Raphson, seeded from `guess`.
pub fn irr(flows: &[f64], guess: f64) -> Result<IrrSolution, CalculationError> {
    if flows.len() < 2 {
        return Err(CalculationError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    let has_positive = flows.iter().any(|cf| *cf > 0.0);
    let has_negative = flows.iter().any(|cf| *cf < 0.0);
    if !(has_positive && has_negative) {
        return Err(CalculationError::NoSignChange {
            function: "IRR".into(),
        });
    }

    let scale = flows.iter().fold(0.0_f64, |acc, cf| acc.max(cf.abs()));
    let mut rate = guess.clamp(MIN_RATE, MAX_RATE);
    let mut residual = f64::INFINITY;

    for i in 0..MAX_IRR_ITERATIONS {
        let (value, derivative) = npv_with_derivative(rate, flows);
        residual = value;

        if !value.is_finite() {
            break;
        }
        if value.abs() <= IRR_TOLERANCE * scale {
            debug!(rate, iterations = i, "IRR converged");
            return Ok(IrrSolution {
                rate,
                iterations: i,
            });
        }
        if derivative == 0.0 || !derivative.is_finite() {
            return Err(CalculationError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                residual: value,
            });
        }

        rate -= value / derivative;

        // Guard against divergence
        rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    Err(CalculationError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        residual,
    })
}

fn npv_with_derivative(rate: f64, flows: &[f64]) -> (f64, f64) {
    let base = 1.0 + rate;
    let mut value = 0.0;
    let mut derivative = 0.0;
    let mut factor = 1.0;
    for (t, cf) in flows.iter().enumerate() {
        value += cf / factor;
        if t > 0 {
            derivative -= t as f64 * cf / (factor * base);
        }
        factor *= base;
    }
    (value, derivative)
}

/// When cumulative cash flow first turns non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payback {
    Month { month: u32 },
    BeyondHorizon,
}

impl Payback {
    pub fn month(self) -> Option<u32> {
        match self {
            Payback::Month { month } => Some(month),
            Payback::BeyondHorizon => None,
        }
    }
}

/// First index whose cumulative flow is >= 0; month 0 is the outlay.
pub fn payback_period(flows: &[f64]) -> Payback {
    let mut cumulative = 0.0;
    for (month, cf) in flows.iter().enumerate() {
        cumulative += cf;
        if cumulative >= 0.0 {
            return Payback::Month {
                month: month as u32,
            };
        }
    }
    Payback::BeyondHorizon
}
