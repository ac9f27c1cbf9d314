use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cashflow::{CashFlowProjector, ProjectionInputs};
use crate::currency::{to_decimal, PERCENT_DP};
use crate::error::CalculationError;
use crate::resolver::{MAX_TIMELINE_MONTHS, MIN_TIMELINE_MONTHS};
use crate::types::Percent;

/// Largest change applied to each driver, in percent.
pub const MAX_CHANGE_PCT: Decimal = dec!(20);
/// Distance between sweep points, in percent.
pub const STEP_PCT: Decimal = dec!(10);

/// Input varied by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityDriver {
    RoiPotential,
    MarketGrowth,
    Timeline,
    Cost,
}

impl SensitivityDriver {
    pub const ALL: [SensitivityDriver; 4] = [
        SensitivityDriver::RoiPotential,
        SensitivityDriver::MarketGrowth,
        SensitivityDriver::Timeline,
        SensitivityDriver::Cost,
    ];

    fn apply(self, base: &ProjectionInputs, factor: f64) -> ProjectionInputs {
        let mut inputs = *base;
        match self {
            SensitivityDriver::RoiPotential => inputs.drivers.roi_potential *= factor,
            SensitivityDriver::MarketGrowth => inputs.drivers.growth_rate *= factor,
            SensitivityDriver::Timeline => {
                inputs.timeline_months = ((base.timeline_months as f64 * factor).round() as u32)
                    .clamp(MIN_TIMELINE_MONTHS, MAX_TIMELINE_MONTHS)
            }
            SensitivityDriver::Cost => inputs.total_cost *= factor,
        }
        inputs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub change_pct: Decimal,
    pub roi_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSensitivity {
    pub driver: SensitivityDriver,
    pub points: Vec<SensitivityPoint>,
    /// ROI at the largest increase minus ROI at the largest decrease
    pub swing: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_roi_pct: Percent,
    /// Largest absolute swing first
    pub drivers: Vec<DriverSensitivity>,
}

/// Symmetric sweep `-max, -max+step, …, 0, …, max`.
fn sweep_values(max: Decimal, step: Decimal) -> Result<Vec<Decimal>, CalculationError> {
    if step <= Decimal::ZERO {
        return Err(CalculationError::InvalidConfig {
            field: "sensitivity.step".into(),
            reason: "Step must be positive".into(),
        });
    }
    let mut values = Vec::new();
    let mut current = -max;
    while current <= max {
        values.push(current);
        current += step;
    }
    Ok(values)
}

pub struct SensitivityAnalyzer<'a> {
    projector: &'a CashFlowProjector<'a>,
}

impl<'a> SensitivityAnalyzer<'a> {
    pub fn new(projector: &'a CashFlowProjector<'a>) -> Self {
        SensitivityAnalyzer { projector }
    }

    pub fn analyze(&self, base: &ProjectionInputs) -> Result<SensitivityReport, CalculationError> {
        let sweep = sweep_values(MAX_CHANGE_PCT, STEP_PCT)?;
        let base_roi = self.projector.project(base).roi_pct(base.investment);

        let mut drivers = SensitivityDriver::ALL
            .iter()
            .map(|driver| {
                let points = sweep
                    .iter()
                    .map(|change| {
                        let factor = 1.0 + change.to_f64().unwrap_or(0.0) / 100.0;
                        let inputs = driver.apply(base, factor);
                        let roi = self.projector.project(&inputs).roi_pct(inputs.investment);
                        Ok(SensitivityPoint {
                            change_pct: *change,
                            roi_pct: to_decimal(roi, PERCENT_DP, "sensitivity.roi_pct")?,
                        })
                    })
                    .collect::<Result<Vec<_>, CalculationError>>()?;
                let swing = match (points.first(), points.last()) {
                    (Some(low), Some(high)) => high.roi_pct - low.roi_pct,
                    _ => Decimal::ZERO,
                };
                Ok(DriverSensitivity {
                    driver: *driver,
                    points,
                    swing,
                })
            })
            .collect::<Result<Vec<_>, CalculationError>>()?;

        drivers.sort_by(|a, b| b.swing.abs().cmp(&a.swing.abs()));

        Ok(SensitivityReport {
            base_roi_pct: to_decimal(base_roi, PERCENT_DP, "sensitivity.base_roi_pct")?,
            drivers,
        })
    }
}
