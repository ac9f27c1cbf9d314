//! Tunable engine parameters.
//!
//! Every section has a `Default` matching the documented model, so a config
//! file only needs to name the values it changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalculationError;

pub const MIN_TRIALS: u32 = 100;
pub const MAX_TRIALS: u32 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub discount: DiscountConfig,
    pub risk_weights: RiskWeights,
    pub scenarios: ScenarioConfig,
    pub projection: ProjectionConfig,
}

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: u32,
    /// Two-sided confidence level for simulated intervals
    pub confidence_level: f64,
    /// Fixed master seed; `None` draws one from OS entropy per call
    pub seed: Option<u64>,
    /// Run trials on the rayon pool when the `parallel` feature is enabled
    pub parallel: bool,
    pub mode: SimulationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: 1_000,
            confidence_level: 0.95,
            seed: None,
            parallel: true,
            mode: SimulationMode::Standard,
        }
    }
}

/// Directional bias applied to every Monte Carlo trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    #[default]
    Standard,
    Optimistic,
    Pessimistic,
    StressTest,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 4] = [
        SimulationMode::Standard,
        SimulationMode::Optimistic,
        SimulationMode::Pessimistic,
        SimulationMode::StressTest,
    ];

    /// Shift of the cost and revenue factors. Negative raises cost and cuts revenue.
    pub fn bias(self) -> f64 {
        match self {
            SimulationMode::Standard => 0.0,
            SimulationMode::Optimistic => 0.10,
            SimulationMode::Pessimistic => -0.10,
            SimulationMode::StressTest => -0.20,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            SimulationMode::Standard => "standard",
            SimulationMode::Optimistic => "optimistic",
            SimulationMode::Pessimistic => "pessimistic",
            SimulationMode::StressTest => "stress_test",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        SimulationMode::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = SimulationMode::ALL.iter().map(|m| m.id()).collect();
                format!("unknown simulation mode '{s}'; expected one of {}", known.join(", "))
            })
    }
}

/// Risk-adjusted discount rate: `base_rate + industry_risk × risk_premium_scale` (annual).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountConfig {
    pub base_rate: f64,
    pub risk_premium_scale: f64,
}

impl Default for DiscountConfig {
    fn default() -> Self {
        DiscountConfig {
            base_rate: 0.08,
            risk_premium_scale: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub company: f64,
    pub project: f64,
    pub industry: f64,
    pub market_volatility: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            company: 0.30,
            project: 0.40,
            industry: 0.20,
            market_volatility: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.company + self.project + self.industry + self.market_volatility
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Conservative ROI as a share of realistic ROI
    pub conservative_factor: f64,
    /// Optimistic ROI as a share of realistic ROI
    pub optimistic_factor: f64,
    pub conservative_probability: f64,
    pub realistic_probability: f64,
    pub optimistic_probability: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            conservative_factor: 0.70,
            optimistic_factor: 1.40,
            conservative_probability: 0.30,
            realistic_probability: 0.50,
            optimistic_probability: 0.20,
        }
    }
}

/// Shape of the monthly cash flow projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Share of total cost paid at month 0
    pub upfront_cost_share: f64,
    /// Fraction of the horizon over which the remaining cost is paid
    pub build_phase_fraction: f64,
    /// Logistic steepness of the adoption curve
    pub s_curve_steepness: f64,
    /// Ceiling on annual market growth credited to revenue
    pub growth_cap: f64,
    /// Ceiling on the number of years growth compounds over
    pub growth_years_cap: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            upfront_cost_share: 0.60,
            build_phase_fraction: 0.25,
            s_curve_steepness: 6.0,
            growth_cap: 0.50,
            growth_years_cap: 5.0,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the model cannot run with.
    pub fn validate(&self) -> Result<(), CalculationError> {
        for (field, value) in self.float_fields() {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be finite, got {value}")));
            }
        }

        let sim = &self.simulation;
        if !(MIN_TRIALS..=MAX_TRIALS).contains(&sim.trials) {
            return Err(invalid(
                "simulation.trials",
                format!("must be within {MIN_TRIALS}..={MAX_TRIALS}, got {}", sim.trials),
            ));
        }
        if !(sim.confidence_level > 0.5 && sim.confidence_level < 1.0) {
            return Err(invalid(
                "simulation.confidence_level",
                format!("must be within (0.5, 1), got {}", sim.confidence_level),
            ));
        }

        if self.discount.base_rate <= -1.0 || self.discount.risk_premium_scale < 0.0 {
            return Err(invalid(
                "discount",
                "base_rate must exceed -1 and risk_premium_scale must be non-negative",
            ));
        }

        let w = &self.risk_weights;
        if [w.company, w.project, w.industry, w.market_volatility]
            .iter()
            .any(|x| *x < 0.0)
        {
            return Err(invalid("risk_weights", "weights must be non-negative"));
        }
        if (w.sum() - 1.0).abs() > 1e-9 {
            return Err(invalid(
                "risk_weights",
                format!("weights must sum to 1, got {}", w.sum()),
            ));
        }

        let s = &self.scenarios;
        if !(s.conservative_factor > 0.0 && s.conservative_factor <= 1.0) {
            return Err(invalid(
                "scenarios.conservative_factor",
                "must be within (0, 1]",
            ));
        }
        if s.optimistic_factor < 1.0 {
            return Err(invalid("scenarios.optimistic_factor", "must be at least 1"));
        }
        let total =
            s.conservative_probability + s.realistic_probability + s.optimistic_probability;
        if (total - 1.0).abs() > 0.001 {
            return Err(invalid(
                "scenarios",
                format!("probabilities must sum to 1, got {total}"),
            ));
        }

        let p = &self.projection;
        // Month 0 must carry an outlay for payback to be measured from it.
        if !(p.upfront_cost_share > 0.0 && p.upfront_cost_share <= 1.0) {
            return Err(invalid("projection.upfront_cost_share", "must be within (0, 1]"));
        }
        if !(p.build_phase_fraction > 0.0 && p.build_phase_fraction <= 1.0) {
            return Err(invalid("projection.build_phase_fraction", "must be within (0, 1]"));
        }
        if p.s_curve_steepness <= 0.0 || p.growth_cap < 0.0 || p.growth_years_cap < 0.0 {
            return Err(invalid(
                "projection",
                "steepness must be positive and growth caps non-negative",
            ));
        }
        Ok(())
    }

    fn float_fields(&self) -> [(&'static str, f64); 17] {
        let (sim, d, w, s, p) = (
            &self.simulation,
            &self.discount,
            &self.risk_weights,
            &self.scenarios,
            &self.projection,
        );
        [
            ("simulation.confidence_level", sim.confidence_level),
            ("discount.base_rate", d.base_rate),
            ("discount.risk_premium_scale", d.risk_premium_scale),
            ("risk_weights.company", w.company),
            ("risk_weights.project", w.project),
            ("risk_weights.industry", w.industry),
            ("risk_weights.market_volatility", w.market_volatility),
            ("scenarios.conservative_factor", s.conservative_factor),
            ("scenarios.optimistic_factor", s.optimistic_factor),
            ("scenarios.conservative_probability", s.conservative_probability),
            ("scenarios.realistic_probability", s.realistic_probability),
            ("scenarios.optimistic_probability", s.optimistic_probability),
            ("projection.upfront_cost_share", p.upfront_cost_share),
            ("projection.build_phase_fraction", p.build_phase_fraction),
            ("projection.s_curve_steepness", p.s_curve_steepness),
            ("projection.growth_cap", p.growth_cap),
            ("projection.growth_years_cap", p.growth_years_cap),
        ]
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CalculationError {
    CalculationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::default().simulation.trials, 1_000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"simulation": {"trials": 5000, "seed": 7}}"#).unwrap();
        assert_eq!(cfg.simulation.trials, 5000);
        assert_eq!(cfg.simulation.seed, Some(7));
        assert_eq!(cfg.simulation.confidence_level, 0.95);
        assert_eq!(cfg.risk_weights, RiskWeights::default());
    }

    #[test]
    fn test_simulation_mode_parsing() {
        assert_eq!("stress-test".parse::<SimulationMode>(), Ok(SimulationMode::StressTest));
        assert_eq!(" Pessimistic ".parse::<SimulationMode>(), Ok(SimulationMode::Pessimistic));
        assert!("doom".parse::<SimulationMode>().is_err());
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"simulation": {"mode": "stress_test"}}"#).unwrap();
        assert_eq!(cfg.simulation.mode.bias(), -0.20);
    }

    #[test]
    fn test_rejects_unbalanced_weights() {
        let mut cfg = EngineConfig::default();
        cfg.risk_weights.project = 0.5;
        assert!(matches!(
            cfg.validate(),
            Err(CalculationError::InvalidConfig { field, .. }) if field == "risk_weights"
        ));
    }

    #[test]
    fn test_rejects_trial_count_outside_bounds() {
        let mut cfg = EngineConfig::default();
        cfg.simulation.trials = 20_000;
        assert!(cfg.validate().is_err());
        cfg.simulation.trials = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_and_infinite_values() {
        let mut cfg = EngineConfig::default();
        cfg.discount.base_rate = f64::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(CalculationError::InvalidConfig { field, .. }) if field == "discount.base_rate"
        ));

        let mut cfg = EngineConfig::default();
        cfg.projection.growth_cap = f64::INFINITY;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.scenarios.optimistic_probability = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_upfront_share() {
        let mut cfg = EngineConfig::default();
        cfg.projection.upfront_cost_share = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(CalculationError::InvalidConfig { field, .. })
                if field == "projection.upfront_cost_share"
        ));
        cfg.projection.upfront_cost_share = 1.0;
        assert!(cfg.validate().is_ok());
    }
}
