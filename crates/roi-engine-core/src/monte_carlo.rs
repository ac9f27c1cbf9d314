//! Monte Carlo variance simulation over the cost model and projector.
//!
//! Each trial perturbs three inputs and reruns the deterministic pipeline:
//!
//! 1. **Cost factor**: normal around the expected overrun, clipped to the
//!    cost model's interval.
//! 2. **Revenue factor**: normal around 1 with spread from project risk and
//!    market volatility.
//! 3. **Timeline factor**: normal around 1 (10% spread), clipped to ±25%.
//!
//! The configured [`SimulationMode`] shifts the cost factor up and the revenue
//! factor down (or the reverse) by its bias. Each trial also draws a market
//! condition, which together with the revenue draw moves the trial's risk
//! score away from the composite score; the report gives the share of trials
//! in each risk category.
//!
//! One seed per trial is drawn from the caller's generator before any trial
//! runs, and each trial owns a ChaCha8 stream. Results are therefore the same
//! whether trials run sequentially or on the rayon pool.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cashflow::{CashFlowProjector, ProjectionInputs};
use crate::config::{SimulationConfig, SimulationMode};
use crate::cost_model::CostEstimate;
use crate::dcf;
use crate::error::CalculationError;
use crate::resolver::{MAX_TIMELINE_MONTHS, MIN_TIMELINE_MONTHS};
use crate::risk::RiskCategory;

const TIMELINE_SPREAD: f64 = 0.10;
const TIMELINE_CLIP: f64 = 0.25;
const MIN_REVENUE_FACTOR: f64 = 0.05;
const CLIP_SIGMAS: f64 = 3.0;
/// Risk points per unit of revenue shortfall.
const REVENUE_RISK_SCALE: f64 = 20.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything a trial needs, borrowed from the central estimate.
pub struct TrialModel<'a> {
    pub cost: &'a CostEstimate,
    pub projector: &'a CashFlowProjector<'a>,
    /// Central projection inputs; trials perturb a copy
    pub base: ProjectionInputs,
    pub monthly_discount_rate: f64,
    /// Spread of the revenue factor
    pub revenue_std_dev: f64,
    /// Composite risk score (0–100) of the central estimate
    pub base_risk_score: f64,
    pub mode: SimulationMode,
}

impl TrialModel<'_> {
    /// Revenue spread from project risk relative to its ROI potential, plus market volatility.
    pub fn revenue_spread(risk_level: f64, roi_potential: f64, volatility: f64) -> f64 {
        risk_level * 0.5 / roi_potential + volatility * 0.25
    }
}

/// Market backdrop drawn for each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCondition {
    Bull,
    Bear,
    Sideways,
    Volatile,
    Stable,
}

impl MarketCondition {
    pub const ALL: [MarketCondition; 5] = [
        MarketCondition::Bull,
        MarketCondition::Bear,
        MarketCondition::Sideways,
        MarketCondition::Volatile,
        MarketCondition::Stable,
    ];

    /// Risk points added to the composite score.
    pub fn risk_shift(self) -> f64 {
        match self {
            MarketCondition::Bull => -10.0,
            MarketCondition::Bear => 20.0,
            MarketCondition::Sideways => 0.0,
            MarketCondition::Volatile => 15.0,
            MarketCondition::Stable => -5.0,
        }
    }
}

/// Outcome of a single trial, in the request currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub total_cost: f64,
    pub revenue: f64,
    pub net_profit: f64,
    pub roi_pct: f64,
    pub npv: f64,
    pub timeline_months: u32,
    pub market: MarketCondition,
    pub risk_score: f64,
}

/// Share of trials (0–1) per risk category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl RiskDistribution {
    fn from_outcomes(outcomes: &[TrialOutcome]) -> Self {
        let n = outcomes.len() as f64;
        let mut dist = RiskDistribution::default();
        for o in outcomes {
            let slot = match RiskCategory::from_score(o.risk_score) {
                RiskCategory::Low => &mut dist.low,
                RiskCategory::Medium => &mut dist.medium,
                RiskCategory::High => &mut dist.high,
                RiskCategory::Critical => &mut dist.critical,
            };
            *slot += 1.0 / n;
        }
        dist
    }
}

/// Summary statistics of one simulated metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Lower percentile bound at the configured confidence level
    pub lower: f64,
    /// Upper percentile bound at the configured confidence level
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trials: u32,
    pub confidence_level: f64,
    pub cost: DistributionStats,
    pub revenue: DistributionStats,
    pub roi_pct: DistributionStats,
    pub npv: DistributionStats,
    /// Share of trials with ROI above zero
    pub probability_positive_roi: f64,
    pub risk_distribution: RiskDistribution,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct MonteCarloSimulator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> MonteCarloSimulator<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        MonteCarloSimulator { config }
    }

    pub fn run<R: RngCore + ?Sized>(
        &self,
        model: &TrialModel<'_>,
        rng: &mut R,
    ) -> Result<SimulationSummary, CalculationError> {
        let trials = self.config.trials;
        if trials == 0 {
            return Err(CalculationError::InsufficientData(
                "Monte Carlo requires at least one trial".into(),
            ));
        }

        let seeds: Vec<u64> = (0..trials).map(|_| rng.next_u64()).collect();
        let outcomes = self.run_trials(model, &seeds)?;
        debug!(
            trials,
            parallel = self.config.parallel,
            mode = %model.mode,
            "Monte Carlo trials complete"
        );

        summarize(&outcomes, self.config.confidence_level)
    }

    #[cfg(feature = "parallel")]
    fn run_trials(
        &self,
        model: &TrialModel<'_>,
        seeds: &[u64],
    ) -> Result<Vec<TrialOutcome>, CalculationError> {
        if self.config.parallel {
            seeds.par_iter().map(|seed| run_trial(model, *seed)).collect()
        } else {
            seeds.iter().map(|seed| run_trial(model, *seed)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_trials(
        &self,
        model: &TrialModel<'_>,
        seeds: &[u64],
    ) -> Result<Vec<TrialOutcome>, CalculationError> {
        seeds.iter().map(|seed| run_trial(model, *seed)).collect()
    }
}

/// One independent trial driven by its own seed.
pub fn run_trial(model: &TrialModel<'_>, seed: u64) -> Result<TrialOutcome, CalculationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cost = model.cost;
    let bias = model.mode.bias();

    let central = cost.central_factor();
    let cost_factor = sample_clipped(
        &mut rng,
        central,
        cost.cost_factor_std_dev,
        1.0,
        1.0 + cost.overrun_fraction,
    )? * (1.0 - bias);

    let spread = model.revenue_std_dev;
    let revenue_factor = (sample_clipped(
        &mut rng,
        1.0,
        spread,
        (1.0 - CLIP_SIGMAS * spread).max(MIN_REVENUE_FACTOR),
        1.0 + CLIP_SIGMAS * spread,
    )? * (1.0 + bias))
        .max(MIN_REVENUE_FACTOR);

    let timeline_factor = sample_clipped(
        &mut rng,
        1.0,
        TIMELINE_SPREAD,
        1.0 - TIMELINE_CLIP,
        1.0 + TIMELINE_CLIP,
    )?;

    let mut inputs = model.base;
    inputs.total_cost = cost.total_for(cost_factor);
    inputs.drivers.roi_potential *= revenue_factor;
    inputs.timeline_months =
        ((inputs.timeline_months as f64 * timeline_factor).round() as u32)
            .clamp(MIN_TIMELINE_MONTHS, MAX_TIMELINE_MONTHS);

    let market = MarketCondition::ALL[rng.gen_range(0..MarketCondition::ALL.len())];
    let risk_score = (model.base_risk_score
        + market.risk_shift()
        + (1.0 - revenue_factor) * REVENUE_RISK_SCALE)
        .clamp(0.0, 100.0);

    let series = model.projector.project(&inputs);
    let npv = dcf::npv(model.monthly_discount_rate, &series.flows())?;

    Ok(TrialOutcome {
        total_cost: inputs.total_cost,
        revenue: series.total_revenue(),
        net_profit: series.net_profit(),
        roi_pct: series.roi_pct(inputs.investment),
        npv,
        timeline_months: inputs.timeline_months,
        market,
        risk_score,
    })
}

fn sample_clipped(
    rng: &mut ChaCha8Rng,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
) -> Result<f64, CalculationError> {
    if std_dev <= 0.0 {
        return Ok(mean.clamp(min, max));
    }
    let dist = Normal::new(mean, std_dev).map_err(|e| CalculationError::InvalidConfig {
        field: "distribution".into(),
        reason: format!("Invalid Normal parameters: {e}"),
    })?;
    Ok(rng.sample(dist).clamp(min, max))
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Percentile of a **sorted** slice with linear interpolation; `p` in 0..=100.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn compute_statistics(mut values: Vec<f64>, level: f64) -> DistributionStats {
    let n = values.len() as f64;
    // Sum in trial order before sorting so the mean is order-stable.
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    values.sort_by(f64::total_cmp);
    let tail = (1.0 - level) / 2.0 * 100.0;

    DistributionStats {
        mean,
        std_dev: variance.sqrt(),
        median: percentile_sorted(&values, 50.0),
        min: values[0],
        max: values[values.len() - 1],
        lower: percentile_sorted(&values, tail),
        upper: percentile_sorted(&values, 100.0 - tail),
    }
}

pub fn summarize(
    outcomes: &[TrialOutcome],
    confidence_level: f64,
) -> Result<SimulationSummary, CalculationError> {
    if outcomes.is_empty() {
        return Err(CalculationError::InsufficientData(
            "no Monte Carlo outcomes to summarize".into(),
        ));
    }
    let collect = |f: fn(&TrialOutcome) -> f64| outcomes.iter().map(f).collect::<Vec<f64>>();
    let positive = outcomes.iter().filter(|o| o.roi_pct > 0.0).count();

    Ok(SimulationSummary {
        trials: outcomes.len() as u32,
        confidence_level,
        cost: compute_statistics(collect(|o| o.total_cost), confidence_level),
        revenue: compute_statistics(collect(|o| o.revenue), confidence_level),
        roi_pct: compute_statistics(collect(|o| o.roi_pct), confidence_level),
        npv: compute_statistics(collect(|o| o.npv), confidence_level),
        probability_positive_roi: positive as f64 / outcomes.len() as f64,
        risk_distribution: RiskDistribution::from_outcomes(outcomes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::RevenueDrivers;
    use crate::config::ProjectionConfig;
    use crate::cost_model::AppliedMultiplier;

    const SEED: u64 = 42;

    fn cost_estimate() -> CostEstimate {
        CostEstimate {
            base_cost: Some(150_000.0),
            multipliers: vec![AppliedMultiplier {
                name: "company_size:medium".into(),
                factor: 1.5,
            }],
            estimated_cost: Some(243_000.0),
            planned_cost: 100_000.0,
            overrun_fraction: 0.22,
            contingency: 11_000.0,
            total_cost: 111_000.0,
            lower: 100_000.0,
            upper: 122_000.0,
            cost_factor_std_dev: 0.11 / 1.959964,
        }
    }

    fn base_inputs() -> ProjectionInputs {
        ProjectionInputs {
            investment: 100_000.0,
            total_cost: 111_000.0,
            drivers: RevenueDrivers {
                roi_potential: 2.5,
                growth_rate: 0.25,
                efficiency: 1.05,
            },
            operating_cost_ratio: 0.30,
            tax_rate: 0.25,
            timeline_months: 11,
        }
    }

    fn simulate(config: &SimulationConfig, seed: u64) -> SimulationSummary {
        simulate_mode(config, seed, SimulationMode::Standard)
    }

    fn simulate_mode(config: &SimulationConfig, seed: u64, mode: SimulationMode) -> SimulationSummary {
        let shape = ProjectionConfig::default();
        let projector = CashFlowProjector::new(&shape);
        let cost = cost_estimate();
        let model = TrialModel {
            cost: &cost,
            projector: &projector,
            base: base_inputs(),
            monthly_discount_rate: dcf::monthly_rate(0.095),
            revenue_std_dev: TrialModel::revenue_spread(0.20, 2.5, 0.20),
            base_risk_score: 40.0,
            mode,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        MonteCarloSimulator::new(config).run(&model, &mut rng).unwrap()
    }

    #[test]
    fn test_reproducible_with_seed() {
        let config = SimulationConfig::default();
        let a = simulate(&config, SEED);
        let b = simulate(&config, SEED);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = SimulationConfig::default();
        assert_ne!(simulate(&config, 1).roi_pct.mean, simulate(&config, 2).roi_pct.mean);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel = SimulationConfig::default();
        let sequential = SimulationConfig {
            parallel: false,
            ..SimulationConfig::default()
        };
        assert_eq!(simulate(&parallel, SEED), simulate(&sequential, SEED));
    }

    #[test]
    fn test_cost_samples_stay_inside_interval() {
        let s = simulate(&SimulationConfig::default(), SEED);
        assert!(s.cost.min >= 100_000.0 - 1e-6);
        assert!(s.cost.max <= 122_000.0 + 1e-6);
        assert!((s.cost.mean - 111_000.0).abs() < 1_000.0);
    }

    #[test]
    fn test_interval_ordering() {
        let s = simulate(&SimulationConfig::default(), SEED);
        for stats in [&s.cost, &s.revenue, &s.roi_pct, &s.npv] {
            assert!(stats.min <= stats.lower);
            assert!(stats.lower <= stats.median);
            assert!(stats.median <= stats.upper);
            assert!(stats.upper <= stats.max);
            assert!(stats.std_dev > 0.0);
        }
        assert_eq!(s.trials, 1_000);
        assert!(s.probability_positive_roi > 0.9);
    }

    #[test]
    fn test_mean_roi_within_interval_across_runs() {
        let config = SimulationConfig::default();
        let hits = (0..20u64)
            .filter(|seed| {
                let s = simulate(&config, *seed);
                s.roi_pct.lower <= s.roi_pct.mean && s.roi_pct.mean <= s.roi_pct.upper
            })
            .count();
        assert!(hits >= 19, "mean inside interval in only {hits}/20 runs");
    }

    #[test]
    fn test_stress_modes_shift_outcomes() {
        let config = SimulationConfig::default();
        let standard = simulate_mode(&config, SEED, SimulationMode::Standard);
        let optimistic = simulate_mode(&config, SEED, SimulationMode::Optimistic);
        let pessimistic = simulate_mode(&config, SEED, SimulationMode::Pessimistic);
        let stress = simulate_mode(&config, SEED, SimulationMode::StressTest);

        assert!(optimistic.roi_pct.mean > standard.roi_pct.mean);
        assert!(standard.roi_pct.mean > pessimistic.roi_pct.mean);
        assert!(pessimistic.roi_pct.mean > stress.roi_pct.mean);
        assert!(stress.cost.mean > standard.cost.mean * 1.15);
        assert!(stress.probability_positive_roi <= standard.probability_positive_roi);
        assert!(stress.risk_distribution.low <= standard.risk_distribution.low);
    }

    #[test]
    fn test_risk_distribution_covers_every_trial() {
        let s = simulate(&SimulationConfig::default(), SEED);
        let d = s.risk_distribution;
        assert!((d.low + d.medium + d.high + d.critical - 1.0).abs() < 1e-9);
        // Base score 40 with shifts of -10..+20 and a small revenue term
        assert!(d.medium > 0.4);
        assert!(d.low > 0.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&sorted, 50.0), 3.0);
        assert!((percentile_sorted(&sorted, 10.0) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spread_returns_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        assert_eq!(sample_clipped(&mut rng, 1.2, 0.0, 1.0, 1.5).unwrap(), 1.2);
    }
}
