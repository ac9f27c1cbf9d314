use roi_engine_core::cashflow::{CashFlowProjector, ProjectionInputs, RevenueDrivers};
use roi_engine_core::catalog::{CatalogId, CompanySize, Industry, ProjectType};
use roi_engine_core::config::{ProjectionConfig, SimulationConfig};
use roi_engine_core::dcf::{self, Payback};
use roi_engine_core::result::IrrOutcome;
use roi_engine_core::{CalculationRequest, EngineConfig, ProfileCatalog, RoiEngine};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn engine(trials: u32, seed: u64) -> RoiEngine {
    let config = EngineConfig {
        simulation: SimulationConfig {
            trials,
            seed: Some(seed),
            ..Default::default()
        },
        ..Default::default()
    };
    RoiEngine::new(ProfileCatalog::default(), config).unwrap()
}

fn request(size: CompanySize, project: ProjectType, industry: Industry) -> CalculationRequest {
    CalculationRequest {
        company_size: size.id().into(),
        project_type: project.id().into(),
        target_industry: industry.id().into(),
        ..Default::default()
    }
}

// ===========================================================================
// Whole-catalog sweep
// ===========================================================================

#[test]
fn test_every_combination_holds_invariants() {
    let engine = engine(100, 17);
    let mut total = 0usize;
    let mut positive = 0usize;

    for size in CompanySize::ALL {
        for project in ProjectType::ALL {
            for industry in Industry::ALL {
                let result = engine
                    .compute(&request(*size, *project, *industry))
                    .unwrap_or_else(|e| panic!("{size}/{project}/{industry}: {e}"));

                let s = &result.scenarios;
                assert!(
                    s.conservative.roi_pct <= s.realistic.roi_pct
                        && s.realistic.roi_pct <= s.optimistic.roi_pct,
                    "scenario order broken for {size}/{project}/{industry}"
                );

                let cost = &result.cost;
                assert!(cost.total_cost > Decimal::ZERO);
                assert!(
                    cost.confidence_interval.contains(&cost.total_cost),
                    "total cost outside interval for {size}/{project}/{industry}"
                );

                if let IrrOutcome::Undefined { .. } = result.irr {
                    assert!(result.warnings.iter().any(|w| w.contains("IRR")));
                }

                total += 1;
                if result.roi_pct > Decimal::ZERO {
                    positive += 1;
                }
            }
        }
    }

    let share = positive as f64 / total as f64;
    assert!(share >= 0.65, "only {positive}/{total} combinations were profitable");
}

#[test]
fn test_minimum_startup_investment_overrun_is_bounded() {
    for project in ProjectType::ALL {
        let mut req = request(CompanySize::Startup, *project, Industry::Ecommerce);
        req.investment = Some(dec!(1000));
        let result = engine(100, 3).compute(&req).unwrap();
        assert!(
            result.cost.overrun_fraction <= dec!(0.20),
            "{project}: overrun {}",
            result.cost.overrun_fraction
        );
    }

    let mut req = request(
        CompanySize::Startup,
        ProjectType::MarketingCampaign,
        Industry::Ecommerce,
    );
    req.investment = Some(dec!(1000));
    let result = engine(100, 3).compute(&req).unwrap();
    assert_eq!(result.cost.overrun_fraction, dec!(0.06));
    assert!(result.roi_pct > Decimal::ZERO);
}

// ===========================================================================
// DCF properties
// ===========================================================================

fn inputs(total_cost: f64, months: u32) -> ProjectionInputs {
    ProjectionInputs {
        investment: 100_000.0,
        total_cost,
        drivers: RevenueDrivers {
            roi_potential: 2.5,
            growth_rate: 0.25,
            efficiency: 1.05,
        },
        operating_cost_ratio: 0.30,
        tax_rate: 0.25,
        timeline_months: months,
    }
}

#[test]
fn test_irr_zeroes_npv() {
    let shape = ProjectionConfig::default();
    let projector = CashFlowProjector::new(&shape);

    for (cost, months) in [(111_000.0, 11), (150_000.0, 24), (300_000.0, 60), (90_000.0, 3)] {
        let series = projector.project(&inputs(cost, months));
        let flows = series.flows();
        let solution = dcf::irr(&flows, dcf::monthly_rate(0.095)).unwrap();
        let residual = dcf::npv(solution.rate, &flows).unwrap();
        assert!(
            residual.abs() <= 1e-6 * series.initial_outlay,
            "NPV at IRR was {residual} for cost {cost}"
        );
    }
}

#[test]
fn test_payback_is_monotone_in_cost() {
    let shape = ProjectionConfig::default();
    let projector = CashFlowProjector::new(&shape);

    let rank = |p: Payback| p.month().unwrap_or(u32::MAX);
    let mut previous = 0;
    for step in 0..60 {
        let cost = 20_000.0 + step as f64 * 5_000.0;
        let series = projector.project(&inputs(cost, 24));
        let month = rank(dcf::payback_period(&series.flows()));
        assert!(month >= previous, "payback fell from {previous} to {month} at cost {cost}");
        previous = month;
    }
}

// ===========================================================================
// Monte Carlo coverage
// ===========================================================================

#[test]
fn test_mean_roi_inside_interval_across_runs() {
    let req = CalculationRequest {
        company_size: "medium".into(),
        project_type: "product_development".into(),
        target_industry: "fintech".into(),
        investment: Some(dec!(100000)),
        ..Default::default()
    };
    let runs = 20;
    let inside = (0..runs)
        .filter(|seed| {
            let sim = engine(1000, *seed).compute(&req).unwrap().simulation;
            sim.roi_pct.interval.contains(&sim.roi_pct.mean)
        })
        .count();
    assert!(inside * 100 >= runs as usize * 95, "mean inside in {inside}/{runs} runs");
}
