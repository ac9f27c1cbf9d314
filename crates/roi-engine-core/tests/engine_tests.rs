use pretty_assertions::assert_eq;
use roi_engine_core::catalog::{CatalogData, ProjectType};
use roi_engine_core::config::SimulationConfig;
use roi_engine_core::dcf::Payback;
use roi_engine_core::error::ViolationCode;
use roi_engine_core::result::IrrOutcome;
use roi_engine_core::risk::RiskCategory;
use roi_engine_core::{
    CalculationRequest, Currency, EngineConfig, EngineError, ProfileCatalog, RoiEngine,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn engine_with(trials: u32, seed: Option<u64>) -> RoiEngine {
    let config = EngineConfig {
        simulation: SimulationConfig {
            trials,
            seed,
            ..Default::default()
        },
        ..Default::default()
    };
    RoiEngine::new(ProfileCatalog::default(), config).unwrap()
}

fn baseline() -> CalculationRequest {
    CalculationRequest {
        company_name: "Northwind Payments".into(),
        company_size: "medium".into(),
        project_type: "product_development".into(),
        target_industry: "fintech".into(),
        currency: "USD".into(),
        investment: Some(dec!(100000)),
        ..Default::default()
    }
}

// ===========================================================================
// Baseline scenario
// ===========================================================================

#[test]
fn test_baseline_profile() {
    let result = engine_with(1000, Some(42)).compute(&baseline()).unwrap();

    assert!(result.roi_pct > Decimal::ZERO, "ROI was {}", result.roi_pct);
    assert!(result.scenarios.realistic.roi_pct > Decimal::ZERO);
    assert_eq!(result.timeline_months, 11);
    assert_eq!(result.cash_flows.len(), 11);

    let month = result.payback.month().expect("baseline pays back");
    assert!(month <= result.timeline_months + 12);

    assert_ne!(result.risk.category, RiskCategory::Critical);
    assert_eq!(result.risk.score, dec!(40.58));

    // 0.08 + 0.15 × 0.10
    assert_eq!(result.discount_rate, dec!(0.095));
    assert!(result.irr.is_defined());
    assert!(result.npv > Decimal::ZERO);
}

#[test]
fn test_baseline_cost_breakdown() {
    let result = engine_with(200, Some(1)).compute(&baseline()).unwrap();
    let cost = &result.cost;

    // High complexity (0.22) at the 100k–1M bracket (1.0)
    assert_eq!(cost.overrun_fraction, dec!(0.22));
    assert_eq!(cost.planned_cost, dec!(100000.00));
    assert_eq!(cost.contingency, dec!(11000.00));
    assert_eq!(cost.total_cost, dec!(111000.00));
    assert_eq!(cost.confidence_interval.lower, dec!(100000.00));
    assert_eq!(cost.confidence_interval.upper, dec!(122000.00));
    assert_eq!(cost.confidence_interval.level, dec!(0.95));
    // 150,000 × 1.5 × 1.08
    assert_eq!(cost.estimated_cost, Some(dec!(243000.00)));
    assert_eq!(cost.multipliers.len(), 2);
}

#[test]
fn test_cash_flows_reconcile_with_totals() {
    let result = engine_with(200, Some(3)).compute(&baseline()).unwrap();
    let last = result.cash_flows.last().unwrap();
    assert!((last.cumulative - result.net_profit).abs() <= dec!(0.01));

    let revenue: Decimal = result.cash_flows.iter().map(|m| m.revenue).sum();
    assert!((revenue - result.projected_revenue).abs() <= dec!(0.11));

    let months: Vec<u32> = result.cash_flows.iter().map(|m| m.month).collect();
    assert_eq!(months, (1..=11).collect::<Vec<_>>());
}

#[test]
fn test_start_date_labels_periods() {
    let mut req = baseline();
    req.start_date = chrono::NaiveDate::from_ymd_opt(2026, 1, 15);
    let result = engine_with(200, Some(3)).compute(&req).unwrap();
    assert_eq!(
        result.cash_flows[0].period_end,
        chrono::NaiveDate::from_ymd_opt(2026, 1, 31)
    );
    assert_eq!(
        result.cash_flows[1].period_end,
        chrono::NaiveDate::from_ymd_opt(2026, 2, 28)
    );
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn test_same_seed_is_bit_identical() {
    let engine = engine_with(1000, None);
    let a = engine.compute_seeded(&baseline(), 2024).unwrap();
    let b = engine.compute_seeded(&baseline(), 2024).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_injected_rng_is_reproducible() {
    let engine = engine_with(500, None);
    let mut rng_a = ChaCha8Rng::seed_from_u64(11);
    let mut rng_b = ChaCha8Rng::seed_from_u64(11);
    let a = engine.compute_with_rng(&baseline(), &mut rng_a).unwrap();
    let b = engine.compute_with_rng(&baseline(), &mut rng_b).unwrap();
    assert_eq!(a.simulation, b.simulation);
}

#[test]
fn test_unseeded_runs_differ() {
    let engine = engine_with(500, None);
    let a = engine.compute(&baseline()).unwrap();
    let b = engine.compute(&baseline()).unwrap();
    assert_ne!(a.simulation.seed, b.simulation.seed);
    // Deterministic parts do not depend on the seed.
    assert_eq!(a.roi_pct, b.roi_pct);
    assert_eq!(a.risk, b.risk);
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_boundaries_are_inclusive() {
    let engine = engine_with(100, Some(5));

    let mut req = baseline();
    req.investment = Some(dec!(50000000));
    req.timeline_months = Some(120);
    assert!(engine.validate(&req).is_ok());

    req.investment = Some(dec!(1000));
    req.timeline_months = Some(1);
    assert!(engine.validate(&req).is_ok());

    req.investment = Some(dec!(50000001));
    req.timeline_months = Some(121);
    let err = engine.validate(&req).unwrap_err();
    assert!(err.has_field("investment"));
    assert!(err.has_field("timeline_months"));

    req.investment = Some(dec!(999));
    req.timeline_months = Some(0);
    let err = engine.validate(&req).unwrap_err();
    assert_eq!(err.violations.len(), 2);
}

#[test]
fn test_every_violation_is_reported() {
    let req = CalculationRequest {
        company_name: "x".into(),
        company_size: "galactic".into(),
        project_type: "time_machine".into(),
        target_industry: "alchemy".into(),
        currency: "XYZ".into(),
        investment: Some(dec!(10)),
        timeline_months: Some(500),
        ..Default::default()
    };
    match engine_with(100, Some(1)).compute(&req) {
        Err(EngineError::Validation(err)) => {
            for field in [
                "company_name",
                "company_size",
                "project_type",
                "target_industry",
                "currency",
                "investment",
                "timeline_months",
            ] {
                assert!(err.has_field(field), "missing violation for {field}");
            }
            assert!(err
                .violations
                .iter()
                .any(|v| v.code == ViolationCode::UnknownId));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ===========================================================================
// Partial success
// ===========================================================================

fn unprofitable_engine() -> RoiEngine {
    let mut data = CatalogData::from(ProfileCatalog::default());
    if let Some(p) = data.project_types.get_mut(&ProjectType::MarketingCampaign) {
        p.roi_potential = 0.01;
    }
    let catalog = ProfileCatalog::new(data).unwrap();
    let config = EngineConfig {
        simulation: SimulationConfig {
            trials: 100,
            seed: Some(9),
            ..Default::default()
        },
        ..Default::default()
    };
    RoiEngine::new(catalog, config).unwrap()
}

#[test]
fn test_undefined_irr_keeps_other_figures() {
    let req = CalculationRequest {
        company_size: "small".into(),
        project_type: "marketing_campaign".into(),
        target_industry: "ecommerce".into(),
        investment: Some(dec!(50000)),
        timeline_months: Some(1),
        ..Default::default()
    };
    let result = unprofitable_engine().compute(&req).unwrap();

    match &result.irr {
        IrrOutcome::Undefined { reason } => assert!(!reason.is_empty()),
        other => panic!("expected undefined IRR, got {other:?}"),
    }
    assert_eq!(result.irr.annual_rate(), None);
    assert!(result.warnings.iter().any(|w| w.contains("IRR")));
    assert_eq!(result.payback, Payback::BeyondHorizon);
    assert!(result.roi_pct < Decimal::ZERO);
    assert!(result.npv < Decimal::ZERO);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["irr"]["status"], "undefined");
    assert!(json["irr"].get("annual_rate").is_none());
    assert_eq!(json["payback"]["status"], "beyond_horizon");
}

#[test]
fn test_losses_keep_scenario_order() {
    let req = CalculationRequest {
        company_size: "startup".into(),
        project_type: "marketing_campaign".into(),
        target_industry: "gaming".into(),
        investment: Some(dec!(20000)),
        timeline_months: Some(6),
        ..Default::default()
    };
    let s = unprofitable_engine().compute(&req).unwrap().scenarios;
    assert!(s.realistic.roi_pct < Decimal::ZERO);
    assert!(s.conservative.roi_pct <= s.realistic.roi_pct);
    assert!(s.realistic.roi_pct <= s.optimistic.roi_pct);
}

// ===========================================================================
// Currency
// ===========================================================================

#[test]
fn test_jpy_amounts_have_no_minor_units() {
    let req = CalculationRequest {
        company_size: "small".into(),
        project_type: "mobile_app".into(),
        target_industry: "saas".into(),
        currency: "JPY".into(),
        investment: Some(dec!(15000000)),
        exchange_rates: Some(roi_engine_core::currency::RateTable {
            base: Currency::USD,
            rates: [(Currency::JPY, dec!(150))].into_iter().collect(),
        }),
        ..Default::default()
    };
    let result = engine_with(100, Some(2)).compute(&req).unwrap();
    assert_eq!(result.currency, Currency::JPY);
    assert_eq!(result.cost.total_cost.scale(), 0);
    assert_eq!(result.net_profit.scale(), 0);
    assert!(result
        .cash_flows
        .iter()
        .all(|m| m.net.scale() == 0 && m.cumulative.scale() == 0));
}

#[test]
fn test_foreign_investment_computes_without_rates() {
    let mut req = baseline();
    req.currency = "EUR".into();
    let result = engine_with(100, Some(2)).compute(&req).unwrap();
    let usd = engine_with(100, Some(2)).compute(&baseline()).unwrap();

    assert_eq!(result.currency, Currency::EUR);
    assert_eq!(result.investment, dec!(100000.00));
    assert_eq!(result.cost.estimated_cost, None);
    assert_eq!(result.cost.total_cost, usd.cost.total_cost);
    assert_eq!(result.roi_pct, usd.roi_pct);
    assert!(result.warnings.iter().any(|w| w.contains("exchange rate")));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["cost"].get("estimated_cost").is_none());
}

#[test]
fn test_foreign_default_investment_needs_rates() {
    let mut req = baseline();
    req.currency = "EUR".into();
    req.investment = None;
    let err = engine_with(100, Some(2)).validate(&req).unwrap_err();
    assert!(err.has_field("investment"));
}

#[test]
fn test_yen_bounds_follow_dollar_limits() {
    let engine = engine_with(100, Some(2));
    let mut req = baseline();
    req.company_size = "enterprise".into();
    req.currency = "JPY".into();
    req.exchange_rates = Some(roi_engine_core::currency::RateTable {
        base: Currency::USD,
        rates: [(Currency::JPY, dec!(150))].into_iter().collect(),
    });

    req.investment = Some(dec!(1000000000));
    assert!(engine.validate(&req).is_ok());

    req.investment = Some(dec!(1000));
    assert!(engine.validate(&req).unwrap_err().has_field("investment"));
}
