use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use roi_engine_core::currency::RateTable;
use roi_engine_core::{CalculationRequest, RoiEngine};

use crate::input;

/// Arguments describing one calculation request
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Path to a JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Company name shown in the report
    #[arg(long)]
    pub company_name: Option<String>,

    /// Company size: startup, small, medium, enterprise
    #[arg(long)]
    pub company_size: Option<String>,

    /// Project type (e.g. product_development, ai_integration)
    #[arg(long)]
    pub project_type: Option<String>,

    /// Industry the project targets (e.g. fintech, saas)
    #[arg(long)]
    pub target_industry: Option<String>,

    /// Industry the company operates in today (defaults to the target)
    #[arg(long)]
    pub current_industry: Option<String>,

    /// ISO currency code of the investment
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Investment envelope (defaults to the estimated project cost)
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// Revenue horizon in months (defaults to the project baseline)
    #[arg(long)]
    pub timeline_months: Option<u32>,

    /// Project start date (YYYY-MM-DD) used to label monthly periods
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Currency to report figures in
    #[arg(long)]
    pub report_currency: Option<String>,

    /// Exchange-rate table file (JSON or YAML)
    #[arg(long)]
    pub rates: Option<String>,
}

fn load_request(args: RequestArgs) -> Result<CalculationRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_document(path);
    }
    if let Some(request) = input::stdin::read_stdin()? {
        return Ok(request);
    }

    let exchange_rates: Option<RateTable> = match args.rates {
        Some(ref path) => Some(input::file::read_document(path)?),
        None => None,
    };

    // Missing identifiers are left blank so validation reports all of them.
    Ok(CalculationRequest {
        company_name: args.company_name.unwrap_or_default(),
        company_size: args.company_size.unwrap_or_default(),
        current_industry: args.current_industry,
        project_type: args.project_type.unwrap_or_default(),
        target_industry: args.target_industry.unwrap_or_default(),
        currency: args.currency,
        investment: args.investment,
        timeline_months: args.timeline_months,
        start_date: args.start_date,
        report_currency: args.report_currency,
        exchange_rates,
    })
}

pub fn run_compute(engine: &RoiEngine, args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(args)?;
    let output = engine.compute_with_metadata(&request)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_validate(engine: &RoiEngine, args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(args)?;
    let value = match engine.validate(&request) {
        Ok(ctx) => json!({
            "valid": true,
            "result": ctx,
            "warnings": ctx.warnings,
        }),
        Err(err) => json!({
            "valid": false,
            "results": err.violations,
        }),
    };
    Ok(value)
}

pub fn run_simulate(engine: &RoiEngine, args: RequestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(args)?;
    let result = engine.compute(&request)?;
    Ok(json!({
        "result": result.simulation,
        "warnings": result.warnings,
        "methodology": "Monte Carlo over cost, revenue and timeline variance",
    }))
}

pub fn run_sensitivity(
    engine: &RoiEngine,
    args: RequestArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = load_request(args)?;
    let report = engine.compute(&request)?.sensitivity;

    let rows: Vec<Value> = report
        .drivers
        .iter()
        .flat_map(|d| {
            d.points.iter().map(move |p| {
                json!({
                    "driver": d.driver,
                    "change_pct": p.change_pct,
                    "roi_pct": p.roi_pct,
                    "swing": d.swing,
                })
            })
        })
        .collect();

    Ok(json!({
        "base_roi_pct": report.base_roi_pct,
        "results": rows,
    }))
}
