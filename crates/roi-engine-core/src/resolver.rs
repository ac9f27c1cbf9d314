//! Request validation and profile resolution.
//!
//! The resolver checks every field of a [`CalculationRequest`] and reports all
//! violations together. A request that passes becomes an immutable
//! [`CalculationContext`], the only input downstream components read.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{
    CatalogId, CompanyProfile, CompanySize, Industry, IndustryProfile, ProfileCatalog,
    ProjectType, ProjectTypeProfile,
};
use crate::cost_model;
use crate::currency::RateTable;
use crate::error::{ValidationError, ViolationCode, Violations};
use crate::types::Currency;

pub const MIN_INVESTMENT: Decimal = dec!(1000);
pub const MAX_INVESTMENT: Decimal = dec!(50000000);
pub const MIN_TIMELINE_MONTHS: u32 = 1;
pub const MAX_TIMELINE_MONTHS: u32 = 120;
pub const DEFAULT_COMPANY_NAME: &str = "Your Company";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
/// Budgets above this multiple of a size class's typical maximum are flagged.
const BUDGET_CEILING_MULTIPLE: f64 = 5.0;

/// Raw request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(default)]
    pub company_name: String,
    pub company_size: String,
    /// Industry the company operates in today; defaults to the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_industry: Option<String>,
    pub project_type: String,
    pub target_industry: String,
    /// ISO code; empty means USD
    #[serde(default)]
    pub currency: String,
    /// Investment envelope in `currency`; defaults to the estimated project cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment: Option<Decimal>,
    /// Revenue horizon; defaults to the project's baseline timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_months: Option<u32>,
    /// Labels monthly periods with calendar month ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Currency to report figures in, when different from `currency`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rates: Option<RateTable>,
}

/// Validated, fully typed unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationContext {
    pub company_name: String,
    pub company_size: CompanySize,
    pub company: CompanyProfile,
    pub current_industry: Industry,
    pub target_industry: Industry,
    pub industry: IndustryProfile,
    pub project_type: ProjectType,
    pub project: ProjectTypeProfile,
    pub currency: Currency,
    pub report_currency: Currency,
    /// Investment envelope in `currency`
    pub investment: f64,
    pub investment_overridden: bool,
    pub timeline_months: u32,
    pub timeline_overridden: bool,
    /// Multiply catalog amounts by this to express them in `currency`; `None`
    /// when the request is in another currency and no rate was supplied
    pub catalog_rate: Option<f64>,
    pub start_date: Option<NaiveDate>,
    #[serde(skip)]
    pub exchange_rates: Option<RateTable>,
    pub warnings: Vec<String>,
}

impl CalculationContext {
    /// Whether the company is moving into a different industry.
    pub fn is_new_market(&self) -> bool {
        self.current_industry != self.target_industry
    }

    /// Investment expressed in catalog currency, at face value without a rate.
    pub fn investment_in_catalog_currency(&self) -> f64 {
        self.catalog_rate
            .map_or(self.investment, |rate| self.investment / rate)
    }
}

pub struct ParameterResolver<'a> {
    catalog: &'a ProfileCatalog,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(catalog: &'a ProfileCatalog) -> Self {
        ParameterResolver { catalog }
    }

    pub fn resolve(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationContext, ValidationError> {
        let mut violations = Violations::default();

        let company_name = validate_company_name(&request.company_name, &mut violations);

        let company_size =
            self.lookup::<CompanySize>("company_size", &request.company_size, &mut violations);
        let company = company_size.and_then(|s| self.catalog.company(s));
        if let (Some(size), None) = (company_size, company) {
            missing_profile(&mut violations, "company_size", size);
        }

        let target_industry =
            self.lookup::<Industry>("target_industry", &request.target_industry, &mut violations);
        let industry = target_industry.and_then(|i| self.catalog.industry(i));
        if let (Some(id), None) = (target_industry, industry) {
            missing_profile(&mut violations, "target_industry", id);
        }

        let current_industry = match request.current_industry.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let id = self.lookup::<Industry>("current_industry", raw, &mut violations);
                if let Some(id) = id {
                    if self.catalog.industry(id).is_none() {
                        missing_profile(&mut violations, "current_industry", id);
                    }
                }
                id
            }
            _ => target_industry,
        };

        let project_type =
            self.lookup::<ProjectType>("project_type", &request.project_type, &mut violations);
        let project = project_type.and_then(|p| self.catalog.project(p));
        if let (Some(id), None) = (project_type, project) {
            missing_profile(&mut violations, "project_type", id);
        }

        let currency = parse_currency("currency", &request.currency, &mut violations);
        let report_currency = match request.report_currency.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                parse_currency("report_currency", raw, &mut violations)
            }
            _ => currency,
        };

        if let Some(rates) = &request.exchange_rates {
            for (code, rate) in &rates.rates {
                if rate.is_sign_negative() || rate.is_zero() {
                    violations.push(
                        "exchange_rates",
                        ViolationCode::OutOfRange,
                        format!("rate for {code} must be positive, got {rate}"),
                    );
                }
            }
        }

        let rates = request.exchange_rates.as_ref();
        let catalog_currency = self.catalog.currency();
        let catalog_rate = currency.and_then(|c| lookup_rate(catalog_currency, c, rates));
        if let (Some(from), Some(to)) = (currency, report_currency) {
            if from != to && lookup_rate(from, to, rates).is_none() {
                violations.push(
                    "exchange_rates",
                    ViolationCode::Required,
                    format!("a rate table covering {from} and {to} is required"),
                );
            }
        }

        let investment = match request.investment {
            Some(amount) => {
                check_investment_bounds(amount, catalog_rate, catalog_currency, &mut violations);
                amount.to_f64()
            }
            None => {
                if let (Some(c), None) = (currency, catalog_rate) {
                    violations.push(
                        "investment",
                        ViolationCode::Required,
                        format!(
                            "is required for {c} requests without an exchange rate against \
                             {catalog_currency}"
                        ),
                    );
                }
                None
            }
        };

        let timeline = match request.timeline_months {
            Some(months) if !(MIN_TIMELINE_MONTHS..=MAX_TIMELINE_MONTHS).contains(&months) => {
                violations.push(
                    "timeline_months",
                    ViolationCode::OutOfRange,
                    format!(
                        "must be within {MIN_TIMELINE_MONTHS}..={MAX_TIMELINE_MONTHS}, got {months}"
                    ),
                );
                None
            }
            other => other,
        };

        violations.into_result()?;

        // Every lookup succeeded once the violation list is empty.
        let (
            Some(company_size),
            Some(company),
            Some(target_industry),
            Some(industry),
            Some(current_industry),
            Some(project_type),
            Some(project),
            Some(currency),
            Some(report_currency),
        ) = (
            company_size,
            company,
            target_industry,
            industry,
            current_industry,
            project_type,
            project,
            currency,
            report_currency,
        )
        else {
            return Err(unresolved());
        };
        let catalog_rate = catalog_rate.and_then(|r| r.to_f64());

        let mut warnings = Vec::new();

        let investment_overridden = investment.is_some();
        let investment = match (investment, catalog_rate) {
            (Some(amount), _) => amount,
            (None, Some(rate)) => {
                let estimate = cost_model::estimated_cost(project, company, industry) * rate;
                let min = MIN_INVESTMENT.to_f64().unwrap_or(1_000.0) * rate;
                let max = MAX_INVESTMENT.to_f64().unwrap_or(50_000_000.0) * rate;
                if estimate < min || estimate > max {
                    warnings.push(format!(
                        "Estimated project cost {estimate:.2} {currency} is outside the accepted \
                         investment range and was clamped"
                    ));
                }
                estimate.clamp(min, max)
            }
            // Reported as an `investment` violation above.
            (None, None) => return Err(unresolved()),
        };

        let timeline_overridden = timeline.is_some();
        let timeline_months = timeline.unwrap_or_else(|| {
            let scaled = (project.timeline_months as f64 * company.timeline_factor).round();
            (scaled as u32).clamp(MIN_TIMELINE_MONTHS, MAX_TIMELINE_MONTHS)
        });

        match catalog_rate {
            Some(rate) => {
                let budget = investment / rate;
                if budget < company.min_budget {
                    warnings.push(format!(
                        "Investment is below the typical minimum budget for a {company_size} \
                         company ({:.0} {catalog_currency})",
                        company.min_budget
                    ));
                } else if budget > company.max_budget * BUDGET_CEILING_MULTIPLE {
                    warnings.push(format!(
                        "Investment is far above the typical budget for a {company_size} \
                         company ({:.0} {catalog_currency} maximum)",
                        company.max_budget
                    ));
                }
            }
            None => warnings.push(format!(
                "No {catalog_currency}/{currency} exchange rate supplied: the catalog cost \
                 estimate and budget check are skipped, and investment bounds and cost brackets \
                 use the {currency} amount at face value"
            )),
        }

        debug!(
            %company_size,
            %target_industry,
            %project_type,
            investment,
            timeline_months,
            "request resolved"
        );

        Ok(CalculationContext {
            company_name,
            company_size,
            company: company.clone(),
            current_industry,
            target_industry,
            industry: industry.clone(),
            project_type,
            project: project.clone(),
            currency,
            report_currency,
            investment,
            investment_overridden,
            timeline_months,
            timeline_overridden,
            catalog_rate,
            start_date: request.start_date,
            exchange_rates: request.exchange_rates.clone(),
            warnings,
        })
    }

    fn lookup<T: CatalogId + std::fmt::Display>(
        &self,
        field: &str,
        raw: &str,
        violations: &mut Violations,
    ) -> Option<T> {
        if raw.trim().is_empty() {
            violations.push(field, ViolationCode::Required, "is required");
            return None;
        }
        let found = T::parse_id(raw);
        if found.is_none() {
            let known: Vec<&str> = T::all().iter().map(|v| v.id()).collect();
            violations.push(
                field,
                ViolationCode::UnknownId,
                format!("unknown id '{}'; expected one of {}", raw.trim(), known.join(", ")),
            );
        }
        found
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn missing_profile(violations: &mut Violations, field: &str, id: impl std::fmt::Display) {
    violations.push(
        field,
        ViolationCode::UnknownId,
        format!("'{id}' has no profile in the catalog"),
    );
}

fn validate_company_name(raw: &str, violations: &mut Violations) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return DEFAULT_COMPANY_NAME.to_string();
    }
    let chars = name.chars().count();
    if chars < NAME_MIN_CHARS {
        violations.push(
            "company_name",
            ViolationCode::TooShort,
            format!("must be at least {NAME_MIN_CHARS} characters"),
        );
    } else if chars > NAME_MAX_CHARS {
        violations.push(
            "company_name",
            ViolationCode::TooLong,
            format!("must be at most {NAME_MAX_CHARS} characters"),
        );
    }
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '.' | ',' | '&' | '\'' | '"')
    };
    if !name.chars().all(allowed) {
        violations.push(
            "company_name",
            ViolationCode::InvalidCharacters,
            "may only contain letters, digits, spaces and - . , & ' \"",
        );
    }
    name.to_string()
}

fn parse_currency(field: &str, raw: &str, violations: &mut Violations) -> Option<Currency> {
    if raw.trim().is_empty() {
        return Some(Currency::default());
    }
    match raw.parse::<Currency>() {
        Ok(c) => Some(c),
        Err(reason) => {
            violations.push(field, ViolationCode::Unsupported, reason);
            None
        }
    }
}

fn unresolved() -> ValidationError {
    ValidationError {
        violations: vec![crate::error::FieldViolation {
            field: "request".into(),
            code: ViolationCode::Required,
            message: "request could not be resolved".into(),
        }],
    }
}

/// Units of `to` per unit of `from`, when known.
fn lookup_rate(from: Currency, to: Currency, rates: Option<&RateTable>) -> Option<Decimal> {
    if from == to {
        return Some(Decimal::ONE);
    }
    rates.and_then(|table| table.cross_rate(from, to).ok())
}

/// Bounds are in catalog currency. Without a rate the amount is compared at face value.
fn check_investment_bounds(
    amount: Decimal,
    catalog_rate: Option<Decimal>,
    catalog_currency: Currency,
    violations: &mut Violations,
) {
    let in_catalog = catalog_rate
        .and_then(|rate| amount.checked_div(rate))
        .unwrap_or(amount);
    if in_catalog < MIN_INVESTMENT {
        violations.push(
            "investment",
            ViolationCode::OutOfRange,
            format!(
                "must be at least {MIN_INVESTMENT} {catalog_currency}, got {} {catalog_currency}",
                in_catalog.round_dp(2)
            ),
        );
    } else if in_catalog > MAX_INVESTMENT {
        violations.push(
            "investment",
            ViolationCode::OutOfRange,
            format!(
                "must be at most {MAX_INVESTMENT} {catalog_currency}, got {} {catalog_currency}",
                in_catalog.round_dp(2)
            ),
        );
    }
}
