//! Read-only reference data: company sizes, industries and project types.
//!
//! A [`ProfileCatalog`] is constructed once (from [`ProfileCatalog::default`]
//! or deserialized from a catalog file) and handed to the resolver and engine
//! by reference. Construction validates every profile; lookups are plain map
//! reads, so a catalog can be shared across threads without locking.

pub mod defaults;
pub mod profiles;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CalculationError;
use crate::types::Currency;

pub use profiles::{
    CatalogId, CompanyProfile, CompanySize, ComplexityTier, Industry, IndustryProfile, MarketSize,
    ProjectType, ProjectTypeProfile, RegulatoryTier,
};

/// Serialized form of a catalog, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    /// Currency the base costs and budgets are quoted in
    #[serde(default)]
    pub currency: Currency,
    pub company_sizes: BTreeMap<CompanySize, CompanyProfile>,
    pub industries: BTreeMap<Industry, IndustryProfile>,
    pub project_types: BTreeMap<ProjectType, ProjectTypeProfile>,
}

/// Validated profile lookup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct ProfileCatalog {
    currency: Currency,
    company_sizes: BTreeMap<CompanySize, CompanyProfile>,
    industries: BTreeMap<Industry, IndustryProfile>,
    project_types: BTreeMap<ProjectType, ProjectTypeProfile>,
}

impl ProfileCatalog {
    pub fn new(data: CatalogData) -> Result<Self, CalculationError> {
        for (size, p) in &data.company_sizes {
            let field = format!("company_sizes.{size}");
            check_positive(&field, "cost_multiplier", p.cost_multiplier)?;
            check_positive(&field, "efficiency_factor", p.efficiency_factor)?;
            check_positive(&field, "timeline_factor", p.timeline_factor)?;
            check_unit(&field, "risk_factor", p.risk_factor)?;
            check_unit(&field, "tax_rate", p.tax_rate)?;
            if p.min_budget < 0.0 || p.max_budget < p.min_budget {
                return Err(invalid(&field, "budget range must satisfy 0 <= min <= max"));
            }
        }
        for (industry, p) in &data.industries {
            let field = format!("industries.{industry}");
            check_unit(&field, "growth_rate", p.growth_rate)?;
            check_unit(&field, "risk_factor", p.risk_factor)?;
            check_unit(&field, "volatility", p.volatility)?;
        }
        for (project, p) in &data.project_types {
            let field = format!("project_types.{project}");
            check_positive(&field, "base_cost", p.base_cost)?;
            check_positive(&field, "roi_potential", p.roi_potential)?;
            check_unit(&field, "risk_level", p.risk_level)?;
            check_unit(&field, "operating_cost_ratio", p.operating_cost_ratio)?;
            if p.operating_cost_ratio >= 1.0 {
                return Err(invalid(&field, "operating_cost_ratio must be below 1"));
            }
            if !(1..=120).contains(&p.timeline_months) {
                return Err(invalid(&field, "timeline_months must be within 1..=120"));
            }
        }

        Ok(ProfileCatalog {
            currency: data.currency,
            company_sizes: data.company_sizes,
            industries: data.industries,
            project_types: data.project_types,
        })
    }

    /// Currency base costs and budgets are quoted in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn company(&self, size: CompanySize) -> Option<&CompanyProfile> {
        self.company_sizes.get(&size)
    }

    pub fn industry(&self, industry: Industry) -> Option<&IndustryProfile> {
        self.industries.get(&industry)
    }

    pub fn project(&self, project: ProjectType) -> Option<&ProjectTypeProfile> {
        self.project_types.get(&project)
    }

    pub fn company_sizes(&self) -> impl Iterator<Item = (&CompanySize, &CompanyProfile)> {
        self.company_sizes.iter()
    }

    pub fn industries(&self) -> impl Iterator<Item = (&Industry, &IndustryProfile)> {
        self.industries.iter()
    }

    pub fn project_types(&self) -> impl Iterator<Item = (&ProjectType, &ProjectTypeProfile)> {
        self.project_types.iter()
    }
}

impl TryFrom<CatalogData> for ProfileCatalog {
    type Error = CalculationError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        ProfileCatalog::new(data)
    }
}

impl From<ProfileCatalog> for CatalogData {
    fn from(catalog: ProfileCatalog) -> Self {
        CatalogData {
            currency: catalog.currency,
            company_sizes: catalog.company_sizes,
            industries: catalog.industries,
            project_types: catalog.project_types,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn invalid(field: &str, reason: &str) -> CalculationError {
    CalculationError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn check_positive(field: &str, name: &str, value: f64) -> Result<(), CalculationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(
            &format!("{field}.{name}"),
            &format!("must be positive, got {value}"),
        ))
    }
}

fn check_unit(field: &str, name: &str, value: f64) -> Result<(), CalculationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            &format!("{field}.{name}"),
            &format!("must be within [0, 1], got {value}"),
        ))
    }
}
