//! Built-in reference profiles, quoted in USD.
//!
//! Overrun and operating-cost defaults are tuned so that positive realistic
//! ROI dominates across size × project × industry combinations.

use std::collections::BTreeMap;

use super::profiles::*;
use super::ProfileCatalog;
use crate::types::Currency;

impl Default for ProfileCatalog {
    fn default() -> Self {
        ProfileCatalog {
            currency: Currency::USD,
            company_sizes: company_sizes(),
            industries: industries(),
            project_types: project_types(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn company(
    cost_multiplier: f64,
    efficiency_factor: f64,
    risk_factor: f64,
    tax_rate: f64,
    timeline_factor: f64,
    min_budget: f64,
    max_budget: f64,
    typical_team_size: u32,
) -> CompanyProfile {
    CompanyProfile {
        cost_multiplier,
        efficiency_factor,
        risk_factor,
        tax_rate,
        timeline_factor,
        min_budget,
        max_budget,
        typical_team_size,
    }
}

fn company_sizes() -> BTreeMap<CompanySize, CompanyProfile> {
    BTreeMap::from([
        (
            CompanySize::Startup,
            company(0.7, 0.95, 0.30, 0.15, 1.2, 5_000.0, 100_000.0, 5),
        ),
        (
            CompanySize::Small,
            company(1.0, 1.00, 0.20, 0.20, 1.0, 25_000.0, 500_000.0, 15),
        ),
        (
            CompanySize::Medium,
            company(1.5, 1.05, 0.15, 0.25, 0.9, 100_000.0, 2_000_000.0, 50),
        ),
        (
            CompanySize::Enterprise,
            company(2.5, 1.10, 0.10, 0.30, 0.8, 500_000.0, 10_000_000.0, 200),
        ),
    ])
}

fn industry(
    growth_rate: f64,
    risk_factor: f64,
    market_size: MarketSize,
    volatility: f64,
    regulatory: RegulatoryTier,
) -> IndustryProfile {
    IndustryProfile {
        growth_rate,
        risk_factor,
        market_size,
        volatility,
        regulatory,
    }
}

fn industries() -> BTreeMap<Industry, IndustryProfile> {
    use MarketSize as M;
    use RegulatoryTier as R;

    BTreeMap::from([
        (Industry::Fintech, industry(0.25, 0.15, M::Large, 0.20, R::High)),
        (Industry::Healthtech, industry(0.30, 0.20, M::Huge, 0.15, R::VeryHigh)),
        (Industry::Edtech, industry(0.22, 0.12, M::Large, 0.18, R::Medium)),
        (Industry::Ecommerce, industry(0.18, 0.08, M::Massive, 0.12, R::Low)),
        (Industry::Saas, industry(0.35, 0.18, M::Large, 0.22, R::Medium)),
        (Industry::Gaming, industry(0.20, 0.25, M::Medium, 0.30, R::Medium)),
        (Industry::RealEstate, industry(0.15, 0.10, M::Stable, 0.08, R::High)),
        (Industry::FoodBeverage, industry(0.12, 0.15, M::Medium, 0.10, R::High)),
        (Industry::Manufacturing, industry(0.10, 0.08, M::Large, 0.06, R::High)),
        (Industry::Logistics, industry(0.16, 0.12, M::Large, 0.14, R::Medium)),
        (Industry::Crypto, industry(0.45, 0.40, M::Volatile, 0.50, R::VeryHigh)),
        (Industry::Nft, industry(0.35, 0.45, M::Emerging, 0.60, R::VeryHigh)),
        (Industry::Web3, industry(0.40, 0.35, M::Growing, 0.40, R::High)),
        (Industry::Sustainability, industry(0.28, 0.18, M::Expanding, 0.16, R::Medium)),
        (Industry::Biotech, industry(0.32, 0.25, M::Specialized, 0.28, R::VeryHigh)),
    ])
}

fn project(
    base_cost: f64,
    timeline_months: u32,
    complexity: ComplexityTier,
    roi_potential: f64,
    risk_level: f64,
    operating_cost_ratio: f64,
    skills: &[&str],
) -> ProjectTypeProfile {
    ProjectTypeProfile {
        base_cost,
        timeline_months,
        complexity,
        roi_potential,
        risk_level,
        operating_cost_ratio,
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

fn project_types() -> BTreeMap<ProjectType, ProjectTypeProfile> {
    use ComplexityTier as C;
    use ProjectType as P;

    BTreeMap::from([
        (
            P::ProductDevelopment,
            project(150_000.0, 12, C::High, 2.5, 0.20, 0.30,
                &["Product Management", "Software Development", "UX Design", "QA"]),
        ),
        (
            P::DigitalTransformation,
            project(200_000.0, 18, C::VeryHigh, 3.0, 0.15, 0.32,
                &["Change Management", "Cloud Architecture", "Data Engineering", "Process Design"]),
        ),
        (
            P::MarketExpansion,
            project(100_000.0, 8, C::Medium, 2.0, 0.18, 0.30,
                &["Market Research", "Sales", "Localization", "Partnerships"]),
        ),
        (
            P::TechUpgrade,
            project(80_000.0, 6, C::Medium, 1.8, 0.12, 0.25,
                &["Systems Architecture", "DevOps", "Integration"]),
        ),
        (
            P::MarketingCampaign,
            project(50_000.0, 4, C::Low, 1.5, 0.15, 0.25,
                &["Digital Marketing", "Content", "Analytics"]),
        ),
        (
            P::EcommercePlatform,
            project(120_000.0, 10, C::High, 2.2, 0.16, 0.30,
                &["Web Development", "Payments", "Logistics Integration"]),
        ),
        (
            P::MobileApp,
            project(90_000.0, 8, C::High, 2.0, 0.18, 0.32,
                &["iOS", "Android", "Mobile UX", "API Development"]),
        ),
        (
            P::AiIntegration,
            project(180_000.0, 14, C::VeryHigh, 2.8, 0.22, 0.33,
                &["Machine Learning", "Data Engineering", "MLOps"]),
        ),
        (
            P::BlockchainPlatform,
            project(250_000.0, 16, C::VeryHigh, 3.5, 0.35, 0.38,
                &["Smart Contracts", "Cryptography", "Distributed Systems"]),
        ),
        (
            P::IotSolution,
            project(160_000.0, 12, C::High, 2.3, 0.20, 0.32,
                &["Embedded Systems", "Connectivity", "Cloud Platforms"]),
        ),
        (
            P::DataAnalytics,
            project(140_000.0, 10, C::High, 2.4, 0.17, 0.28,
                &["Data Engineering", "BI", "Statistics"]),
        ),
        (
            P::SubscriptionService,
            project(75_000.0, 6, C::Medium, 2.1, 0.14, 0.28,
                &["Billing", "Customer Success", "Web Development"]),
        ),
        (
            P::AutomationSystem,
            project(110_000.0, 9, C::High, 2.6, 0.13, 0.24,
                &["Process Automation", "Integration", "QA"]),
        ),
        (
            P::CybersecurityUpgrade,
            project(95_000.0, 7, C::Medium, 1.9, 0.08, 0.22,
                &["Security Engineering", "Compliance", "Incident Response"]),
        ),
        (
            P::CloudMigration,
            project(130_000.0, 11, C::High, 2.2, 0.11, 0.26,
                &["Cloud Architecture", "DevOps", "Data Migration"]),
        ),
    ])
}
