use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Closed identifier set backed by a stable string id.
pub trait CatalogId: Copy + Sized + 'static {
    fn all() -> &'static [Self];
    fn id(self) -> &'static str;

    /// Lenient lookup: case-insensitive, ignores `_`, `-` and spaces.
    fn parse_id(raw: &str) -> Option<Self> {
        let wanted = normalize_id(raw);
        if wanted.is_empty() {
            return None;
        }
        Self::all()
            .iter()
            .copied()
            .find(|candidate| normalize_id(candidate.id()) == wanted)
    }
}

fn normalize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl CatalogId for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }

            fn id(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

catalog_id!(
    /// Company size class.
    CompanySize {
        Startup => "startup",
        Small => "small",
        Medium => "medium",
        Enterprise => "enterprise",
    }
);

catalog_id!(
    /// Industry a company operates in or is entering.
    Industry {
        Fintech => "fintech",
        Healthtech => "healthtech",
        Edtech => "edtech",
        Ecommerce => "ecommerce",
        Saas => "saas",
        Gaming => "gaming",
        RealEstate => "real_estate",
        FoodBeverage => "food_beverage",
        Manufacturing => "manufacturing",
        Logistics => "logistics",
        Crypto => "crypto",
        Nft => "nft",
        Web3 => "web3",
        Sustainability => "sustainability",
        Biotech => "biotech",
    }
);

catalog_id!(
    /// Kind of project being evaluated.
    ProjectType {
        ProductDevelopment => "product_development",
        DigitalTransformation => "digital_transformation",
        MarketExpansion => "market_expansion",
        TechUpgrade => "tech_upgrade",
        MarketingCampaign => "marketing_campaign",
        EcommercePlatform => "ecommerce_platform",
        MobileApp => "mobile_app",
        AiIntegration => "ai_integration",
        BlockchainPlatform => "blockchain_platform",
        IotSolution => "iot_solution",
        DataAnalytics => "data_analytics",
        SubscriptionService => "subscription_service",
        AutomationSystem => "automation_system",
        CybersecurityUpgrade => "cybersecurity_upgrade",
        CloudMigration => "cloud_migration",
    }
);

catalog_id!(
    /// Delivery complexity of a project type.
    ComplexityTier {
        Low => "low",
        Medium => "medium",
        High => "high",
        VeryHigh => "very_high",
    }
);

catalog_id!(
    /// Regulatory burden of an industry.
    RegulatoryTier {
        Low => "low",
        Medium => "medium",
        High => "high",
        VeryHigh => "very_high",
    }
);

catalog_id!(
    /// Qualitative market size category.
    MarketSize {
        Medium => "medium",
        Large => "large",
        Huge => "huge",
        Massive => "massive",
        Stable => "stable",
        Volatile => "volatile",
        Emerging => "emerging",
        Growing => "growing",
        Expanding => "expanding",
        Specialized => "specialized",
    }
);

impl RegulatoryTier {
    /// Cost overhead of compliance work, as a fraction of the project cost.
    pub fn cost_overhead(self) -> f64 {
        match self {
            RegulatoryTier::Low => 0.02,
            RegulatoryTier::Medium => 0.05,
            RegulatoryTier::High => 0.08,
            RegulatoryTier::VeryHigh => 0.12,
        }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Reference data for a company size class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Cost multiplier applied to project base costs
    pub cost_multiplier: f64,
    /// Execution efficiency applied to delivered revenue
    pub efficiency_factor: f64,
    /// Organisational risk, 0..1
    pub risk_factor: f64,
    /// Effective tax rate on project profit
    pub tax_rate: f64,
    /// Multiplier on the project's baseline timeline
    pub timeline_factor: f64,
    /// Typical lower budget for a company of this size (catalog currency)
    pub min_budget: f64,
    /// Typical upper budget for a company of this size (catalog currency)
    pub max_budget: f64,
    pub typical_team_size: u32,
}

/// Reference data for an industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    /// Annual market growth rate
    pub growth_rate: f64,
    /// Sector risk, 0..1
    pub risk_factor: f64,
    pub market_size: MarketSize,
    /// Market volatility, 0..1
    pub volatility: f64,
    pub regulatory: RegulatoryTier,
}

/// Reference data for a project type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTypeProfile {
    /// Base cost in catalog currency
    pub base_cost: f64,
    /// Baseline delivery and revenue horizon in months
    pub timeline_months: u32,
    pub complexity: ComplexityTier,
    /// Gross revenue per unit of investment before growth and efficiency
    pub roi_potential: f64,
    /// Execution risk, 0..1
    pub risk_level: f64,
    /// Share of revenue consumed by running costs
    pub operating_cost_ratio: f64,
    #[serde(default)]
    pub skills: Vec<String>,
}
