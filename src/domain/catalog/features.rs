//! Static feature matrix of the platform.
//!
//! Plans unlock every feature without an add-on requirement up to their
//! level. Add-on features are only granted by an active add-on.

use crate::domain::value_objects::enums::{
    feature_categories::FeatureCategory, plan_levels::PlanLevel,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub category: FeatureCategory,
    pub required_plan_level: PlanLevel,
    pub required_addon_id: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddonDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub monthly_price: f64,
    pub currency: &'static str,
}

impl AddonDefinition {
    pub fn feature_codes(&self) -> Vec<&'static str> {
        FEATURES
            .iter()
            .filter(|feature| feature.required_addon_id == Some(self.id))
            .map(|feature| feature.code)
            .collect()
    }
}

pub const ADDON_MARKETPLACE: &str = "marketplace_bidding";
pub const ADDON_HR: &str = "hr_suite";
pub const ADDON_MARKETING: &str = "marketing_campaigns";
pub const ADDON_ANALYTICS: &str = "advanced_analytics";

pub const ADDONS: &[AddonDefinition] = &[
    AddonDefinition {
        id: ADDON_MARKETPLACE,
        name: "Provider marketplace & bidding",
        monthly_price: 15000.0,
        currency: "XOF",
    },
    AddonDefinition {
        id: ADDON_HR,
        name: "HR & payroll",
        monthly_price: 10000.0,
        currency: "XOF",
    },
    AddonDefinition {
        id: ADDON_MARKETING,
        name: "Marketing campaigns",
        monthly_price: 12000.0,
        currency: "XOF",
    },
    AddonDefinition {
        id: ADDON_ANALYTICS,
        name: "Advanced analytics",
        monthly_price: 8000.0,
        currency: "XOF",
    },
];

const fn feature(
    code: &'static str,
    name: &'static str,
    category: FeatureCategory,
    required_plan_level: PlanLevel,
    required_addon_id: Option<&'static str>,
) -> FeatureDefinition {
    FeatureDefinition {
        code,
        name,
        category,
        required_plan_level,
        required_addon_id,
    }
}

use FeatureCategory::{Admin, Module, Report, Section};
use PlanLevel::{Enterprise, Professional, Starter};

pub const FEATURES: &[FeatureDefinition] = &[
    feature("packages", "Package tracking", Module, Starter, None),
    feature("cargo", "Cargo tracking", Module, Starter, None),
    feature("quotes", "Freight quotes", Module, Starter, None),
    feature("clients", "Client directory", Section, Starter, None),
    feature("invoices", "Invoices", Section, Starter, None),
    feature("payments", "Payments", Module, Professional, None),
    feature("warehouses", "Warehouse management", Module, Professional, None),
    feature("team_management", "Team management", Admin, Professional, None),
    feature("report_shipments", "Shipment reports", Report, Professional, None),
    feature("report_financial", "Financial reports", Report, Enterprise, None),
    feature("api_access", "API access", Admin, Enterprise, None),
    feature("white_label", "White label branding", Admin, Enterprise, None),
    feature("audit_logs", "Audit logs", Admin, Enterprise, None),
    feature("marketplace", "Provider marketplace", Module, Starter, Some(ADDON_MARKETPLACE)),
    feature("marketplace_bidding", "Marketplace bidding", Section, Starter, Some(ADDON_MARKETPLACE)),
    feature("hr_employees", "Employees", Module, Starter, Some(ADDON_HR)),
    feature("hr_payroll", "Payroll", Section, Starter, Some(ADDON_HR)),
    feature("marketing_campaigns", "Campaign builder", Module, Starter, Some(ADDON_MARKETING)),
    feature("marketing_ads", "Ads integration", Section, Starter, Some(ADDON_MARKETING)),
    feature("report_analytics", "Analytics dashboards", Report, Starter, Some(ADDON_ANALYTICS)),
    feature("report_forecasting", "Forecasting", Report, Starter, Some(ADDON_ANALYTICS)),
];

pub fn find_feature(code: &str) -> Option<&'static FeatureDefinition> {
    FEATURES.iter().find(|feature| feature.code == code)
}

pub fn find_addon(addon_id: &str) -> Option<&'static AddonDefinition> {
    ADDONS.iter().find(|addon| addon.id == addon_id)
}

/// Feature codes a plan level unlocks on its own.
pub fn plan_level_features(level: PlanLevel) -> Vec<&'static str> {
    FEATURES
        .iter()
        .filter(|feature| feature.required_addon_id.is_none())
        .filter(|feature| feature.required_plan_level <= level)
        .map(|feature| feature.code)
        .collect()
}
