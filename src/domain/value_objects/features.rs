use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::features::{AddonDefinition, FeatureDefinition};
use crate::domain::value_objects::enums::{
    feature_categories::FeatureCategory, plan_levels::PlanLevel,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureDto {
    pub code: String,
    pub name: String,
    pub category: FeatureCategory,
    pub required_plan_level: PlanLevel,
    pub required_addon_id: Option<String>,
}

impl From<&FeatureDefinition> for FeatureDto {
    fn from(value: &FeatureDefinition) -> Self {
        Self {
            code: value.code.to_string(),
            name: value.name.to_string(),
            category: value.category,
            required_plan_level: value.required_plan_level,
            required_addon_id: value.required_addon_id.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AddonDto {
    pub id: String,
    pub name: String,
    pub monthly_price: f64,
    pub currency: String,
    pub feature_codes: Vec<String>,
}

impl From<&AddonDefinition> for AddonDto {
    fn from(value: &AddonDefinition) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            monthly_price: value.monthly_price,
            currency: value.currency.to_string(),
            feature_codes: value
                .feature_codes()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivateAddonRequest {
    pub addon_id: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFeaturesQuery {
    #[serde(default)]
    pub category: Option<FeatureCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCheckDto {
    pub code: String,
    pub enabled: bool,
}
