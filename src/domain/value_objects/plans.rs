use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;
use crate::domain::value_objects::enums::{
    limitation_periods::LimitationPeriod, plan_levels::PlanLevel, plan_statuses::PlanStatus,
};

/// Sentinel limit meaning "no cap".
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pricing {
    pub monthly: f64,
    pub yearly: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrialConfig {
    pub enabled: bool,
    /// Trial length in days.
    pub duration: i64,
}

/// Longest trial a plan may offer, in days.
pub const MAX_TRIAL_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OveragePolicy {
    pub allowed: bool,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
}

/// A named quota axis attached to a plan, e.g. `packages_per_month`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Limitation {
    #[serde(rename = "type")]
    pub limitation_type: String,
    pub value: i64,
    #[serde(default)]
    pub unlimited: Option<bool>,
    #[serde(default)]
    pub period: Option<LimitationPeriod>,
    #[serde(default)]
    pub overage: Option<OveragePolicy>,
}

impl Limitation {
    pub fn is_unlimited(&self) -> bool {
        self.unlimited.unwrap_or(false) || self.value == UNLIMITED
    }

    /// Cap used for quota tracking, `UNLIMITED` when uncapped.
    pub fn effective_limit(&self) -> i64 {
        if self.is_unlimited() {
            UNLIMITED
        } else {
            self.value
        }
    }

    pub fn period_or_default(&self) -> LimitationPeriod {
        self.period.unwrap_or_default()
    }

    pub fn allows_overage(&self) -> bool {
        self.overage.as_ref().is_some_and(|overage| overage.allowed)
    }

    /// True when this limitation grants at least as much as `other`.
    pub fn covers(&self, other: &Limitation) -> bool {
        if self.is_unlimited() {
            return true;
        }
        if other.is_unlimited() {
            return false;
        }
        self.value >= other.value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanMetadata {
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub popular: bool,
}

/// Input for creating or replacing a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertPlanModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: PlanLevel,
    pub pricing: Pricing,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<Limitation>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub trial: TrialConfig,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default)]
    pub metadata: PlanMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlanStatusModel {
    pub status: PlanStatus,
}

#[derive(Debug, Serialize)]
pub struct PlanDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub level: PlanLevel,
    pub pricing: Pricing,
    pub features: Vec<String>,
    pub limitations: Vec<Limitation>,
    pub trial: TrialConfig,
    pub popular: bool,
}

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            level: value.level,
            pricing: value.pricing,
            features: value.features,
            limitations: value.limitations,
            trial: value.trial,
            popular: value.metadata.popular,
        }
    }
}
