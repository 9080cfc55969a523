use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::{plan_levels::PlanLevel, plan_statuses::PlanStatus},
    plans::{Limitation, PlanMetadata, Pricing, TrialConfig},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub level: PlanLevel,
    pub pricing: Pricing,
    /// Feature codes granted on top of the plan level.
    pub features: Vec<String>,
    pub limitations: Vec<Limitation>,
    pub permissions: Vec<String>,
    pub trial: TrialConfig,
    pub status: PlanStatus,
    pub metadata: PlanMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanEntity {
    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }

    pub fn find_limitation(&self, limitation_type: &str) -> Option<&Limitation> {
        self.limitations
            .iter()
            .find(|limitation| limitation.limitation_type == limitation_type)
    }
}
