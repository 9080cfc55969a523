use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::{migration_statuses::MigrationStatus, migration_types::MigrationType},
    migrations::{DataTransfer, Proration, RollbackWindow},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanMigrationEntity {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub from_plan_id: Uuid,
    pub to_plan_id: Uuid,
    #[serde(rename = "type")]
    pub migration_type: MigrationType,
    pub status: MigrationStatus,
    pub effective_date: DateTime<Utc>,
    pub proration: Proration,
    pub data_transfer: DataTransfer,
    pub rollback: RollbackWindow,
    pub executed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
