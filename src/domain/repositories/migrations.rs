use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::migrations::PlanMigrationEntity;

#[automock]
#[async_trait]
pub trait PlanMigrationRepository {
    async fn find_by_id(&self, migration_id: Uuid) -> Result<Option<PlanMigrationEntity>>;
    async fn list_by_subscription(&self, subscription_id: Uuid)
    -> Result<Vec<PlanMigrationEntity>>;
    async fn list_scheduled(&self) -> Result<Vec<PlanMigrationEntity>>;
    async fn insert(&self, migration: PlanMigrationEntity) -> Result<()>;
    async fn update(&self, migration: PlanMigrationEntity) -> Result<()>;
}
