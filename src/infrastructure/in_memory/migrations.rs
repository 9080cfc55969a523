use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::migrations::PlanMigrationEntity,
    repositories::migrations::PlanMigrationRepository,
    value_objects::enums::migration_statuses::MigrationStatus,
};

#[derive(Default)]
pub struct PlanMigrationInMemory {
    migrations: RwLock<HashMap<Uuid, PlanMigrationEntity>>,
}

impl PlanMigrationInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanMigrationRepository for PlanMigrationInMemory {
    async fn find_by_id(&self, migration_id: Uuid) -> Result<Option<PlanMigrationEntity>> {
        Ok(self.migrations.read().await.get(&migration_id).cloned())
    }

    async fn list_by_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<Vec<PlanMigrationEntity>> {
        let migrations = self.migrations.read().await;
        let mut found: Vec<_> = migrations
            .values()
            .filter(|migration| migration.subscription_id == subscription_id)
            .cloned()
            .collect();
        found.sort_by_key(|migration| migration.created_at);
        Ok(found)
    }

    async fn list_scheduled(&self) -> Result<Vec<PlanMigrationEntity>> {
        let migrations = self.migrations.read().await;
        let mut found: Vec<_> = migrations
            .values()
            .filter(|migration| migration.status == MigrationStatus::Scheduled)
            .cloned()
            .collect();
        found.sort_by_key(|migration| migration.effective_date);
        Ok(found)
    }

    async fn insert(&self, migration: PlanMigrationEntity) -> Result<()> {
        let mut migrations = self.migrations.write().await;
        if migrations.contains_key(&migration.id) {
            bail!("migration {} already exists", migration.id);
        }
        migrations.insert(migration.id, migration);
        Ok(())
    }

    async fn update(&self, migration: PlanMigrationEntity) -> Result<()> {
        let mut migrations = self.migrations.write().await;
        match migrations.get_mut(&migration.id) {
            Some(existing) => {
                *existing = migration;
                Ok(())
            }
            None => bail!("migration {} does not exist", migration.id),
        }
    }
}
