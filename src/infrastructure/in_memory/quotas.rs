use std::collections::HashMap;

use anyhow::{Result, ensure};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{entities::quotas::QuotaEntity, repositories::quotas::QuotaRepository};

#[derive(Default)]
pub struct QuotaInMemory {
    quotas: RwLock<HashMap<Uuid, QuotaEntity>>,
}

impl QuotaInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotaRepository for QuotaInMemory {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<QuotaEntity>> {
        Ok(self.quotas.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, quota: QuotaEntity) -> Result<()> {
        self.quotas.write().await.insert(quota.user_id, quota);
        Ok(())
    }

    async fn replace_if_unchanged(
        &self,
        expected: &QuotaEntity,
        updated: QuotaEntity,
    ) -> Result<bool> {
        ensure!(
            expected.user_id == updated.user_id,
            "quota replacement must target the same user"
        );

        let mut quotas = self.quotas.write().await;
        match quotas.get(&expected.user_id) {
            Some(current) if current == expected => {
                quotas.insert(updated.user_id, updated);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_all(&self) -> Result<Vec<QuotaEntity>> {
        Ok(self.quotas.read().await.values().cloned().collect())
    }
}
