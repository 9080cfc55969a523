use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::quotas::QuotaEntity;

#[automock]
#[async_trait]
pub trait QuotaRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<QuotaEntity>>;
    async fn upsert(&self, quota: QuotaEntity) -> Result<()>;
    /// Stores `updated` only if the user's record still equals `expected`.
    /// Returns `false` when another writer got there first.
    async fn replace_if_unchanged(
        &self,
        expected: &QuotaEntity,
        updated: QuotaEntity,
    ) -> Result<bool>;
    async fn list_all(&self) -> Result<Vec<QuotaEntity>>;
}
