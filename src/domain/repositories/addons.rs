use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::addons::TenantAddonEntity;

#[automock]
#[async_trait]
pub trait TenantAddonRepository {
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantAddonEntity>>;
    async fn upsert(&self, addon: TenantAddonEntity) -> Result<()>;
    async fn deactivate(&self, tenant_id: Uuid, addon_id: &str) -> Result<bool>;
}
