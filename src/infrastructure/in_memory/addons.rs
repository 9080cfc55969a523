use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::addons::TenantAddonEntity, repositories::addons::TenantAddonRepository,
};

#[derive(Default)]
pub struct TenantAddonInMemory {
    addons: RwLock<HashMap<(Uuid, String), TenantAddonEntity>>,
}

impl TenantAddonInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantAddonRepository for TenantAddonInMemory {
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<TenantAddonEntity>> {
        let addons = self.addons.read().await;
        let mut found: Vec<_> = addons
            .values()
            .filter(|addon| addon.tenant_id == tenant_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.addon_id.cmp(&b.addon_id));
        Ok(found)
    }

    async fn upsert(&self, addon: TenantAddonEntity) -> Result<()> {
        self.addons
            .write()
            .await
            .insert((addon.tenant_id, addon.addon_id.clone()), addon);
        Ok(())
    }

    async fn deactivate(&self, tenant_id: Uuid, addon_id: &str) -> Result<bool> {
        let mut addons = self.addons.write().await;
        match addons.get_mut(&(tenant_id, addon_id.to_string())) {
            Some(addon) if addon.active => {
                addon.active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
