use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{entities::plans::PlanEntity, repositories::plans::PlanRepository};

#[derive(Default)]
pub struct PlanInMemory {
    plans: RwLock<HashMap<Uuid, PlanEntity>>,
}

impl PlanInMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<PlanEntity>) -> Self {
        Self {
            plans: RwLock::new(plans.into_iter().map(|plan| (plan.id, plan)).collect()),
        }
    }
}

#[async_trait]
impl PlanRepository for PlanInMemory {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        Ok(self.plans.read().await.get(&plan_id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<PlanEntity>> {
        Ok(self.plans.read().await.values().cloned().collect())
    }

    async fn insert(&self, plan: PlanEntity) -> Result<()> {
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            bail!("plan {} already exists", plan.id);
        }
        plans.insert(plan.id, plan);
        Ok(())
    }

    async fn update(&self, plan: PlanEntity) -> Result<()> {
        let mut plans = self.plans.write().await;
        match plans.get_mut(&plan.id) {
            Some(existing) => {
                *existing = plan;
                Ok(())
            }
            None => bail!("plan {} does not exist", plan.id),
        }
    }

    async fn delete(&self, plan_id: Uuid) -> Result<bool> {
        Ok(self.plans.write().await.remove(&plan_id).is_some())
    }
}
