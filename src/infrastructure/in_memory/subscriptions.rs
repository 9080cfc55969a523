use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
};

#[derive(Default)]
pub struct SubscriptionInMemory {
    subscriptions: RwLock<HashMap<Uuid, SubscriptionEntity>>,
}

impl SubscriptionInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionInMemory {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        Ok(self.subscriptions.read().await.get(&subscription_id).cloned())
    }

    async fn find_live_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|subscription| subscription.user_id == user_id && subscription.is_live())
            .max_by_key(|subscription| subscription.start_date)
            .cloned())
    }

    async fn count_live_by_plan(&self, plan_id: Uuid) -> Result<usize> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|subscription| subscription.plan_id == plan_id && subscription.is_live())
            .count())
    }

    async fn insert(&self, subscription: SubscriptionEntity) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        if subscriptions.contains_key(&subscription.id) {
            bail!("subscription {} already exists", subscription.id);
        }
        subscriptions.insert(subscription.id, subscription);
        Ok(())
    }

    async fn update(&self, subscription: SubscriptionEntity) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.get_mut(&subscription.id) {
            Some(existing) => {
                *existing = subscription;
                Ok(())
            }
            None => bail!("subscription {} does not exist", subscription.id),
        }
    }
}
