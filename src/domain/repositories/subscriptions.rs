use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    /// The user's subscription in `trial` or `active` state, if any.
    async fn find_live_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn count_live_by_plan(&self, plan_id: Uuid) -> Result<usize>;

    async fn insert(&self, subscription: SubscriptionEntity) -> Result<()>;

    async fn update(&self, subscription: SubscriptionEntity) -> Result<()>;
}
