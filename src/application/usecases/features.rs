use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    catalog::features::{self, ADDONS, FEATURES, find_addon, plan_level_features},
    clock::Clock,
    entities::addons::TenantAddonEntity,
    repositories::{
        addons::TenantAddonRepository, plans::PlanRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::feature_categories::FeatureCategory,
        features::{AddonDto, FeatureDto},
    },
};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("unknown add-on {0}")]
    AddonNotFound(String),
    #[error("add-on {0} is not active for tenant")]
    AddonNotActive(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FeatureError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            FeatureError::AddonNotFound(_) | FeatureError::AddonNotActive(_) => {
                StatusCode::NOT_FOUND
            }
            FeatureError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type FeatureResult<T> = std::result::Result<T, FeatureError>;

/// Resolves which feature codes a tenant may use from its plan and add-ons.
pub struct FeatureFlagUseCase<P, S, A>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    A: TenantAddonRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    addon_repo: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<P, S, A> FeatureFlagUseCase<P, S, A>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    A: TenantAddonRepository + Send + Sync + 'static,
{
    pub fn new(
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        addon_repo: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            addon_repo,
            clock,
        }
    }

    pub fn list_features(&self, category: Option<FeatureCategory>) -> Vec<FeatureDto> {
        FEATURES
            .iter()
            .filter(|feature| category.is_none_or(|category| feature.category == category))
            .map(FeatureDto::from)
            .collect()
    }

    pub fn list_addons(&self) -> Vec<AddonDto> {
        ADDONS.iter().map(AddonDto::from).collect()
    }

    /// Plan features united with the features of every effective add-on,
    /// de-duplicated and sorted.
    pub async fn get_tenant_features(&self, tenant_id: Uuid) -> FeatureResult<Vec<String>> {
        let now = self.clock.now();
        let mut codes = BTreeSet::new();

        if let Some(subscription) = self.subscription_repo.find_live_by_user(tenant_id).await? {
            match self.plan_repo.find_by_id(subscription.plan_id).await? {
                Some(plan) => {
                    codes.extend(plan_level_features(plan.level).into_iter().map(str::to_string));
                    codes.extend(plan.features.iter().cloned());
                }
                None => warn!(
                    %tenant_id,
                    plan_id = %subscription.plan_id,
                    "features: subscription references a missing plan"
                ),
            }
        }

        for addon in self.addon_repo.list_by_tenant(tenant_id).await? {
            if !addon.is_effective_at(now) {
                continue;
            }
            if let Some(definition) = find_addon(&addon.addon_id) {
                codes.extend(definition.feature_codes().into_iter().map(str::to_string));
            }
        }

        debug!(%tenant_id, feature_count = codes.len(), "features: tenant features resolved");
        Ok(codes.into_iter().collect())
    }

    pub async fn is_feature_enabled(&self, tenant_id: Uuid, code: &str) -> FeatureResult<bool> {
        if features::find_feature(code).is_none() {
            debug!(%tenant_id, code, "features: unknown feature code");
            return Ok(false);
        }
        Ok(self
            .get_tenant_features(tenant_id)
            .await?
            .iter()
            .any(|enabled| enabled == code))
    }

    pub async fn activate_addon(
        &self,
        tenant_id: Uuid,
        addon_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> FeatureResult<TenantAddonEntity> {
        if find_addon(addon_id).is_none() {
            return Err(FeatureError::AddonNotFound(addon_id.to_string()));
        }

        let addon = TenantAddonEntity {
            tenant_id,
            addon_id: addon_id.to_string(),
            active: true,
            activated_at: self.clock.now(),
            expires_at,
        };
        self.addon_repo.upsert(addon.clone()).await?;

        info!(%tenant_id, addon_id, "features: add-on activated");
        Ok(addon)
    }

    pub async fn deactivate_addon(&self, tenant_id: Uuid, addon_id: &str) -> FeatureResult<()> {
        if !self.addon_repo.deactivate(tenant_id, addon_id).await? {
            return Err(FeatureError::AddonNotActive(addon_id.to_string()));
        }
        info!(%tenant_id, addon_id, "features: add-on deactivated");
        Ok(())
    }

    pub async fn list_tenant_addons(&self, tenant_id: Uuid) -> FeatureResult<Vec<TenantAddonEntity>> {
        Ok(self.addon_repo.list_by_tenant(tenant_id).await?)
    }
}
