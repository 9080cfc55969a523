use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    catalog::features::find_feature,
    clock::Clock,
    entities::plans::PlanEntity,
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
    value_objects::{
        enums::plan_statuses::PlanStatus,
        plans::{MAX_TRIAL_DAYS, UpsertPlanModel},
    },
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("plan is referenced by {0} live subscription(s)")]
    PlanInUse(usize),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanError::PlanNotFound => StatusCode::NOT_FOUND,
            PlanError::PlanInUse(_) => StatusCode::CONFLICT,
            PlanError::InvalidPlan(_) => StatusCode::BAD_REQUEST,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

pub struct PlanUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<P, S> PlanUseCase<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, subscription_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            clock,
        }
    }

    pub async fn create_plan(&self, model: UpsertPlanModel) -> PlanResult<PlanEntity> {
        Self::validate(&model)?;

        let now = self.clock.now();
        let plan = PlanEntity {
            id: Uuid::new_v4(),
            name: model.name.trim().to_string(),
            description: model.description,
            level: model.level,
            pricing: model.pricing,
            features: model.features,
            limitations: model.limitations,
            permissions: model.permissions,
            trial: model.trial,
            status: model.status,
            metadata: model.metadata,
            created_at: now,
            updated_at: now,
        };

        self.plan_repo.insert(plan.clone()).await.map_err(|err| {
            error!(plan_id = %plan.id, db_error = ?err, "plans: failed to insert plan");
            PlanError::Internal(err)
        })?;

        info!(plan_id = %plan.id, name = %plan.name, "plans: plan created");
        Ok(plan)
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> PlanResult<Option<PlanEntity>> {
        Ok(self.plan_repo.find_by_id(plan_id).await?)
    }

    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        model: UpsertPlanModel,
    ) -> PlanResult<PlanEntity> {
        Self::validate(&model)?;

        let existing = self.require_plan(plan_id).await?;
        self.ensure_unreferenced(plan_id).await?;

        let plan = PlanEntity {
            id: existing.id,
            name: model.name.trim().to_string(),
            description: model.description,
            level: model.level,
            pricing: model.pricing,
            features: model.features,
            limitations: model.limitations,
            permissions: model.permissions,
            trial: model.trial,
            status: model.status,
            metadata: model.metadata,
            created_at: existing.created_at,
            updated_at: self.clock.now(),
        };

        self.plan_repo.update(plan.clone()).await?;
        info!(%plan_id, "plans: plan updated");
        Ok(plan)
    }

    /// Status changes stay allowed for referenced plans so a plan can be
    /// retired from sale without touching existing subscribers.
    pub async fn set_plan_status(
        &self,
        plan_id: Uuid,
        status: PlanStatus,
    ) -> PlanResult<PlanEntity> {
        let mut plan = self.require_plan(plan_id).await?;
        plan.status = status;
        plan.updated_at = self.clock.now();

        self.plan_repo.update(plan.clone()).await?;
        info!(%plan_id, status = %status, "plans: plan status changed");
        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> PlanResult<()> {
        self.require_plan(plan_id).await?;
        self.ensure_unreferenced(plan_id).await?;

        if !self.plan_repo.delete(plan_id).await? {
            return Err(PlanError::PlanNotFound);
        }

        info!(%plan_id, "plans: plan deleted");
        Ok(())
    }

    pub async fn get_active_plans(&self) -> PlanResult<Vec<PlanEntity>> {
        let mut plans: Vec<_> = self
            .plan_repo
            .list_plans()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plans: failed to list plans");
                PlanError::Internal(err)
            })?
            .into_iter()
            .filter(PlanEntity::is_active)
            .collect();

        plans.sort_by(|a, b| {
            a.metadata
                .order
                .cmp(&b.metadata.order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(plans)
    }

    async fn require_plan(&self, plan_id: Uuid) -> PlanResult<PlanEntity> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or(PlanError::PlanNotFound)
    }

    async fn ensure_unreferenced(&self, plan_id: Uuid) -> PlanResult<()> {
        let live = self.subscription_repo.count_live_by_plan(plan_id).await?;
        if live > 0 {
            warn!(%plan_id, live, "plans: plan is referenced by live subscriptions");
            return Err(PlanError::PlanInUse(live));
        }
        Ok(())
    }

    fn validate(model: &UpsertPlanModel) -> PlanResult<()> {
        if model.name.trim().is_empty() {
            return Err(PlanError::InvalidPlan("name must not be empty".to_string()));
        }
        if model.pricing.monthly < 0.0 || model.pricing.yearly < 0.0 {
            return Err(PlanError::InvalidPlan("prices must not be negative".to_string()));
        }
        if model.pricing.currency.trim().is_empty() {
            return Err(PlanError::InvalidPlan("currency is required".to_string()));
        }
        if model.trial.enabled && model.trial.duration <= 0 {
            return Err(PlanError::InvalidPlan(
                "trial duration must be positive".to_string(),
            ));
        }
        if !(0..=MAX_TRIAL_DAYS).contains(&model.trial.duration) {
            return Err(PlanError::InvalidPlan(format!(
                "trial duration must be between 0 and {MAX_TRIAL_DAYS} days"
            )));
        }

        let mut seen = HashSet::new();
        for limitation in &model.limitations {
            if limitation.limitation_type.trim().is_empty() {
                return Err(PlanError::InvalidPlan(
                    "limitation type must not be empty".to_string(),
                ));
            }
            if !seen.insert(limitation.limitation_type.as_str()) {
                return Err(PlanError::InvalidPlan(format!(
                    "duplicate limitation type {}",
                    limitation.limitation_type
                )));
            }
            if limitation.value < 0 && !limitation.is_unlimited() {
                return Err(PlanError::InvalidPlan(format!(
                    "limitation {} has a negative value",
                    limitation.limitation_type
                )));
            }
        }

        if let Some(unknown) = model.features.iter().find(|code| find_feature(code).is_none()) {
            return Err(PlanError::InvalidPlan(format!("unknown feature {unknown}")));
        }

        Ok(())
    }
}
