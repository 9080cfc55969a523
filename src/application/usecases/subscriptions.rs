use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    clock::Clock,
    entities::{quotas::QuotaEntity, subscriptions::SubscriptionEntity},
    repositories::{
        plans::PlanRepository, quotas::QuotaRepository, subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::{invoice_statuses::InvoiceStatus, subscription_statuses::SubscriptionStatus},
        subscriptions::{BILLING_CYCLE_DAYS, BillingInfo, CreateSubscriptionOptions, Invoice},
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("plan is not open for subscription")]
    PlanInactive,
    #[error("user already has a live subscription")]
    AlreadySubscribed,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("subscription is already cancelled")]
    AlreadyCancelled,
    #[error("plan trial duration of {0} days is out of range")]
    InvalidTrialDuration(i64),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::PlanNotFound | SubscriptionError::SubscriptionNotFound => {
                StatusCode::NOT_FOUND
            }
            SubscriptionError::PlanInactive | SubscriptionError::InvalidTrialDuration(_) => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::AlreadySubscribed | SubscriptionError::AlreadyCancelled => {
                StatusCode::CONFLICT
            }
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<P, S, Q>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    quota_repo: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<P, S, Q> SubscriptionUseCase<P, S, Q>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
{
    pub fn new(
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        quota_repo: Arc<Q>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            quota_repo,
            clock,
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        options: CreateSubscriptionOptions,
    ) -> UseCaseResult<SubscriptionEntity> {
        info!(%user_id, %plan_id, trial = options.trial, "subscriptions: create requested");

        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "subscriptions: failed to load plan");
                SubscriptionError::Internal(err)
            })?
            .ok_or(SubscriptionError::PlanNotFound)?;

        if !plan.is_active() {
            warn!(%user_id, %plan_id, status = %plan.status, "subscriptions: plan is not active");
            return Err(SubscriptionError::PlanInactive);
        }

        if let Some(existing) = self.subscription_repo.find_live_by_user(user_id).await? {
            warn!(
                %user_id,
                subscription_id = %existing.id,
                "subscriptions: user already subscribed"
            );
            return Err(SubscriptionError::AlreadySubscribed);
        }

        let now = self.clock.now();
        let on_trial = options.trial && plan.trial.enabled;
        let (status, trial_end_date) = if on_trial {
            let trial_end_date = Duration::try_days(plan.trial.duration)
                .and_then(|length| now.checked_add_signed(length))
                .ok_or_else(|| {
                    warn!(
                        %plan_id,
                        duration = plan.trial.duration,
                        "subscriptions: trial end date out of range"
                    );
                    SubscriptionError::InvalidTrialDuration(plan.trial.duration)
                })?;
            (SubscriptionStatus::Trial, Some(trial_end_date))
        } else {
            (SubscriptionStatus::Active, None)
        };

        let invoices = if on_trial {
            Vec::new()
        } else {
            vec![Invoice {
                id: Uuid::new_v4(),
                amount: plan.pricing.monthly,
                currency: plan.pricing.currency.clone(),
                status: InvoiceStatus::Pending,
                issued_at: now,
            }]
        };

        let quotas = QuotaEntity::for_plan(user_id, &plan, now);
        let subscription = SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan_id,
            status,
            start_date: now,
            end_date: None,
            trial_end_date,
            auto_renew: true,
            usage: quotas.used_counters(),
            billing: BillingInfo {
                next_billing_date: now + Duration::days(BILLING_CYCLE_DAYS),
                payment_method: options.payment_method,
                invoices,
            },
            customizations: options.customizations,
            created_at: now,
            updated_at: now,
        };

        self.subscription_repo
            .insert(subscription.clone())
            .await
            .map_err(|err| {
                error!(%user_id, %plan_id, db_error = ?err, "subscriptions: failed to store subscription");
                SubscriptionError::Internal(err)
            })?;
        self.quota_repo.upsert(quotas).await?;

        info!(
            %user_id,
            %plan_id,
            subscription_id = %subscription.id,
            status = %subscription.status,
            "subscriptions: subscription created"
        );
        Ok(subscription)
    }

    pub async fn get_subscription(
        &self,
        subscription_id: Uuid,
    ) -> UseCaseResult<Option<SubscriptionEntity>> {
        Ok(self.subscription_repo.find_by_id(subscription_id).await?)
    }

    pub async fn get_user_subscription(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Option<SubscriptionEntity>> {
        Ok(self.subscription_repo.find_live_by_user(user_id).await?)
    }

    pub async fn cancel_subscription(
        &self,
        subscription_id: Uuid,
    ) -> UseCaseResult<SubscriptionEntity> {
        let mut subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        if subscription.status == SubscriptionStatus::Cancelled {
            warn!(%subscription_id, "subscriptions: cancel on cancelled subscription");
            return Err(SubscriptionError::AlreadyCancelled);
        }

        let now = self.clock.now();
        subscription.status = SubscriptionStatus::Cancelled;
        subscription.end_date = Some(now);
        subscription.auto_renew = false;
        subscription.updated_at = now;

        self.subscription_repo
            .update(subscription.clone())
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "subscriptions: failed to cancel");
                SubscriptionError::Internal(err)
            })?;

        info!(
            %subscription_id,
            user_id = %subscription.user_id,
            "subscriptions: subscription cancelled"
        );
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        catalog::plans::{ENTERPRISE_PLAN_ID, PROFESSIONAL_PLAN_ID, STARTER_PLAN_ID, default_plans},
        clock::FixedClock,
        repositories::{
            plans::MockPlanRepository, quotas::MockQuotaRepository,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::enums::{payment_methods::PaymentMethod, plan_statuses::PlanStatus},
    };
    use crate::infrastructure::in_memory::{
        plans::PlanInMemory, quotas::QuotaInMemory, subscriptions::SubscriptionInMemory,
    };
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap()
    }

    struct Fixture {
        usecase: SubscriptionUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>,
        plans: Arc<PlanInMemory>,
        quotas: Arc<QuotaInMemory>,
    }

    fn fixture() -> Fixture {
        let plans = Arc::new(PlanInMemory::with_plans(default_plans(now())));
        let quotas = Arc::new(QuotaInMemory::new());
        let usecase = SubscriptionUseCase::new(
            Arc::clone(&plans),
            Arc::new(SubscriptionInMemory::new()),
            Arc::clone(&quotas),
            Arc::new(FixedClock::new(now())),
        );
        Fixture {
            usecase,
            plans,
            quotas,
        }
    }

    fn trial() -> CreateSubscriptionOptions {
        CreateSubscriptionOptions {
            trial: true,
            payment_method: PaymentMethod::MobileMoney,
            customizations: None,
        }
    }

    #[tokio::test]
    async fn trial_subscription_ends_after_plan_trial_duration() {
        let fixture = fixture();
        let user_id = Uuid::new_v4();

        let subscription = fixture
            .usecase
            .create_subscription(user_id, STARTER_PLAN_ID, trial())
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Trial);
        assert_eq!(subscription.start_date, now());
        assert_eq!(
            subscription.trial_end_date,
            Some(subscription.start_date + Duration::days(14))
        );
        assert_eq!(
            subscription.billing.next_billing_date,
            now() + Duration::days(30)
        );
        assert!(subscription.billing.invoices.is_empty());
        assert!(subscription.auto_renew);
    }

    #[tokio::test]
    async fn out_of_range_trial_is_rejected_without_side_effects() {
        let fixture = fixture();
        let mut plan = fixture
            .plans
            .find_by_id(STARTER_PLAN_ID)
            .await
            .unwrap()
            .unwrap();
        plan.id = Uuid::new_v4();
        plan.trial.duration = 1_000_000_000_000;
        fixture.plans.insert(plan.clone()).await.unwrap();

        let user_id = Uuid::new_v4();
        let result = fixture
            .usecase
            .create_subscription(user_id, plan.id, trial())
            .await;
        assert!(matches!(
            result,
            Err(SubscriptionError::InvalidTrialDuration(1_000_000_000_000))
        ));
        assert!(
            fixture
                .usecase
                .get_user_subscription(user_id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(fixture.quotas.find_by_user(user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn trial_request_on_plan_without_trial_starts_active() {
        let fixture = fixture();

        let subscription = fixture
            .usecase
            .create_subscription(Uuid::new_v4(), ENTERPRISE_PLAN_ID, trial())
            .await
            .unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.trial_end_date, None);
        assert_eq!(subscription.billing.invoices.len(), 1);
        assert_eq!(subscription.billing.invoices[0].amount, 75000.0);
    }

    #[tokio::test]
    async fn creation_initializes_usage_and_quotas_for_every_limitation() {
        let fixture = fixture();
        let user_id = Uuid::new_v4();

        let subscription = fixture
            .usecase
            .create_subscription(user_id, PROFESSIONAL_PLAN_ID, Default::default())
            .await
            .unwrap();

        let types: Vec<_> = subscription.usage.keys().cloned().collect();
        assert_eq!(types, vec!["packages_per_month", "quotes_per_day", "users"]);
        assert!(subscription.usage.values().all(|used| *used == 0));

        let quotas = fixture.quotas.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(quotas.plan_id, PROFESSIONAL_PLAN_ID);
        assert_eq!(quotas.quotas["packages_per_month"].limit, 1000);
        assert_eq!(
            quotas.quotas["packages_per_month"].reset_date,
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            quotas.quotas["quotes_per_day"].reset_date,
            Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn rejects_second_live_subscription_and_inactive_plans() {
        let fixture = fixture();
        let user_id = Uuid::new_v4();

        fixture
            .usecase
            .create_subscription(user_id, STARTER_PLAN_ID, Default::default())
            .await
            .unwrap();
        let again = fixture
            .usecase
            .create_subscription(user_id, PROFESSIONAL_PLAN_ID, Default::default())
            .await;
        assert!(matches!(again, Err(SubscriptionError::AlreadySubscribed)));

        let mut plan = fixture
            .plans
            .find_by_id(PROFESSIONAL_PLAN_ID)
            .await
            .unwrap()
            .unwrap();
        plan.status = PlanStatus::Archived;
        fixture.plans.update(plan).await.unwrap();

        let archived = fixture
            .usecase
            .create_subscription(Uuid::new_v4(), PROFESSIONAL_PLAN_ID, Default::default())
            .await;
        assert!(matches!(archived, Err(SubscriptionError::PlanInactive)));

        let missing = fixture
            .usecase
            .create_subscription(Uuid::new_v4(), Uuid::new_v4(), Default::default())
            .await;
        assert!(matches!(missing, Err(SubscriptionError::PlanNotFound)));
    }

    #[tokio::test]
    async fn cancel_is_terminal() {
        let fixture = fixture();
        let user_id = Uuid::new_v4();
        let subscription = fixture
            .usecase
            .create_subscription(user_id, STARTER_PLAN_ID, Default::default())
            .await
            .unwrap();

        let cancelled = fixture
            .usecase
            .cancel_subscription(subscription.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert_eq!(cancelled.end_date, Some(now()));
        assert!(!cancelled.auto_renew);

        assert!(matches!(
            fixture.usecase.cancel_subscription(subscription.id).await,
            Err(SubscriptionError::AlreadyCancelled)
        ));
        assert!(
            fixture
                .usecase
                .get_user_subscription(user_id)
                .await
                .unwrap()
                .is_none()
        );

        // a cancelled user may subscribe again
        fixture
            .usecase
            .create_subscription(user_id, STARTER_PLAN_ID, Default::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_unknown_subscription_is_not_found() {
        let fixture = fixture();
        assert!(matches!(
            fixture.usecase.cancel_subscription(Uuid::new_v4()).await,
            Err(SubscriptionError::SubscriptionNotFound)
        ));
    }

    #[tokio::test]
    async fn storage_failure_does_not_write_quotas() {
        let plan = default_plans(now()).remove(0);
        let mut plan_repo = MockPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(plan.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_live_by_user()
            .returning(|_| Ok(None));
        subscription_repo
            .expect_insert()
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let mut quota_repo = MockQuotaRepository::new();
        quota_repo.expect_upsert().never();

        let usecase = SubscriptionUseCase::new(
            Arc::new(plan_repo),
            Arc::new(subscription_repo),
            Arc::new(quota_repo),
            Arc::new(FixedClock::new(now())),
        );

        let err = usecase
            .create_subscription(Uuid::new_v4(), STARTER_PLAN_ID, Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Internal(_)));
    }
}
