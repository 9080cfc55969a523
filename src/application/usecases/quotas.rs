use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    clock::Clock,
    entities::quotas::QuotaEntity,
    repositories::{
        plans::PlanRepository, quotas::QuotaRepository, subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::limitation_periods::LimitationPeriod,
        quotas::{MAX_QUOTA_UPDATE_ATTEMPTS, QuotaCheck, QuotaUsage},
    },
};

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("no quotas tracked for user")]
    QuotaNotFound,
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("amount would overflow the quota counter")]
    CounterOverflow,
    #[error("quota {quota_type} exceeded: {requested} requested, {remaining} remaining")]
    QuotaExceeded {
        quota_type: String,
        requested: i64,
        remaining: i64,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl QuotaError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            QuotaError::QuotaNotFound => StatusCode::NOT_FOUND,
            QuotaError::InvalidAmount | QuotaError::CounterOverflow => StatusCode::BAD_REQUEST,
            QuotaError::QuotaExceeded { .. } => StatusCode::CONFLICT,
            QuotaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type QuotaResult<T> = std::result::Result<T, QuotaError>;

pub struct QuotaUseCase<P, S, Q>
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

impl<P, S, Q> QuotaUseCase<P, S, Q>
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

    pub async fn get_quotas(&self, user_id: Uuid) -> QuotaResult<QuotaEntity> {
        self.require_quotas(user_id).await
    }

    /// Quota types the user's plan does not limit are reported as uncapped.
    pub async fn check_limit(
        &self,
        user_id: Uuid,
        quota_type: &str,
        amount: i64,
    ) -> QuotaResult<QuotaCheck> {
        if amount <= 0 {
            return Err(QuotaError::InvalidAmount);
        }

        let quotas = self.require_quotas(user_id).await?;
        let check = match quotas.quotas.get(quota_type) {
            Some(entry) => QuotaCheck::evaluate(entry, amount),
            None => QuotaCheck::unlimited(),
        };

        debug!(
            %user_id,
            quota_type,
            amount,
            allowed = check.allowed,
            "quotas: limit checked"
        );
        Ok(check)
    }

    pub async fn use_quota(
        &self,
        user_id: Uuid,
        quota_type: &str,
        amount: i64,
    ) -> QuotaResult<QuotaUsage> {
        if amount <= 0 {
            return Err(QuotaError::InvalidAmount);
        }

        for _ in 0..MAX_QUOTA_UPDATE_ATTEMPTS {
            let current = self.require_quotas(user_id).await?;
            let Some(entry) = current.quotas.get(quota_type) else {
                debug!(%user_id, quota_type, "quotas: untracked quota type, nothing recorded");
                return Ok(QuotaUsage {
                    quota_type: quota_type.to_string(),
                    used: 0,
                    limit: crate::domain::value_objects::plans::UNLIMITED,
                    overage_applied: 0,
                    tracked: false,
                });
            };

            let check = QuotaCheck::evaluate(entry, amount);
            let overage_applied = if check.allowed {
                0
            } else if self.overage_allowed(current.plan_id, quota_type).await? {
                info!(
                    %user_id,
                    quota_type,
                    overage = check.overage,
                    "quotas: consumption billed as overage"
                );
                check.overage
            } else {
                warn!(%user_id, quota_type, amount, "quotas: quota exceeded");
                return Err(QuotaError::QuotaExceeded {
                    quota_type: quota_type.to_string(),
                    requested: amount,
                    remaining: check.remaining.unwrap_or_default(),
                });
            };

            let (Some(used), Some(overage)) = (
                entry.used.checked_add(amount),
                entry.overage.checked_add(overage_applied),
            ) else {
                warn!(%user_id, quota_type, amount, "quotas: counter would overflow");
                return Err(QuotaError::CounterOverflow);
            };
            let limit = entry.limit;

            let mut updated = current.clone();
            if let Some(entry) = updated.quotas.get_mut(quota_type) {
                entry.used = used;
                entry.overage = overage;
            }

            let stored = self
                .quota_repo
                .replace_if_unchanged(&current, updated)
                .await
                .map_err(|err| {
                    error!(%user_id, quota_type, db_error = ?err, "quotas: failed to persist usage");
                    QuotaError::Internal(err)
                })?;
            if !stored {
                debug!(%user_id, quota_type, "quotas: record changed underneath, retrying");
                continue;
            }

            self.mirror_usage(user_id, quota_type, used).await?;
            return Ok(QuotaUsage {
                quota_type: quota_type.to_string(),
                used,
                limit,
                overage_applied,
                tracked: true,
            });
        }

        error!(%user_id, quota_type, "quotas: gave up on contended quota record");
        Err(QuotaError::Internal(anyhow!(
            "quota record for user {user_id} kept changing"
        )))
    }

    /// Zeroes every quota whose reset date has passed. Returns how many
    /// quota entries were reset.
    pub async fn reset_quotas(&self, now: DateTime<Utc>) -> QuotaResult<usize> {
        let mut reset_count = 0;

        for quotas in self.quota_repo.list_all().await? {
            let user_id = quotas.user_id;
            let reset_types = self.reset_user_quotas(user_id, now).await?;
            if reset_types.is_empty() {
                continue;
            }

            reset_count += reset_types.len();
            for quota_type in &reset_types {
                self.mirror_usage(user_id, quota_type, 0).await?;
            }
            debug!(%user_id, reset = reset_types.len(), "quotas: user quotas reset");
        }

        if reset_count > 0 {
            info!(reset_count, "quotas: expired quotas reset");
        }
        Ok(reset_count)
    }

    pub async fn reset_due_quotas(&self) -> QuotaResult<usize> {
        self.reset_quotas(self.clock.now()).await
    }

    async fn require_quotas(&self, user_id: Uuid) -> QuotaResult<QuotaEntity> {
        self.quota_repo
            .find_by_user(user_id)
            .await?
            .ok_or(QuotaError::QuotaNotFound)
    }

    /// Resets the elapsed entries of one user's quotas against the latest
    /// stored record and returns the quota types that were reset.
    async fn reset_user_quotas(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> QuotaResult<Vec<String>> {
        for _ in 0..MAX_QUOTA_UPDATE_ATTEMPTS {
            let Some(current) = self.quota_repo.find_by_user(user_id).await? else {
                return Ok(Vec::new());
            };
            let plan = self.plan_repo.find_by_id(current.plan_id).await?;

            let mut updated = current.clone();
            let mut reset_types = Vec::new();
            for (quota_type, entry) in updated.quotas.iter_mut() {
                if entry.reset_date > now {
                    continue;
                }

                let period = plan
                    .as_ref()
                    .and_then(|plan| plan.find_limitation(quota_type))
                    .map(|limitation| limitation.period_or_default())
                    .unwrap_or(LimitationPeriod::Monthly);

                entry.used = 0;
                entry.overage = 0;
                entry.reset_date = period.next_reset_after(now);
                reset_types.push(quota_type.clone());
            }

            if reset_types.is_empty() {
                return Ok(reset_types);
            }
            if self
                .quota_repo
                .replace_if_unchanged(&current, updated)
                .await?
            {
                return Ok(reset_types);
            }
            debug!(%user_id, "quotas: record changed during reset, retrying");
        }

        error!(%user_id, "quotas: gave up resetting contended quota record");
        Err(QuotaError::Internal(anyhow!(
            "quota record for user {user_id} kept changing"
        )))
    }

    async fn overage_allowed(&self, plan_id: Uuid, quota_type: &str) -> QuotaResult<bool> {
        let plan = self.plan_repo.find_by_id(plan_id).await?;
        Ok(plan
            .as_ref()
            .and_then(|plan| plan.find_limitation(quota_type))
            .is_some_and(|limitation| limitation.allows_overage()))
    }

    async fn mirror_usage(&self, user_id: Uuid, quota_type: &str, used: i64) -> QuotaResult<()> {
        if let Some(mut subscription) = self.subscription_repo.find_live_by_user(user_id).await? {
            subscription.usage.insert(quota_type.to_string(), used);
            subscription.updated_at = self.clock.now();
            self.subscription_repo.update(subscription).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::subscriptions::SubscriptionUseCase;
    use crate::domain::{
        catalog::plans::{ENTERPRISE_PLAN_ID, PROFESSIONAL_PLAN_ID, STARTER_PLAN_ID, default_plans},
        clock::FixedClock,
        entities::plans::PlanEntity,
        value_objects::plans::Limitation,
    };
    use crate::infrastructure::in_memory::{
        plans::PlanInMemory, quotas::QuotaInMemory, subscriptions::SubscriptionInMemory,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap()
    }

    struct Fixture {
        quotas: QuotaUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>,
        subscriptions: SubscriptionUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>,
        plan_repo: Arc<PlanInMemory>,
    }

    fn fixture() -> Fixture {
        let mut plans = default_plans(now());
        plans.push(packages_plan());

        let plan_repo = Arc::new(PlanInMemory::with_plans(plans));
        let subscription_repo = Arc::new(SubscriptionInMemory::new());
        let quota_repo = Arc::new(QuotaInMemory::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now()));

        Fixture {
            quotas: QuotaUseCase::new(
                Arc::clone(&plan_repo),
                Arc::clone(&subscription_repo),
                Arc::clone(&quota_repo),
                Arc::clone(&clock),
            ),
            subscriptions: SubscriptionUseCase::new(
                Arc::clone(&plan_repo),
                subscription_repo,
                quota_repo,
                clock,
            ),
            plan_repo,
        }
    }

    const PACKAGES_PLAN_ID: Uuid = Uuid::from_u128(42);

    fn packages_plan() -> PlanEntity {
        let mut plan = default_plans(now()).remove(0);
        plan.id = PACKAGES_PLAN_ID;
        plan.name = "Packages".to_string();
        plan.limitations = vec![Limitation {
            limitation_type: "packages".to_string(),
            value: 100,
            unlimited: None,
            period: None,
            overage: None,
        }];
        plan
    }

    async fn subscribe(fixture: &Fixture, plan_id: Uuid) -> Uuid {
        let user_id = Uuid::new_v4();
        fixture
            .subscriptions
            .create_subscription(user_id, plan_id, Default::default())
            .await
            .unwrap();
        user_id
    }

    #[tokio::test]
    async fn check_limit_reports_remaining_and_overage() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PACKAGES_PLAN_ID).await;
        fixture.quotas.use_quota(user_id, "packages", 95).await.unwrap();

        let check = fixture
            .quotas
            .check_limit(user_id, "packages", 10)
            .await
            .unwrap();
        assert_eq!(
            check,
            QuotaCheck {
                allowed: false,
                remaining: Some(5),
                overage: 5,
            }
        );
    }

    #[tokio::test]
    async fn use_quota_rejects_without_overage_and_leaves_usage_untouched() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PACKAGES_PLAN_ID).await;
        fixture.quotas.use_quota(user_id, "packages", 95).await.unwrap();

        let err = fixture
            .quotas
            .use_quota(user_id, "packages", 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuotaError::QuotaExceeded {
                remaining: 5,
                requested: 10,
                ..
            }
        ));

        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["packages"].used, 95);
        assert!(quotas.quotas["packages"].used <= quotas.quotas["packages"].limit);

        // filling the remainder exactly is fine
        let usage = fixture.quotas.use_quota(user_id, "packages", 5).await.unwrap();
        assert_eq!(usage.used, 100);
        assert_eq!(usage.overage_applied, 0);
    }

    #[tokio::test]
    async fn use_quota_records_overage_when_plan_allows_it() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PROFESSIONAL_PLAN_ID).await;

        fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 990)
            .await
            .unwrap();
        let usage = fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 25)
            .await
            .unwrap();

        assert_eq!(usage.used, 1015);
        assert_eq!(usage.limit, 1000);
        assert_eq!(usage.overage_applied, 15);

        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["packages_per_month"].overage, 15);

        let subscription = fixture
            .subscriptions
            .get_user_subscription(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(subscription.usage["packages_per_month"], 1015);
    }

    #[tokio::test]
    async fn unlimited_and_untracked_quotas_always_pass() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, ENTERPRISE_PLAN_ID).await;

        let check = fixture
            .quotas
            .check_limit(user_id, "packages_per_month", 1_000_000)
            .await
            .unwrap();
        assert_eq!(check, QuotaCheck::unlimited());

        let usage = fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 1_000_000)
            .await
            .unwrap();
        assert_eq!(usage.used, 1_000_000);

        let untracked = fixture
            .quotas
            .use_quota(user_id, "drones", 3)
            .await
            .unwrap();
        assert!(!untracked.tracked);
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts_and_unknown_users() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, STARTER_PLAN_ID).await;

        assert!(matches!(
            fixture.quotas.use_quota(user_id, "users", 0).await,
            Err(QuotaError::InvalidAmount)
        ));
        assert!(matches!(
            fixture.quotas.check_limit(Uuid::new_v4(), "users", 1).await,
            Err(QuotaError::QuotaNotFound)
        ));
    }

    #[tokio::test]
    async fn reset_only_touches_elapsed_quotas() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, STARTER_PLAN_ID).await;
        fixture
            .quotas
            .use_quota(user_id, "quotes_per_day", 7)
            .await
            .unwrap();
        fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 30)
            .await
            .unwrap();

        // before midnight nothing is due
        assert_eq!(fixture.quotas.reset_quotas(now()).await.unwrap(), 0);

        let next_day = Utc.with_ymd_and_hms(2026, 3, 11, 0, 5, 0).unwrap();
        assert_eq!(fixture.quotas.reset_quotas(next_day).await.unwrap(), 1);

        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["quotes_per_day"].used, 0);
        assert_eq!(
            quotas.quotas["quotes_per_day"].reset_date,
            Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap()
        );
        assert_eq!(quotas.quotas["packages_per_month"].used, 30);

        // the "users" limitation has no period and resets monthly
        let next_month = now() + Duration::days(25);
        fixture.quotas.reset_quotas(next_month).await.unwrap();
        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["packages_per_month"].used, 0);
        assert_eq!(
            quotas.quotas["users"].reset_date,
            Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()
        );

        let subscription = fixture
            .subscriptions
            .get_user_subscription(user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(subscription.usage["packages_per_month"], 0);
    }

    #[tokio::test]
    async fn reset_falls_back_to_monthly_when_plan_is_gone() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PACKAGES_PLAN_ID).await;
        fixture.quotas.use_quota(user_id, "packages", 10).await.unwrap();
        fixture.plan_repo.delete(PACKAGES_PLAN_ID).await.unwrap();

        let later = Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap();
        assert_eq!(fixture.quotas.reset_quotas(later).await.unwrap(), 1);
        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(
            quotas.quotas["packages"].reset_date,
            Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn counter_overflow_is_rejected_and_usage_kept() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, ENTERPRISE_PLAN_ID).await;

        let usage = fixture
            .quotas
            .use_quota(user_id, "packages_per_month", i64::MAX)
            .await
            .unwrap();
        assert_eq!(usage.used, i64::MAX);

        let err = fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, QuotaError::CounterOverflow));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["packages_per_month"].used, i64::MAX);
    }

    #[tokio::test]
    async fn huge_amounts_past_the_limit_do_not_wrap() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PROFESSIONAL_PLAN_ID).await;
        fixture
            .quotas
            .use_quota(user_id, "packages_per_month", 1_200)
            .await
            .unwrap();

        let check = fixture
            .quotas
            .check_limit(user_id, "packages_per_month", i64::MAX)
            .await
            .unwrap();
        assert!(!check.allowed);
        assert_eq!(check.remaining, Some(-200));
        assert_eq!(check.overage, i64::MAX);

        let err = fixture
            .quotas
            .use_quota(user_id, "packages_per_month", i64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, QuotaError::CounterOverflow));
        let quotas = fixture.quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(quotas.quotas["packages_per_month"].used, 1_200);
        assert_eq!(quotas.quotas["packages_per_month"].overage, 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_never_exceed_the_limit() {
        let fixture = fixture();
        let user_id = subscribe(&fixture, PACKAGES_PLAN_ID).await;
        let quotas = Arc::new(fixture.quotas);

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let quotas = Arc::clone(&quotas);
                tokio::spawn(async move { quotas.use_quota(user_id, "packages", 3).await })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(usage) => {
                    assert!(usage.used <= 100);
                    granted += 3;
                }
                Err(QuotaError::QuotaExceeded { .. }) => {}
                Err(other) => panic!("unexpected quota error: {other}"),
            }
        }

        let stored = quotas.get_quotas(user_id).await.unwrap();
        assert_eq!(stored.quotas["packages"].used, granted);
        assert_eq!(granted, 99);
    }
}
