use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    clock::Clock,
    entities::{
        migrations::PlanMigrationEntity, plans::PlanEntity, quotas::QuotaEntity,
        subscriptions::SubscriptionEntity,
    },
    repositories::{
        migrations::PlanMigrationRepository, plans::PlanRepository, quotas::QuotaRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::{migration_statuses::MigrationStatus, migration_types::MigrationType},
        migrations::{
            DataTransfer, MigrationOptions, Proration, ROLLBACK_WINDOW_DAYS, RollbackWindow,
        },
        quotas::MAX_QUOTA_UPDATE_ATTEMPTS,
    },
};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("subscription is cancelled")]
    SubscriptionCancelled,
    #[error("plan not found")]
    PlanNotFound,
    #[error("target plan is not open for subscription")]
    PlanInactive,
    #[error("subscription is already on this plan")]
    SamePlan,
    #[error("a migration is already scheduled for this subscription")]
    MigrationPending,
    #[error("migration not found")]
    MigrationNotFound,
    #[error("migration cannot be executed in state {0}")]
    NotExecutable(MigrationStatus),
    #[error("migration can no longer be rolled back")]
    RollbackNotPossible,
    #[error("effective date {0} is out of range")]
    InvalidEffectiveDate(DateTime<Utc>),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MigrationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            MigrationError::SubscriptionNotFound
            | MigrationError::PlanNotFound
            | MigrationError::MigrationNotFound => StatusCode::NOT_FOUND,
            MigrationError::PlanInactive
            | MigrationError::SamePlan
            | MigrationError::InvalidEffectiveDate(_) => StatusCode::BAD_REQUEST,
            MigrationError::SubscriptionCancelled
            | MigrationError::MigrationPending
            | MigrationError::NotExecutable(_)
            | MigrationError::RollbackNotPossible => StatusCode::CONFLICT,
            MigrationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type MigrationResult<T> = std::result::Result<T, MigrationError>;

/// True when some limitation of `current` has no equal or larger
/// counterpart of the same type in `target`.
pub fn requires_data_transfer(current: &PlanEntity, target: &PlanEntity) -> bool {
    current.limitations.iter().any(|limitation| {
        !target
            .find_limitation(&limitation.limitation_type)
            .is_some_and(|candidate| candidate.covers(limitation))
    })
}

pub struct PlanMigrationUseCase<P, S, Q, M>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
    M: PlanMigrationRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    quota_repo: Arc<Q>,
    migration_repo: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<P, S, Q, M> PlanMigrationUseCase<P, S, Q, M>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
    M: PlanMigrationRepository + Send + Sync + 'static,
{
    pub fn new(
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        quota_repo: Arc<Q>,
        migration_repo: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            quota_repo,
            migration_repo,
            clock,
        }
    }

    pub async fn migrate_plan(
        &self,
        subscription_id: Uuid,
        new_plan_id: Uuid,
        options: MigrationOptions,
    ) -> MigrationResult<PlanMigrationEntity> {
        let subscription = self.require_live_subscription(subscription_id).await?;

        if subscription.plan_id == new_plan_id {
            return Err(MigrationError::SamePlan);
        }

        let pending = self
            .migration_repo
            .list_by_subscription(subscription_id)
            .await?
            .into_iter()
            .any(|migration| migration.status == MigrationStatus::Scheduled);
        if pending {
            warn!(%subscription_id, "migrations: migration already scheduled");
            return Err(MigrationError::MigrationPending);
        }

        let current_plan = self.require_plan(subscription.plan_id).await?;
        let new_plan = self.require_plan(new_plan_id).await?;
        if !new_plan.is_active() {
            return Err(MigrationError::PlanInactive);
        }

        let now = self.clock.now();
        let days_remaining = (subscription.billing.next_billing_date - now)
            .num_days()
            .max(0);
        let effective_date = if options.immediate {
            now
        } else {
            options
                .effective_date
                .unwrap_or(subscription.billing.next_billing_date)
        };
        let rollback_deadline = effective_date
            .checked_add_signed(Duration::days(ROLLBACK_WINDOW_DAYS))
            .ok_or_else(|| {
                warn!(%subscription_id, %effective_date, "migrations: effective date out of range");
                MigrationError::InvalidEffectiveDate(effective_date)
            })?;

        let migration = PlanMigrationEntity {
            id: Uuid::new_v4(),
            subscription_id,
            user_id: subscription.user_id,
            from_plan_id: current_plan.id,
            to_plan_id: new_plan.id,
            migration_type: MigrationType::from_monthly_prices(
                current_plan.pricing.monthly,
                new_plan.pricing.monthly,
            ),
            status: MigrationStatus::Scheduled,
            effective_date,
            proration: Proration::linear(
                new_plan.pricing.monthly,
                days_remaining,
                &new_plan.pricing.currency,
            ),
            data_transfer: DataTransfer {
                required: requires_data_transfer(&current_plan, &new_plan),
                completed: false,
            },
            rollback: RollbackWindow {
                possible: true,
                deadline: rollback_deadline,
            },
            executed_at: None,
            created_at: now,
        };

        self.migration_repo
            .insert(migration.clone())
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "migrations: failed to store migration");
                MigrationError::Internal(err)
            })?;

        info!(
            %subscription_id,
            migration_id = %migration.id,
            from_plan_id = %migration.from_plan_id,
            to_plan_id = %migration.to_plan_id,
            migration_type = %migration.migration_type,
            proration = migration.proration.amount,
            "migrations: migration scheduled"
        );

        if options.immediate {
            return self.execute_migration(migration.id).await;
        }
        Ok(migration)
    }

    /// Moves the subscription onto the target plan, carrying consumption
    /// over for limitation types both plans share.
    pub async fn execute_migration(&self, migration_id: Uuid) -> MigrationResult<PlanMigrationEntity> {
        let mut migration = self.require_migration(migration_id).await?;
        if migration.status != MigrationStatus::Scheduled {
            return Err(MigrationError::NotExecutable(migration.status));
        }

        let subscription = self
            .require_live_subscription(migration.subscription_id)
            .await?;
        let target_plan = self.require_plan(migration.to_plan_id).await?;
        let now = self.clock.now();

        self.switch_plan(subscription, &target_plan, now).await?;

        migration.status = MigrationStatus::Completed;
        migration.data_transfer.completed = true;
        migration.executed_at = Some(now);
        self.migration_repo.update(migration.clone()).await?;

        info!(
            %migration_id,
            subscription_id = %migration.subscription_id,
            to_plan_id = %migration.to_plan_id,
            "migrations: migration executed"
        );
        Ok(migration)
    }

    pub async fn rollback_migration(
        &self,
        migration_id: Uuid,
    ) -> MigrationResult<PlanMigrationEntity> {
        let mut migration = self.require_migration(migration_id).await?;
        let now = self.clock.now();

        if migration.status != MigrationStatus::Completed
            || !migration.rollback.possible
            || now > migration.rollback.deadline
        {
            warn!(%migration_id, status = %migration.status, "migrations: rollback refused");
            return Err(MigrationError::RollbackNotPossible);
        }

        let subscription = self
            .require_live_subscription(migration.subscription_id)
            .await?;
        if subscription.plan_id != migration.to_plan_id {
            return Err(MigrationError::RollbackNotPossible);
        }

        let previous_plan = self.require_plan(migration.from_plan_id).await?;
        self.switch_plan(subscription, &previous_plan, now).await?;

        migration.status = MigrationStatus::RolledBack;
        migration.rollback.possible = false;
        self.migration_repo.update(migration.clone()).await?;

        info!(%migration_id, "migrations: migration rolled back");
        Ok(migration)
    }

    pub async fn list_migrations(
        &self,
        subscription_id: Uuid,
    ) -> MigrationResult<Vec<PlanMigrationEntity>> {
        Ok(self
            .migration_repo
            .list_by_subscription(subscription_id)
            .await?)
    }

    /// Executes scheduled migrations whose effective date has arrived.
    /// Failures are logged and left scheduled.
    pub async fn execute_due_migrations(&self, now: DateTime<Utc>) -> MigrationResult<usize> {
        let mut executed = 0;
        for migration in self.migration_repo.list_scheduled().await? {
            if migration.effective_date > now {
                continue;
            }
            match self.execute_migration(migration.id).await {
                Ok(_) => executed += 1,
                Err(err) => {
                    error!(migration_id = %migration.id, error = %err, "migrations: scheduled execution failed");
                }
            }
        }
        Ok(executed)
    }

    pub async fn execute_due(&self) -> MigrationResult<usize> {
        self.execute_due_migrations(self.clock.now()).await
    }

    async fn switch_plan(
        &self,
        mut subscription: SubscriptionEntity,
        plan: &PlanEntity,
        now: DateTime<Utc>,
    ) -> MigrationResult<()> {
        let user_id = subscription.user_id;
        let mut carried = None;
        for _ in 0..MAX_QUOTA_UPDATE_ATTEMPTS {
            let previous = self.quota_repo.find_by_user(user_id).await?;
            let quotas = QuotaEntity::carried_over(user_id, plan, previous.as_ref(), now);
            let stored = match &previous {
                Some(previous) => {
                    self.quota_repo
                        .replace_if_unchanged(previous, quotas.clone())
                        .await?
                }
                None => {
                    self.quota_repo.upsert(quotas.clone()).await?;
                    true
                }
            };
            if stored {
                carried = Some(quotas);
                break;
            }
        }
        let Some(quotas) = carried else {
            error!(%user_id, "migrations: gave up carrying over contended quotas");
            return Err(MigrationError::Internal(anyhow!(
                "quota record for user {user_id} kept changing"
            )));
        };

        subscription.plan_id = plan.id;
        subscription.usage = quotas.used_counters();
        subscription.updated_at = now;

        self.subscription_repo.update(subscription).await?;
        Ok(())
    }

    async fn require_live_subscription(
        &self,
        subscription_id: Uuid,
    ) -> MigrationResult<SubscriptionEntity> {
        let subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await?
            .ok_or(MigrationError::SubscriptionNotFound)?;
        if !subscription.is_live() {
            return Err(MigrationError::SubscriptionCancelled);
        }
        Ok(subscription)
    }

    async fn require_plan(&self, plan_id: Uuid) -> MigrationResult<PlanEntity> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or(MigrationError::PlanNotFound)
    }

    async fn require_migration(&self, migration_id: Uuid) -> MigrationResult<PlanMigrationEntity> {
        self.migration_repo
            .find_by_id(migration_id)
            .await?
            .ok_or(MigrationError::MigrationNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::{quotas::QuotaUseCase, subscriptions::SubscriptionUseCase};
    use crate::domain::{
        catalog::plans::{ENTERPRISE_PLAN_ID, PROFESSIONAL_PLAN_ID, STARTER_PLAN_ID, default_plans},
        clock::FixedClock,
        value_objects::plans::{Limitation, UNLIMITED},
    };
    use crate::infrastructure::in_memory::{
        migrations::PlanMigrationInMemory, plans::PlanInMemory, quotas::QuotaInMemory,
        subscriptions::SubscriptionInMemory,
    };
    use chrono::TimeZone;

    type Migrations =
        PlanMigrationUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory, PlanMigrationInMemory>;
    type Subscriptions = SubscriptionUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>;
    type Quotas = QuotaUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    struct Fixture {
        migrations: Migrations,
        subscriptions: Subscriptions,
        quotas: Quotas,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let plans = Arc::new(PlanInMemory::with_plans(default_plans(start())));
        let subscriptions = Arc::new(SubscriptionInMemory::new());
        let quotas = Arc::new(QuotaInMemory::new());
        let clock = Arc::new(FixedClock::new(start()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        Fixture {
            migrations: PlanMigrationUseCase::new(
                Arc::clone(&plans),
                Arc::clone(&subscriptions),
                Arc::clone(&quotas),
                Arc::new(PlanMigrationInMemory::new()),
                Arc::clone(&dyn_clock),
            ),
            subscriptions: SubscriptionUseCase::new(
                Arc::clone(&plans),
                Arc::clone(&subscriptions),
                Arc::clone(&quotas),
                Arc::clone(&dyn_clock),
            ),
            quotas: QuotaUseCase::new(plans, subscriptions, quotas, dyn_clock),
            clock,
        }
    }

    async fn subscribe(fixture: &Fixture, plan_id: Uuid) -> SubscriptionEntity {
        fixture
            .subscriptions
            .create_subscription(Uuid::new_v4(), plan_id, Default::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upgrade_prorates_remaining_days_at_new_daily_rate() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;
        // next billing is 30 days after start, leave 10 days
        fixture.clock.advance(Duration::days(20));

        let migration = fixture
            .migrations
            .migrate_plan(subscription.id, PROFESSIONAL_PLAN_ID, Default::default())
            .await
            .unwrap();

        assert_eq!(migration.migration_type, MigrationType::Upgrade);
        assert_eq!(migration.proration.amount, 8333.33);
        assert_eq!(migration.proration.currency, "XOF");
        assert_eq!(migration.status, MigrationStatus::Scheduled);
        assert_eq!(
            migration.effective_date,
            subscription.billing.next_billing_date
        );
        assert_eq!(
            migration.rollback.deadline,
            migration.effective_date + Duration::days(7)
        );
        assert!(!migration.data_transfer.required);
    }

    #[tokio::test]
    async fn effective_date_without_room_for_rollback_window_is_rejected() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;

        let result = fixture
            .migrations
            .migrate_plan(
                subscription.id,
                PROFESSIONAL_PLAN_ID,
                MigrationOptions {
                    immediate: false,
                    effective_date: Some(DateTime::<Utc>::MAX_UTC),
                },
            )
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, MigrationError::InvalidEffectiveDate(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(
            fixture
                .migrations
                .list_migrations(subscription.id)
                .await
                .unwrap()
                .is_empty()
        );

        // the last date that still fits a full rollback window is accepted
        let latest = DateTime::<Utc>::MAX_UTC - Duration::days(ROLLBACK_WINDOW_DAYS);
        let migration = fixture
            .migrations
            .migrate_plan(
                subscription.id,
                PROFESSIONAL_PLAN_ID,
                MigrationOptions {
                    immediate: false,
                    effective_date: Some(latest),
                },
            )
            .await
            .unwrap();
        assert_eq!(migration.rollback.deadline, DateTime::<Utc>::MAX_UTC);
    }

    #[tokio::test]
    async fn downgrade_requires_data_transfer() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, ENTERPRISE_PLAN_ID).await;

        let migration = fixture
            .migrations
            .migrate_plan(subscription.id, STARTER_PLAN_ID, Default::default())
            .await
            .unwrap();

        assert_eq!(migration.migration_type, MigrationType::Downgrade);
        assert!(migration.data_transfer.required);
    }

    #[tokio::test]
    async fn equal_price_is_a_change() {
        assert_eq!(
            MigrationType::from_monthly_prices(10000.0, 10000.0),
            MigrationType::Change
        );
        assert_eq!(
            MigrationType::from_monthly_prices(10000.0, 25000.0),
            MigrationType::Upgrade
        );
        assert_eq!(
            MigrationType::from_monthly_prices(25000.0, 10000.0),
            MigrationType::Downgrade
        );
    }

    #[test]
    fn data_transfer_detects_missing_or_smaller_limits() {
        let plans = default_plans(start());
        let (starter, professional, enterprise) = (&plans[0], &plans[1], &plans[2]);

        assert!(!requires_data_transfer(starter, professional));
        assert!(!requires_data_transfer(professional, enterprise));
        assert!(requires_data_transfer(enterprise, professional));

        let mut narrower = professional.clone();
        narrower.limitations.retain(|l| l.limitation_type != "users");
        assert!(requires_data_transfer(starter, &narrower));

        let mut unlimited_users = starter.clone();
        unlimited_users.limitations = vec![Limitation {
            limitation_type: "users".to_string(),
            value: UNLIMITED,
            unlimited: Some(true),
            period: None,
            overage: None,
        }];
        assert!(requires_data_transfer(&unlimited_users, professional));
    }

    #[tokio::test]
    async fn immediate_migration_switches_plan_and_keeps_usage() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;
        fixture
            .quotas
            .use_quota(subscription.user_id, "packages_per_month", 80)
            .await
            .unwrap();

        let migration = fixture
            .migrations
            .migrate_plan(
                subscription.id,
                PROFESSIONAL_PLAN_ID,
                MigrationOptions {
                    immediate: true,
                    effective_date: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(migration.status, MigrationStatus::Completed);
        assert!(migration.data_transfer.completed);
        assert_eq!(migration.effective_date, start());

        let current = fixture
            .subscriptions
            .get_subscription(subscription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.plan_id, PROFESSIONAL_PLAN_ID);
        assert_eq!(current.usage["packages_per_month"], 80);

        let quotas = fixture
            .quotas
            .get_quotas(subscription.user_id)
            .await
            .unwrap();
        assert_eq!(quotas.plan_id, PROFESSIONAL_PLAN_ID);
        assert_eq!(quotas.quotas["packages_per_month"].used, 80);
        assert_eq!(quotas.quotas["packages_per_month"].limit, 1000);
    }

    #[tokio::test]
    async fn rollback_restores_previous_plan_within_window() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;
        let immediate = MigrationOptions {
            immediate: true,
            effective_date: None,
        };

        let migration = fixture
            .migrations
            .migrate_plan(subscription.id, PROFESSIONAL_PLAN_ID, immediate.clone())
            .await
            .unwrap();
        fixture.clock.advance(Duration::days(3));

        let rolled_back = fixture
            .migrations
            .rollback_migration(migration.id)
            .await
            .unwrap();
        assert_eq!(rolled_back.status, MigrationStatus::RolledBack);
        assert!(!rolled_back.rollback.possible);

        let current = fixture
            .subscriptions
            .get_subscription(subscription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.plan_id, STARTER_PLAN_ID);

        assert!(matches!(
            fixture.migrations.rollback_migration(migration.id).await,
            Err(MigrationError::RollbackNotPossible)
        ));

        let second = fixture
            .migrations
            .migrate_plan(subscription.id, ENTERPRISE_PLAN_ID, immediate)
            .await
            .unwrap();
        fixture.clock.advance(Duration::days(8));
        assert!(matches!(
            fixture.migrations.rollback_migration(second.id).await,
            Err(MigrationError::RollbackNotPossible)
        ));
    }

    #[tokio::test]
    async fn scheduled_migrations_run_when_due() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;

        let migration = fixture
            .migrations
            .migrate_plan(subscription.id, PROFESSIONAL_PLAN_ID, Default::default())
            .await
            .unwrap();

        assert!(matches!(
            fixture
                .migrations
                .migrate_plan(subscription.id, ENTERPRISE_PLAN_ID, Default::default())
                .await,
            Err(MigrationError::MigrationPending)
        ));

        assert_eq!(fixture.migrations.execute_due().await.unwrap(), 0);

        fixture.clock.advance(Duration::days(30));
        assert_eq!(fixture.migrations.execute_due().await.unwrap(), 1);

        let history = fixture
            .migrations
            .list_migrations(subscription.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, migration.id);
        assert_eq!(history[0].status, MigrationStatus::Completed);

        assert!(matches!(
            fixture.migrations.execute_migration(migration.id).await,
            Err(MigrationError::NotExecutable(MigrationStatus::Completed))
        ));
    }

    #[tokio::test]
    async fn rejects_same_plan_and_cancelled_subscriptions() {
        let fixture = fixture();
        let subscription = subscribe(&fixture, STARTER_PLAN_ID).await;

        assert!(matches!(
            fixture
                .migrations
                .migrate_plan(subscription.id, STARTER_PLAN_ID, Default::default())
                .await,
            Err(MigrationError::SamePlan)
        ));
        assert!(matches!(
            fixture
                .migrations
                .migrate_plan(subscription.id, Uuid::new_v4(), Default::default())
                .await,
            Err(MigrationError::PlanNotFound)
        ));

        fixture
            .subscriptions
            .cancel_subscription(subscription.id)
            .await
            .unwrap();
        assert!(matches!(
            fixture
                .migrations
                .migrate_plan(subscription.id, PROFESSIONAL_PLAN_ID, Default::default())
                .await,
            Err(MigrationError::SubscriptionCancelled)
        ));
    }
}
