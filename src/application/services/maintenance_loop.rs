use std::{sync::Arc, time::Duration};

use tracing::{error, info};

use crate::application::usecases::{migrations::PlanMigrationUseCase, quotas::QuotaUseCase};
use crate::domain::repositories::{
    migrations::PlanMigrationRepository, plans::PlanRepository, quotas::QuotaRepository,
    subscriptions::SubscriptionRepository,
};

/// Periodic job resetting elapsed quotas and applying due plan migrations.
pub async fn run_maintenance_loop<P, S, Q, M>(
    quota_usecase: Arc<QuotaUseCase<P, S, Q>>,
    migration_usecase: Arc<PlanMigrationUseCase<P, S, Q, M>>,
    interval: Duration,
) where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
    M: PlanMigrationRepository + Send + Sync + 'static,
{
    info!(interval_secs = interval.as_secs(), "maintenance: loop started");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        run_once(&quota_usecase, &migration_usecase).await;
    }
}

pub async fn run_once<P, S, Q, M>(
    quota_usecase: &QuotaUseCase<P, S, Q>,
    migration_usecase: &PlanMigrationUseCase<P, S, Q, M>,
) where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    Q: QuotaRepository + Send + Sync + 'static,
    M: PlanMigrationRepository + Send + Sync + 'static,
{
    match migration_usecase.execute_due().await {
        Ok(0) => {}
        Ok(executed) => info!(executed, "maintenance: scheduled migrations applied"),
        Err(e) => error!("Error while applying scheduled migrations: {}", e),
    }

    if let Err(e) = quota_usecase.reset_due_quotas().await {
        error!("Error while resetting quotas: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::usecases::subscriptions::SubscriptionUseCase;
    use crate::domain::{
        catalog::plans::{PROFESSIONAL_PLAN_ID, STARTER_PLAN_ID},
        clock::{Clock, FixedClock},
        repositories::{quotas::QuotaRepository, subscriptions::SubscriptionRepository},
    };
    use crate::infrastructure::in_memory::InMemoryDatabase;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use uuid::Uuid;

    #[tokio::test]
    async fn applies_due_migrations_then_resets_quotas() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        let database = InMemoryDatabase::seeded(start).await.unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let subscriptions = SubscriptionUseCase::new(
            Arc::clone(&database.plans),
            Arc::clone(&database.subscriptions),
            Arc::clone(&database.quotas),
            Arc::clone(&dyn_clock),
        );
        let quotas = QuotaUseCase::new(
            Arc::clone(&database.plans),
            Arc::clone(&database.subscriptions),
            Arc::clone(&database.quotas),
            Arc::clone(&dyn_clock),
        );
        let migrations = PlanMigrationUseCase::new(
            Arc::clone(&database.plans),
            Arc::clone(&database.subscriptions),
            Arc::clone(&database.quotas),
            Arc::clone(&database.migrations),
            dyn_clock,
        );

        let user_id = Uuid::new_v4();
        let subscription = subscriptions
            .create_subscription(user_id, STARTER_PLAN_ID, Default::default())
            .await
            .unwrap();
        quotas
            .use_quota(user_id, "packages_per_month", 40)
            .await
            .unwrap();
        migrations
            .migrate_plan(subscription.id, PROFESSIONAL_PLAN_ID, Default::default())
            .await
            .unwrap();

        clock.advance(ChronoDuration::days(31));
        run_once(&quotas, &migrations).await;

        let current = database
            .subscriptions
            .find_by_id(subscription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.plan_id, PROFESSIONAL_PLAN_ID);

        let tracked = database.quotas.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(tracked.quotas["packages_per_month"].used, 0);
        assert_eq!(tracked.quotas["packages_per_month"].limit, 1000);
    }
}
