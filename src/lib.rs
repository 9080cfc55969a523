pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::info;

use application::{
    services::maintenance_loop,
    usecases::{migrations::PlanMigrationUseCase, quotas::QuotaUseCase},
};
use domain::clock::{Clock, SystemClock};
use infrastructure::{axum_http::http_serve, in_memory::InMemoryDatabase};

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("freight-entitlements")?;

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let database = Arc::new(InMemoryDatabase::seeded(clock.now()).await?);
    info!("In-memory database has been seeded");

    let quota_usecase = Arc::new(QuotaUseCase::new(
        Arc::clone(&database.plans),
        Arc::clone(&database.subscriptions),
        Arc::clone(&database.quotas),
        Arc::clone(&clock),
    ));
    let migration_usecase = Arc::new(PlanMigrationUseCase::new(
        Arc::clone(&database.plans),
        Arc::clone(&database.subscriptions),
        Arc::clone(&database.quotas),
        Arc::clone(&database.migrations),
        Arc::clone(&clock),
    ));
    tokio::spawn(maintenance_loop::run_maintenance_loop(
        quota_usecase,
        migration_usecase,
        Duration::from_secs(dotenvy_env.maintenance.quota_reset_interval_secs),
    ));

    http_serve::start(Arc::new(dotenvy_env), database, clock).await?;

    Ok(())
}
