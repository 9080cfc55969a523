use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use super::Migrations;
use crate::{
    application::usecases::migrations::PlanMigrationUseCase,
    auth::AdminUser,
    domain::clock::Clock,
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    let migrations_usecase = PlanMigrationUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        Arc::clone(&db.quotas),
        Arc::clone(&db.migrations),
        clock,
    );

    Router::new()
        .route("/:id/execute", post(execute_migration))
        .route("/:id/rollback", post(rollback_migration))
        .with_state(Arc::new(migrations_usecase))
}

pub async fn execute_migration(
    State(migrations_usecase): State<Arc<Migrations>>,
    _admin: AdminUser,
    Path(migration_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        migrations_usecase.execute_migration(migration_id).await?,
    ))
}

pub async fn rollback_migration(
    State(migrations_usecase): State<Arc<Migrations>>,
    _admin: AdminUser,
    Path(migration_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        migrations_usecase.rollback_migration(migration_id).await?,
    ))
}
