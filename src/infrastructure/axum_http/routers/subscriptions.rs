use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::warn;
use uuid::Uuid;

use super::{Migrations, Subscriptions};
use crate::{
    application::usecases::{migrations::PlanMigrationUseCase, subscriptions::SubscriptionUseCase},
    auth::AuthUser,
    domain::{
        clock::Clock,
        entities::subscriptions::SubscriptionEntity,
        value_objects::{
            migrations::MigratePlanRequest, subscriptions::CreateSubscriptionRequest,
        },
    },
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    let subscriptions_usecase = Arc::new(SubscriptionUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        Arc::clone(&db.quotas),
        Arc::clone(&clock),
    ));
    let migrations_usecase = Arc::new(PlanMigrationUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        Arc::clone(&db.quotas),
        Arc::clone(&db.migrations),
        clock,
    ));

    let migration_routes = Router::new()
        .route("/:id/migrations", get(list_migrations).post(migrate_plan))
        .with_state((Arc::clone(&subscriptions_usecase), migrations_usecase));

    Router::new()
        .route("/", post(subscribe))
        .route("/current", get(current_subscription))
        .route("/:id", get(get_subscription))
        .route("/:id/cancel", post(cancel_subscription))
        .with_state(subscriptions_usecase)
        .merge(migration_routes)
}

/// Loads a subscription the caller owns. Other tenants' subscriptions are
/// reported as missing unless the caller is a platform admin.
async fn owned_subscription(
    subscriptions_usecase: &Subscriptions,
    auth: &AuthUser,
    subscription_id: Uuid,
) -> Result<SubscriptionEntity, AppError> {
    let subscription = subscriptions_usecase
        .get_subscription(subscription_id)
        .await?
        .ok_or_else(|| AppError::NotFound("subscription not found".to_string()))?;

    if subscription.user_id != auth.user_id && !auth.role.is_platform_admin() {
        warn!(
            user_id = %auth.user_id,
            %subscription_id,
            "subscriptions: access to foreign subscription refused"
        );
        return Err(AppError::NotFound("subscription not found".to_string()));
    }
    Ok(subscription)
}

pub async fn subscribe(
    State(subscriptions_usecase): State<Arc<Subscriptions>>,
    auth: AuthUser,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = subscriptions_usecase
        .create_subscription(auth.user_id, request.plan_id, request.options)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn current_subscription(
    State(subscriptions_usecase): State<Arc<Subscriptions>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let subscription = subscriptions_usecase
        .get_user_subscription(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("no active subscription".to_string()))?;
    Ok(Json(subscription))
}

pub async fn get_subscription(
    State(subscriptions_usecase): State<Arc<Subscriptions>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        owned_subscription(&subscriptions_usecase, &auth, subscription_id).await?,
    ))
}

pub async fn cancel_subscription(
    State(subscriptions_usecase): State<Arc<Subscriptions>>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    owned_subscription(&subscriptions_usecase, &auth, subscription_id).await?;
    Ok(Json(
        subscriptions_usecase
            .cancel_subscription(subscription_id)
            .await?,
    ))
}

pub async fn migrate_plan(
    State((subscriptions_usecase, migrations_usecase)): State<(
        Arc<Subscriptions>,
        Arc<Migrations>,
    )>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
    Json(request): Json<MigratePlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    owned_subscription(&subscriptions_usecase, &auth, subscription_id).await?;
    let migration = migrations_usecase
        .migrate_plan(subscription_id, request.plan_id, request.options)
        .await?;
    Ok((StatusCode::CREATED, Json(migration)))
}

pub async fn list_migrations(
    State((subscriptions_usecase, migrations_usecase)): State<(
        Arc<Subscriptions>,
        Arc<Migrations>,
    )>,
    auth: AuthUser,
    Path(subscription_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    owned_subscription(&subscriptions_usecase, &auth, subscription_id).await?;
    Ok(Json(
        migrations_usecase.list_migrations(subscription_id).await?,
    ))
}
