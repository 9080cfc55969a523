use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use uuid::Uuid;

use super::Features;
use crate::{
    application::usecases::features::FeatureFlagUseCase,
    auth::{AdminUser, AuthUser},
    domain::{
        clock::Clock,
        value_objects::features::{ActivateAddonRequest, FeatureCheckDto, ListFeaturesQuery},
    },
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

fn features_usecase(db: &InMemoryDatabase, clock: Arc<dyn Clock>) -> Arc<Features> {
    Arc::new(FeatureFlagUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        Arc::clone(&db.addons),
        clock,
    ))
}

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    Router::new()
        .route("/", get(list_features))
        .route("/addons", get(list_addons))
        .route("/me", get(my_features))
        .route("/me/:code", get(check_feature))
        .with_state(features_usecase(&db, clock))
}

/// Add-on administration, nested under `/tenants`.
pub fn tenant_routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    Router::new()
        .route("/:id/addons", get(list_tenant_addons).post(activate_addon))
        .route("/:id/addons/:addon_id", delete(deactivate_addon))
        .with_state(features_usecase(&db, clock))
}

pub async fn list_features(
    State(features_usecase): State<Arc<Features>>,
    Query(query): Query<ListFeaturesQuery>,
) -> impl IntoResponse {
    Json(features_usecase.list_features(query.category))
}

pub async fn list_addons(State(features_usecase): State<Arc<Features>>) -> impl IntoResponse {
    Json(features_usecase.list_addons())
}

pub async fn my_features(
    State(features_usecase): State<Arc<Features>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        features_usecase.get_tenant_features(auth.user_id).await?,
    ))
}

pub async fn check_feature(
    State(features_usecase): State<Arc<Features>>,
    auth: AuthUser,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let enabled = features_usecase
        .is_feature_enabled(auth.user_id, &code)
        .await?;
    Ok(Json(FeatureCheckDto { code, enabled }))
}

pub async fn list_tenant_addons(
    State(features_usecase): State<Arc<Features>>,
    _admin: AdminUser,
    Path(tenant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        features_usecase.list_tenant_addons(tenant_id).await?,
    ))
}

pub async fn activate_addon(
    State(features_usecase): State<Arc<Features>>,
    _admin: AdminUser,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<ActivateAddonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let addon = features_usecase
        .activate_addon(tenant_id, &request.addon_id, request.expires_at)
        .await?;
    Ok((StatusCode::CREATED, Json(addon)))
}

pub async fn deactivate_addon(
    State(features_usecase): State<Arc<Features>>,
    _admin: AdminUser,
    Path((tenant_id, addon_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    features_usecase
        .deactivate_addon(tenant_id, &addon_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
