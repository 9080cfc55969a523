use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use super::Quotas;
use crate::{
    application::usecases::quotas::QuotaUseCase,
    auth::{AdminUser, AuthUser},
    domain::{clock::Clock, value_objects::quotas::QuotaRequest},
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    let quotas_usecase = QuotaUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        Arc::clone(&db.quotas),
        clock,
    );

    Router::new()
        .route("/", get(get_quotas))
        .route("/check", post(check_limit))
        .route("/use", post(use_quota))
        .route("/reset", post(reset_quotas))
        .with_state(Arc::new(quotas_usecase))
}

pub async fn get_quotas(
    State(quotas_usecase): State<Arc<Quotas>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(quotas_usecase.get_quotas(auth.user_id).await?))
}

pub async fn check_limit(
    State(quotas_usecase): State<Arc<Quotas>>,
    auth: AuthUser,
    Json(request): Json<QuotaRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        quotas_usecase
            .check_limit(auth.user_id, &request.quota_type, request.amount)
            .await?,
    ))
}

pub async fn use_quota(
    State(quotas_usecase): State<Arc<Quotas>>,
    auth: AuthUser,
    Json(request): Json<QuotaRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        quotas_usecase
            .use_quota(auth.user_id, &request.quota_type, request.amount)
            .await?,
    ))
}

pub async fn reset_quotas(
    State(quotas_usecase): State<Arc<Quotas>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let reset = quotas_usecase.reset_due_quotas().await?;
    Ok(Json(json!({ "reset": reset })))
}
