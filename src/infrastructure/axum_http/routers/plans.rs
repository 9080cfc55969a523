use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use uuid::Uuid;

use super::Plans;
use crate::{
    application::usecases::plans::PlanUseCase,
    auth::AdminUser,
    domain::{
        clock::Clock,
        value_objects::plans::{PlanDto, UpdatePlanStatusModel, UpsertPlanModel},
    },
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    let plans_usecase = PlanUseCase::new(
        Arc::clone(&db.plans),
        Arc::clone(&db.subscriptions),
        clock,
    );

    Router::new()
        .route("/", get(list_active_plans).post(create_plan))
        .route("/:id", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/:id/status", patch(set_plan_status))
        .with_state(Arc::new(plans_usecase))
}

pub async fn list_active_plans(
    State(plans_usecase): State<Arc<Plans>>,
) -> Result<impl IntoResponse, AppError> {
    let plans: Vec<PlanDto> = plans_usecase
        .get_active_plans()
        .await?
        .into_iter()
        .map(PlanDto::from)
        .collect();
    Ok(Json(plans))
}

pub async fn get_plan(
    State(plans_usecase): State<Arc<Plans>>,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plans_usecase
        .get_plan(plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("plan not found".to_string()))?;
    Ok(Json(PlanDto::from(plan)))
}

pub async fn create_plan(
    State(plans_usecase): State<Arc<Plans>>,
    _admin: AdminUser,
    Json(model): Json<UpsertPlanModel>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plans_usecase.create_plan(model).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan(
    State(plans_usecase): State<Arc<Plans>>,
    _admin: AdminUser,
    Path(plan_id): Path<Uuid>,
    Json(model): Json<UpsertPlanModel>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(plans_usecase.update_plan(plan_id, model).await?))
}

pub async fn set_plan_status(
    State(plans_usecase): State<Arc<Plans>>,
    _admin: AdminUser,
    Path(plan_id): Path<Uuid>,
    Json(model): Json<UpdatePlanStatusModel>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(
        plans_usecase.set_plan_status(plan_id, model.status).await?,
    ))
}

pub async fn delete_plan(
    State(plans_usecase): State<Arc<Plans>>,
    _admin: AdminUser,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    plans_usecase.delete_plan(plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
