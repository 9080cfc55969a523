use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::warn;

use super::Transactions;
use crate::{
    application::usecases::transactions::TransactionUseCase,
    auth::{AdminUser, AuthUser},
    domain::{
        clock::Clock,
        value_objects::transactions::{CreateTransactionModel, ListTransactionsFilter},
    },
    infrastructure::{axum_http::error_responses::AppError, in_memory::InMemoryDatabase},
};

pub fn routes(db: Arc<InMemoryDatabase>, clock: Arc<dyn Clock>) -> Router {
    let transactions_usecase = TransactionUseCase::new(Arc::clone(&db.transactions), clock);

    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .with_state(Arc::new(transactions_usecase))
}

/// Platform admins see every company. Client roles only see their own
/// company, whatever `companyId` they ask for.
pub async fn list_transactions(
    State(transactions_usecase): State<Arc<Transactions>>,
    auth: AuthUser,
    Query(mut filter): Query<ListTransactionsFilter>,
) -> Result<impl IntoResponse, AppError> {
    if !auth.role.is_platform_admin() {
        let Some(company_id) = auth.company_id else {
            warn!(user_id = %auth.user_id, "transactions: client without company listed transactions");
            return Err(AppError::Forbidden);
        };
        filter.company_id = Some(company_id);
    }
    Ok(Json(transactions_usecase.list(filter).await?))
}

pub async fn create_transaction(
    State(transactions_usecase): State<Arc<Transactions>>,
    _admin: AdminUser,
    Json(model): Json<CreateTransactionModel>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = transactions_usecase.create(model).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
