use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{
    clock::Clock,
    entities::transactions::TransactionEntity,
    repositories::transactions::TransactionRepository,
    value_objects::transactions::{
        CreateTransactionModel, DEFAULT_PAGE_SIZE, ListTransactionsFilter, MAX_PAGE_SIZE, Page,
    },
};

const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TransactionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            TransactionError::InvalidTransaction(_) => StatusCode::BAD_REQUEST,
            TransactionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type TransactionResult<T> = std::result::Result<T, TransactionError>;

pub struct TransactionUseCase<T>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    transaction_repo: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<T> TransactionUseCase<T>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    pub fn new(transaction_repo: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transaction_repo,
            clock,
        }
    }

    /// Newest first. `page` starts at 1.
    pub async fn list(
        &self,
        filter: ListTransactionsFilter,
    ) -> TransactionResult<Page<TransactionEntity>> {
        let page = filter.page.unwrap_or(1).max(1);
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut matching: Vec<_> = self
            .transaction_repo
            .list_transactions()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "transactions: failed to list transactions");
                TransactionError::Internal(err)
            })?
            .into_iter()
            .filter(|transaction| Self::matches(&filter, transaction))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let data = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(Page {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    pub async fn create(
        &self,
        model: CreateTransactionModel,
    ) -> TransactionResult<TransactionEntity> {
        if !model.amount.is_finite() || model.amount <= 0.0 {
            return Err(TransactionError::InvalidTransaction(
                "amount must be positive".to_string(),
            ));
        }
        if model.company_id.trim().is_empty() {
            return Err(TransactionError::InvalidTransaction(
                "company_id is required".to_string(),
            ));
        }

        let now = self.clock.now();
        let sequence = self.transaction_repo.next_sequence().await?;
        let transaction = TransactionEntity {
            id: format!("TXN-{sequence}"),
            reference: generate_reference(now),
            company_id: model.company_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
            payment_method: model.payment_method,
            description: model.description,
            created_at: now,
        };

        self.transaction_repo.insert(transaction.clone()).await?;
        info!(
            transaction_id = %transaction.id,
            reference = %transaction.reference,
            "transactions: transaction recorded"
        );
        Ok(transaction)
    }

    fn matches(filter: &ListTransactionsFilter, transaction: &TransactionEntity) -> bool {
        filter.status.is_none_or(|status| transaction.status == status)
            && filter
                .payment_method
                .is_none_or(|method| transaction.payment_method == method)
            && filter
                .company_id
                .as_deref()
                .is_none_or(|company_id| transaction.company_id == company_id)
            && filter.from.is_none_or(|from| transaction.created_at >= from)
            && filter.to.is_none_or(|to| transaction.created_at <= to)
    }
}

fn generate_reference(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("REF-{}-{}", now.format("%Y%m%d"), suffix)
}
