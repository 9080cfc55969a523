use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    payment_methods::PaymentMethod, transaction_statuses::TransactionStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionEntity {
    pub id: String,
    pub reference: String,
    pub company_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
