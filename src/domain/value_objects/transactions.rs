use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    payment_methods::PaymentMethod, transaction_statuses::TransactionStatus,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTransactionsFilter {
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default, rename = "paymentMethod", alias = "payment_method")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, rename = "companyId", alias = "company_id")]
    pub company_id: Option<String>,
    #[serde(default, rename = "startDate", alias = "from")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, rename = "endDate", alias = "to")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionModel {
    pub company_id: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub description: Option<String>,
}
