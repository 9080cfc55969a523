use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    invoice_statuses::InvoiceStatus, payment_methods::PaymentMethod,
};

/// Days between two billing dates.
pub const BILLING_CYCLE_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingInfo {
    pub next_billing_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSubscriptionOptions {
    #[serde(default)]
    pub trial: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customizations: Option<BTreeMap<String, serde_json::Value>>,
}

/// Request body for subscribing the calling user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
    #[serde(flatten)]
    pub options: CreateSubscriptionOptions,
}
