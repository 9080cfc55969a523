use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days after the effective date during which a migration can be undone.
pub const ROLLBACK_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proration {
    pub enabled: bool,
    pub amount: f64,
    pub currency: String,
}

impl Proration {
    /// Linear day rate of the new plan over a 30 day month, rounded to cents.
    pub fn linear(new_monthly: f64, days_remaining: i64, currency: &str) -> Self {
        let raw = new_monthly / 30.0 * days_remaining.max(0) as f64;
        Self {
            enabled: true,
            amount: (raw * 100.0).round() / 100.0,
            currency: currency.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataTransfer {
    pub required: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackWindow {
    pub possible: bool,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationOptions {
    #[serde(default)]
    pub immediate: bool,
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigratePlanRequest {
    pub plan_id: Uuid,
    #[serde(flatten)]
    pub options: MigrationOptions,
}
