use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Consumption tracked against one limitation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaEntry {
    pub used: i64,
    pub limit: i64,
    pub reset_date: DateTime<Utc>,
    pub overage: i64,
}

/// Outcome of a quota check. `remaining` is `None` for uncapped quotas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaCheck {
    pub allowed: bool,
    pub remaining: Option<i64>,
    pub overage: i64,
}

impl QuotaCheck {
    pub fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: None,
            overage: 0,
        }
    }

    pub fn evaluate(entry: &QuotaEntry, amount: i64) -> Self {
        if entry.limit == crate::domain::value_objects::plans::UNLIMITED {
            return Self::unlimited();
        }

        let remaining = entry.limit.saturating_sub(entry.used);
        Self {
            allowed: remaining >= amount,
            remaining: Some(remaining),
            overage: amount.saturating_sub(remaining).max(0),
        }
    }
}

/// Attempts at a conditional quota write before giving up on a contended record.
pub const MAX_QUOTA_UPDATE_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaUsage {
    #[serde(rename = "type")]
    pub quota_type: String,
    pub used: i64,
    pub limit: i64,
    pub overage_applied: i64,
    pub tracked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaRequest {
    #[serde(rename = "type")]
    pub quota_type: String,
    pub amount: i64,
}
