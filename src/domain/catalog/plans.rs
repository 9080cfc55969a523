//! Default plan catalog loaded at startup.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;
use crate::domain::value_objects::{
    enums::{
        limitation_periods::LimitationPeriod, plan_levels::PlanLevel, plan_statuses::PlanStatus,
    },
    plans::{Limitation, OveragePolicy, PlanMetadata, Pricing, TrialConfig, UNLIMITED},
};

pub const STARTER_PLAN_ID: Uuid = Uuid::from_u128(0x5d7c_0001_0000_4000_8000_0000_0000_0001);
pub const PROFESSIONAL_PLAN_ID: Uuid = Uuid::from_u128(0x5d7c_0001_0000_4000_8000_0000_0000_0002);
pub const ENTERPRISE_PLAN_ID: Uuid = Uuid::from_u128(0x5d7c_0001_0000_4000_8000_0000_0000_0003);

fn limitation(
    limitation_type: &str,
    value: i64,
    period: Option<LimitationPeriod>,
    overage_price: Option<f64>,
) -> Limitation {
    Limitation {
        limitation_type: limitation_type.to_string(),
        value,
        unlimited: Some(value == UNLIMITED),
        period,
        overage: overage_price.map(|price| OveragePolicy {
            allowed: true,
            price_per_unit: Some(price),
        }),
    }
}

pub fn default_plans(now: DateTime<Utc>) -> Vec<PlanEntity> {
    vec![
        PlanEntity {
            id: STARTER_PLAN_ID,
            name: "Starter".to_string(),
            description: Some("Small forwarders shipping a few containers a month".to_string()),
            level: PlanLevel::Starter,
            pricing: Pricing {
                monthly: 10000.0,
                yearly: 100000.0,
                currency: "XOF".to_string(),
            },
            features: Vec::new(),
            limitations: vec![
                limitation("packages_per_month", 100, Some(LimitationPeriod::Monthly), None),
                limitation("quotes_per_day", 20, Some(LimitationPeriod::Daily), None),
                limitation("users", 3, None, None),
            ],
            permissions: vec!["packages:read".to_string(), "packages:write".to_string()],
            trial: TrialConfig {
                enabled: true,
                duration: 14,
            },
            status: PlanStatus::Active,
            metadata: PlanMetadata {
                order: 1,
                popular: false,
            },
            created_at: now,
            updated_at: now,
        },
        PlanEntity {
            id: PROFESSIONAL_PLAN_ID,
            name: "Professional".to_string(),
            description: Some("Growing logistics companies with a warehouse network".to_string()),
            level: PlanLevel::Professional,
            pricing: Pricing {
                monthly: 25000.0,
                yearly: 250000.0,
                currency: "XOF".to_string(),
            },
            features: Vec::new(),
            limitations: vec![
                limitation(
                    "packages_per_month",
                    1000,
                    Some(LimitationPeriod::Monthly),
                    Some(50.0),
                ),
                limitation("quotes_per_day", 200, Some(LimitationPeriod::Daily), None),
                limitation("users", 15, None, None),
            ],
            permissions: vec![
                "packages:read".to_string(),
                "packages:write".to_string(),
                "payments:read".to_string(),
                "team:manage".to_string(),
            ],
            trial: TrialConfig {
                enabled: true,
                duration: 14,
            },
            status: PlanStatus::Active,
            metadata: PlanMetadata {
                order: 2,
                popular: true,
            },
            created_at: now,
            updated_at: now,
        },
        PlanEntity {
            id: ENTERPRISE_PLAN_ID,
            name: "Enterprise".to_string(),
            description: Some("Carriers and consolidators operating at scale".to_string()),
            level: PlanLevel::Enterprise,
            pricing: Pricing {
                monthly: 75000.0,
                yearly: 750000.0,
                currency: "XOF".to_string(),
            },
            features: Vec::new(),
            limitations: vec![
                limitation(
                    "packages_per_month",
                    UNLIMITED,
                    Some(LimitationPeriod::Monthly),
                    None,
                ),
                limitation("quotes_per_day", UNLIMITED, Some(LimitationPeriod::Daily), None),
                limitation("users", 100, None, Some(500.0)),
            ],
            permissions: vec![
                "packages:read".to_string(),
                "packages:write".to_string(),
                "payments:read".to_string(),
                "payments:write".to_string(),
                "team:manage".to_string(),
                "api:access".to_string(),
            ],
            trial: TrialConfig {
                enabled: false,
                duration: 0,
            },
            status: PlanStatus::Active,
            metadata: PlanMetadata {
                order: 3,
                popular: false,
            },
            created_at: now,
            updated_at: now,
        },
    ]
}
