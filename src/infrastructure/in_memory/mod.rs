pub mod addons;
pub mod migrations;
pub mod plans;
pub mod quotas;
pub mod subscriptions;
pub mod transactions;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    catalog::plans::default_plans,
    entities::transactions::TransactionEntity,
    repositories::transactions::TransactionRepository,
    value_objects::enums::{payment_methods::PaymentMethod, transaction_statuses::TransactionStatus},
};

use self::{
    addons::TenantAddonInMemory, migrations::PlanMigrationInMemory, plans::PlanInMemory,
    quotas::QuotaInMemory, subscriptions::SubscriptionInMemory,
    transactions::TransactionInMemory,
};

/// Every repository of the process, shared by the routers.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    pub plans: Arc<PlanInMemory>,
    pub subscriptions: Arc<SubscriptionInMemory>,
    pub quotas: Arc<QuotaInMemory>,
    pub migrations: Arc<PlanMigrationInMemory>,
    pub addons: Arc<TenantAddonInMemory>,
    pub transactions: Arc<TransactionInMemory>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database holding the default plan catalog and sample transactions.
    pub async fn seeded(now: DateTime<Utc>) -> Result<Self> {
        let database = Self {
            plans: Arc::new(PlanInMemory::with_plans(default_plans(now))),
            ..Self::default()
        };

        for (offset_days, company_id, amount, status, payment_method, description) in [
            (1, "cmp-lagos-01", 450000.0, TransactionStatus::Completed, PaymentMethod::BankTransfer, "Sea freight Guangzhou to Lagos"),
            (2, "cmp-accra-02", 120000.0, TransactionStatus::Pending, PaymentMethod::MobileMoney, "Air cargo Shenzhen to Accra"),
            (3, "cmp-lagos-01", 75000.0, TransactionStatus::Failed, PaymentMethod::Card, "Customs clearance fees"),
            (5, "cmp-dakar-03", 300000.0, TransactionStatus::Completed, PaymentMethod::Cash, "Consolidated container Yiwu to Dakar"),
            (8, "cmp-accra-02", 60000.0, TransactionStatus::Refunded, PaymentMethod::Card, "Duplicate warehouse fee"),
        ] {
            let sequence = database.transactions.next_sequence().await?;
            let created_at = now - Duration::days(offset_days);
            database
                .transactions
                .insert(TransactionEntity {
                    id: format!("TXN-{sequence}"),
                    reference: format!("REF-{}-SEED{:02}", created_at.format("%Y%m%d"), sequence),
                    company_id: company_id.to_string(),
                    amount,
                    currency: "XOF".to_string(),
                    status,
                    payment_method,
                    description: Some(description.to_string()),
                    created_at,
                })
                .await?;
        }

        Ok(database)
    }
}
