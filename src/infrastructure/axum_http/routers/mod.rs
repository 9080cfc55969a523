pub mod features;
pub mod migrations;
pub mod plans;
pub mod quotas;
pub mod subscriptions;
pub mod transactions;

use crate::application::usecases::{
    features::FeatureFlagUseCase, migrations::PlanMigrationUseCase, plans::PlanUseCase,
    quotas::QuotaUseCase, subscriptions::SubscriptionUseCase, transactions::TransactionUseCase,
};
use crate::infrastructure::in_memory::{
    addons::TenantAddonInMemory, migrations::PlanMigrationInMemory, plans::PlanInMemory,
    quotas::QuotaInMemory, subscriptions::SubscriptionInMemory,
    transactions::TransactionInMemory,
};

pub type Plans = PlanUseCase<PlanInMemory, SubscriptionInMemory>;
pub type Subscriptions = SubscriptionUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>;
pub type Migrations =
    PlanMigrationUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory, PlanMigrationInMemory>;
pub type Quotas = QuotaUseCase<PlanInMemory, SubscriptionInMemory, QuotaInMemory>;
pub type Features = FeatureFlagUseCase<PlanInMemory, SubscriptionInMemory, TenantAddonInMemory>;
pub type Transactions = TransactionUseCase<TransactionInMemory>;
