pub mod addons;
pub mod migrations;
pub mod plans;
pub mod quotas;
pub mod subscriptions;
pub mod transactions;
