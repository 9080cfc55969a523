pub mod enums;
pub mod features;
pub mod migrations;
pub mod plans;
pub mod quotas;
pub mod subscriptions;
pub mod transactions;
