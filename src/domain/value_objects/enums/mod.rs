pub mod feature_categories;
pub mod invoice_statuses;
pub mod limitation_periods;
pub mod migration_statuses;
pub mod migration_types;
pub mod payment_methods;
pub mod plan_levels;
pub mod plan_statuses;
pub mod subscription_statuses;
pub mod transaction_statuses;
pub mod user_roles;
