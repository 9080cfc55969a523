use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationType {
    Upgrade,
    Downgrade,
    Change,
}

impl MigrationType {
    /// Derived only from the monthly price of both plans.
    pub fn from_monthly_prices(current_monthly: f64, new_monthly: f64) -> Self {
        if new_monthly > current_monthly {
            MigrationType::Upgrade
        } else if new_monthly < current_monthly {
            MigrationType::Downgrade
        } else {
            MigrationType::Change
        }
    }
}

impl Display for MigrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            MigrationType::Upgrade => "upgrade",
            MigrationType::Downgrade => "downgrade",
            MigrationType::Change => "change",
        };
        write!(f, "{}", value)
    }
}
