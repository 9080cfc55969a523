use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    #[default]
    Scheduled,
    Completed,
    RolledBack,
}

impl Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            MigrationStatus::Scheduled => "scheduled",
            MigrationStatus::Completed => "completed",
            MigrationStatus::RolledBack => "rolled_back",
        };
        write!(f, "{}", value)
    }
}
