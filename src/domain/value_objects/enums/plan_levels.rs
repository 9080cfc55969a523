use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Tier of a plan. Features declare the minimum tier they need.
#[derive(
    Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum PlanLevel {
    #[default]
    Starter,
    Professional,
    Enterprise,
}

impl PlanLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanLevel::Starter => "starter",
            PlanLevel::Professional => "professional",
            PlanLevel::Enterprise => "enterprise",
        }
    }
}

impl Display for PlanLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
