use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    ClientAdmin,
    ClientUser,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::ClientAdmin => "CLIENT_ADMIN",
            UserRole::ClientUser => "CLIENT_USER",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            "ADMIN" => Some(UserRole::Admin),
            "CLIENT_ADMIN" => Some(UserRole::ClientAdmin),
            "CLIENT_USER" => Some(UserRole::ClientUser),
            _ => None,
        }
    }

    pub fn is_platform_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::Admin)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
