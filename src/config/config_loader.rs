use anyhow::{Context, Result};

use super::config_model::{Auth, DotEnvyConfig, Maintenance, Server};
use crate::config::stage::Stage;

const DEFAULT_QUOTA_RESET_INTERVAL_SECS: u64 = 3600;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .context("SERVER_PORT is invalid")?
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .context("SERVER_BODY_LIMIT is invalid")?
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .context("SERVER_TIMEOUT is invalid")?
            .parse()?,
    };

    let auth = Auth {
        jwt_secret: get_jwt_secret()?,
    };

    let maintenance = Maintenance {
        quota_reset_interval_secs: match std::env::var("QUOTA_RESET_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse()
                .context("QUOTA_RESET_INTERVAL_SECS is invalid")?,
            Err(_) => DEFAULT_QUOTA_RESET_INTERVAL_SECS,
        },
    };
    if maintenance.quota_reset_interval_secs == 0 {
        anyhow::bail!("QUOTA_RESET_INTERVAL_SECS must be greater than zero");
    }

    Ok(DotEnvyConfig {
        server,
        auth,
        maintenance,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    std::env::var("JWT_SECRET").context("JWT_SECRET is invalid")
}
