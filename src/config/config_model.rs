#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub auth: Auth,
    pub maintenance: Maintenance,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    /// Request body limit in megabytes.
    pub body_limit: u64,
    /// Request timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Maintenance {
    pub quota_reset_interval_secs: u64,
}
