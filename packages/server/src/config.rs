use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in days.
    pub token_ttl_days: i64,
}

/// Tuning for the admin dashboard snapshot cache.
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Maximum age at which a cached snapshot is still served, in seconds.
    pub cache_ttl_secs: u64,
}

/// Tuning for the results watcher.
#[derive(Debug, Deserialize, Clone)]
pub struct ResultsConfig {
    /// Interval between polling passes, in seconds.
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub dashboard: DashboardConfig,
    pub results: ResultsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("dashboard.cache_ttl_secs", 300)?
            .set_default("results.poll_interval_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., VHACK__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("VHACK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
