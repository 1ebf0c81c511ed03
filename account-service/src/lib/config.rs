use std::env;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Signing secret used when none is configured. Local development only.
pub const DEVELOPMENT_JWT_SECRET: &str = "a-default-local-secret-that-is-very-secure-dev1441";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub gate: GateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. Unset means the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GateConfig {
    pub lookup_timeout_ms: u64,
}

impl GateConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `JWT_SECRET`, `PORT` and `DB_URI`
    /// 2. Environment variables (DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    /// 5. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 3000)?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.secret", DEVELOPMENT_JWT_SECRET)?
            .set_default("gate.lookup_timeout_ms", 5000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("server.http_port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("DB_URI").ok())?
            .build()?;

        configuration.try_deserialize()
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt.secret == DEVELOPMENT_JWT_SECRET
    }
}
