use std::time::Duration;

use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Upper bound on any single store call (QUERY_TIMEOUT_SECS, default 30)
    pub query_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        let query_timeout_secs: u64 = env_or_default("QUERY_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| eyre::eyre!("Invalid QUERY_TIMEOUT_SECS: {}", e))?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            query_timeout: Duration::from_secs(query_timeout_secs),
        })
    }
}
