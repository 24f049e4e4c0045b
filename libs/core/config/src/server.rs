use crate::{ConfigError, FromEnv, env_or_default};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// HTTP listener configuration.
///
/// Loaded from `HOST` (default: all interfaces) and `PORT` (default: 8080).
/// A port of 0 asks the OS for an ephemeral port, which test setups use to
/// avoid collisions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Listener address in the `host:port` form `TcpListener::bind` takes.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", DEFAULT_HOST);

        let raw_port = env_or_default("PORT", &DEFAULT_PORT.to_string());
        let port = raw_port.parse().map_err(|e| ConfigError::ParseError {
            key: "PORT".to_string(),
            details: format!("{} (value: {:?})", e, raw_port),
        })?;

        Ok(Self { host, port })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
