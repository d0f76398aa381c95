use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Apply pending schema migrations before serving requests.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr.parse().map_err(|e| {
            ConfigError::Validation(format!("listen_addr {:?}: {e}", self.listen_addr))
        })
    }

    /// Checks that cannot be expressed through deserialization alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_url must not be empty".into(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_run_migrations() -> bool {
    true
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching a key path separated by double
/// underscores overrides the file value, e.g. `DATABASE_URL` or `LISTEN_ADDR`.
/// The file is optional so a deployment can be configured from the
/// environment only.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}
