// Configuration module entry point
// Loads the layered application configuration once at startup

mod types;

pub use types::{Config, PlayerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("VPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "localhost")?
            .set_default("server.port", 15555)?
            .set_default("player.command", "mpv")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.max_request_size", 2048)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make every connection fail
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.http.max_request_size == 0 {
            return Err(config::ConfigError::Message(
                "http.max_request_size must be greater than 0".to_string(),
            ));
        }
        if self.performance.read_timeout == 0 {
            return Err(config::ConfigError::Message(
                "performance.read_timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` string used for address resolution and log output
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
