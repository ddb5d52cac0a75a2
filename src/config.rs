use crate::exercises::ItemLimits;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the batch server.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP listener binds on all interfaces.
    pub server_port: u16,
    /// Deadline for reading a complete request body.
    pub read_timeout: Duration,
    /// Deadline for producing a complete response.
    pub write_timeout: Duration,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
    /// Largest result a single item may expand into, in bytes.
    pub max_item_output_bytes: usize,
}

/// Default per-item output budget as a multiple of the body limit.
pub const OUTPUT_BUDGET_FACTOR: usize = 16;

impl Default for Config {
    fn default() -> Self {
        let max_body_bytes = 2 * 1024 * 1024;
        Self {
            server_port: 8080,
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(4),
            max_body_bytes,
            max_item_output_bytes: max_body_bytes * OUTPUT_BUDGET_FACTOR,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_body_bytes = parse_env("MAX_BODY_BYTES")?.unwrap_or(defaults.max_body_bytes);
        Ok(Self {
            server_port: parse_env("SERVER_PORT")?.unwrap_or(defaults.server_port),
            read_timeout: parse_env("READ_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.read_timeout),
            write_timeout: parse_env("WRITE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.write_timeout),
            max_body_bytes,
            max_item_output_bytes: parse_env("MAX_ITEM_OUTPUT_BYTES")?
                .unwrap_or_else(|| max_body_bytes.saturating_mul(OUTPUT_BUDGET_FACTOR)),
        })
    }

    /// Per-item limits handed to the processors.
    pub fn item_limits(&self) -> ItemLimits {
        ItemLimits {
            max_output_bytes: self.max_item_output_bytes,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        server_port = config.server_port,
        read_timeout = ?config.read_timeout,
        write_timeout = ?config.write_timeout,
        max_body_bytes = config.max_body_bytes,
        max_item_output_bytes = config.max_item_output_bytes,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert_eq!(config.write_timeout, Duration::from_secs(4));
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert_eq!(config.item_limits(), ItemLimits::default());
    }

    #[test]
    fn unset_variables_parse_to_none() {
        let value: Option<u16> =
            parse_env("PARBATCH_TEST_SURELY_UNSET_VARIABLE").expect("unset is not an error");
        assert!(value.is_none());
    }

    #[test]
    fn unparsable_values_name_the_variable() {
        const KEY: &str = "PARBATCH_TEST_UNPARSABLE_PORT";
        // SAFETY: the variable name is unique to this test, so no other thread reads or writes it.
        unsafe { env::set_var(KEY, "abc") };
        let result = parse_env::<u16>(KEY);
        unsafe { env::remove_var(KEY) };

        match result {
            Err(ConfigError::InvalidValue(name)) => assert_eq!(name, KEY),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
