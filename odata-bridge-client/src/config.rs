use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Client configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the legacy service
    #[validate(length(min = 1, message = "Service URL cannot be empty"))]
    pub service_url: String,

    /// Path to the EDM schema YAML file
    #[validate(length(min = 1, message = "Schema file path cannot be empty"))]
    pub schema_file: String,

    /// Request timeout in seconds (1-600)
    #[validate(range(
        min = 1,
        max = 600,
        message = "Timeout must be between 1 and 600 seconds"
    ))]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".to_string(),
            schema_file: "demos/gwsample_basic.yaml".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            service_url: env::var("ODATA_SERVICE_URL").unwrap_or(defaults.service_url),
            schema_file: env::var("ODATA_SCHEMA_FILE").unwrap_or(defaults.schema_file),
            timeout_secs: parse_env_var("ODATA_TIMEOUT_SECS", "30")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides (CLI wins over environment) and revalidate
    pub fn merge_cli(
        &mut self,
        service_url: Option<String>,
        schema_file: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<(), ConfigError> {
        if let Some(service_url) = service_url {
            self.service_url = service_url;
        }
        if let Some(schema_file) = schema_file {
            self.schema_file = schema_file;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.timeout_secs = timeout_secs;
        }

        self.validate()?;
        Ok(())
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
