//! Configuration for the pedidos API.
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables. The function-era variable names (`region`, `database`,
//! `output_location`) are still honoured.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    auth::AwsCredentials,
    connection::{AthenaConnectionOpts, AthenaConnectionOptsBuilder},
    executor::PollPolicy,
    functions::ApiSettings,
    pedidos::queries,
    query::QueryTarget,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthenaConfig {
    pub region: String,
    pub database: String,
    pub output_location: String,
    pub work_group: Option<String>,
    pub endpoint: Option<String>,
    pub page_size: Option<u32>,
}

impl Default for AthenaConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            database: String::new(),
            output_location: String::new(),
            work_group: None,
            endpoint: None,
            page_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Form option lookups.
    pub lookup: PollPolicy,
    /// Dataset and summary extraction.
    pub extract: PollPolicy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            lookup: PollPolicy::LOOKUP,
            extract: PollPolicy::EXTRACT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub limit: u32,
    pub base_date: String,
    pub days_back: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            limit: queries::DEFAULT_LIMIT,
            base_date: queries::DEFAULT_BASE_DATE.to_string(),
            days_back: queries::DEFAULT_DAYS_BACK as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `pedidos_athena=debug`.
    pub level: String,
    /// pretty, json or compact
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub athena: AthenaConfig,
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub defaults: DefaultsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parses the YAML file at `path` and applies environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Defaults plus environment overrides, for deployments without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::default().apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Applies overrides from `lookup` (normally the process environment) and
    /// validates the result.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(region) = var("region").or_else(|| var("AWS_REGION")) {
            self.athena.region = region;
        }
        if let Some(database) = var("database") {
            self.athena.database = database;
        }
        if let Some(output_location) = var("output_location") {
            self.athena.output_location = output_location;
        }
        if let Some(work_group) = var("ATHENA_WORK_GROUP") {
            self.athena.work_group = Some(work_group);
        }

        if let Some(host) = var("PEDIDOS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PEDIDOS_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                name: "PEDIDOS_PORT".to_string(),
                value: port.clone(),
            })?;
        }

        if let Some(level) = var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.athena.database.is_empty() {
            return Err(ConfigError::Missing("athena.database".to_string()));
        }
        if self.athena.output_location.is_empty() {
            return Err(ConfigError::Missing("athena.output_location".to_string()));
        }
        if let Some(size) = self.athena.page_size.filter(|s| !(1..=1000).contains(s)) {
            return Err(ConfigError::Invalid {
                name: "athena.page_size".to_string(),
                value: size.to_string(),
            });
        }
        if queries::parse_base_date(&self.defaults.base_date).is_err() {
            return Err(ConfigError::Invalid {
                name: "defaults.base_date".to_string(),
                value: self.defaults.base_date.clone(),
            });
        }
        if self.defaults.days_back < queries::ALL_BEFORE {
            return Err(ConfigError::Invalid {
                name: "defaults.days_back".to_string(),
                value: self.defaults.days_back.to_string(),
            });
        }
        if self.defaults.limit == 0 {
            return Err(ConfigError::Invalid {
                name: "defaults.limit".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    pub fn target(&self) -> QueryTarget {
        QueryTarget::new(&self.athena.database, &self.athena.output_location)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            target: self.target(),
            options_policy: self.polling.lookup,
            dataset_policy: self.polling.extract,
            default_limit: self.defaults.limit,
            default_base_date: self.defaults.base_date.clone(),
            default_days_back: self.defaults.days_back,
        }
    }

    pub fn connection_opts(
        &self,
        credentials: AwsCredentials,
    ) -> Result<AthenaConnectionOpts, ConfigError> {
        let mut builder = AthenaConnectionOptsBuilder::default();
        builder
            .region(self.athena.region.as_str())
            .credentials(credentials);

        if let Some(endpoint) = &self.athena.endpoint {
            builder.endpoint(endpoint.as_str());
        }
        if let Some(work_group) = &self.athena.work_group {
            builder.work_group(work_group.as_str());
        }
        if let Some(page_size) = self.athena.page_size {
            builder.page_size(page_size);
        }

        builder.build().map_err(|e| ConfigError::Invalid {
            name: "athena".to_string(),
            value: e.to_string(),
        })
    }
}
