//! Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development. Service credentials live on
//! [`NlpConfig`] and are handed to the client that needs them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Entity extraction service configuration
    pub nlp: NlpConfig,

    /// Comparison pipeline configuration
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_var("API_PORT", port)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Extraction service
        if let Ok(url) = std::env::var("NLP_BASE_URL") {
            config.nlp.base_url = url;
        }
        if let Ok(key) = std::env::var("NLP_API_KEY").or_else(|_| std::env::var("GOOGLE_API_KEY")) {
            config.nlp.api_key = Some(key);
        }
        if let Ok(token) = std::env::var("NLP_ACCESS_TOKEN") {
            config.nlp.access_token = Some(token);
        }
        if let Ok(secs) = std::env::var("NLP_TIMEOUT_SECS") {
            config.nlp.timeout_secs = parse_var("NLP_TIMEOUT_SECS", secs)?;
        }

        // Analysis
        if let Ok(policy) = std::env::var("FAILURE_POLICY") {
            config.analysis.failure_policy = policy.parse()?;
        }
        if let Ok(secs) = std::env::var("ANALYSIS_TIMEOUT_SECS") {
            config.analysis.request_timeout_secs = parse_var("ANALYSIS_TIMEOUT_SECS", secs)?;
        }
        if let Ok(enabled) = std::env::var("CACHE_ENABLED") {
            config.analysis.cache_enabled = parse_var("CACHE_ENABLED", enabled)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if env_config.server.cors_origins != ServerConfig::default().cors_origins {
            self.server.cors_origins = env_config.server.cors_origins;
        }
        if env_config.nlp.base_url != NlpConfig::default().base_url {
            self.nlp.base_url = env_config.nlp.base_url;
        }
        if env_config.nlp.timeout_secs != NlpConfig::default().timeout_secs {
            self.nlp.timeout_secs = env_config.nlp.timeout_secs;
        }
        if env_config.analysis.failure_policy != AnalysisConfig::default().failure_policy {
            self.analysis.failure_policy = env_config.analysis.failure_policy;
        }
        if env_config.analysis.request_timeout_secs
            != AnalysisConfig::default().request_timeout_secs
        {
            self.analysis.request_timeout_secs = env_config.analysis.request_timeout_secs;
        }
        if env_config.analysis.cache_enabled != AnalysisConfig::default().cache_enabled {
            self.analysis.cache_enabled = env_config.analysis.cache_enabled;
        }
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != LoggingConfig::default().json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        // Always use env for sensitive values
        if env_config.nlp.api_key.is_some() {
            self.nlp.api_key = env_config.nlp.api_key;
        }
        if env_config.nlp.access_token.is_some() {
            self.nlp.access_token = env_config.nlp.access_token;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1024 * 1024, // 1MB
            // Empty by default - set via CORS_ORIGINS env var
            cors_origins: vec![],
        }
    }
}

/// Entity extraction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    /// Natural Language API base URL
    pub base_url: String,

    /// API key (sent as the `key` query parameter)
    pub api_key: Option<String>,

    /// OAuth2 access token (sent as a bearer token)
    pub access_token: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://language.googleapis.com".to_string(),
            api_key: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

/// Comparison pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// What to do when one text's extraction fails
    pub failure_policy: FailurePolicy,

    /// Upper bound on each extraction call, in seconds
    pub request_timeout_secs: u64,

    /// Cache extraction results by text
    pub cache_enabled: bool,

    /// Maximum number of cached texts
    pub cache_capacity: u64,

    /// Time-to-live for cached results (in seconds)
    pub cache_ttl_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            request_timeout_secs: 30,
            cache_enabled: true,
            cache_capacity: 256,
            cache_ttl_secs: 600,
        }
    }
}

/// Handling of a failed extraction for a single text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole comparison
    #[default]
    Abort,
    /// Drop the failed text's column and keep going
    Degrade,
}

impl std::str::FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "degrade" => Ok(Self::Degrade),
            _ => Err(ConfigError::InvalidValue {
                key: "FAILURE_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl From<ConfigError> for crate::SalienceError {
    fn from(err: ConfigError) -> Self {
        crate::SalienceError::Config(err.to_string())
    }
}
