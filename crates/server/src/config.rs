use std::net::SocketAddr;

use analyzer::generate::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
use analyzer::{AnalyzerConfig, GeminiConfig};
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};

/// Environment variable holding the generation API key when it is not set through the
/// prefixed configuration variables.
pub const API_KEY_ENV: &str = "VERTEX_API_KEY";

const ENV_PREFIX: &str = "RESUME_ANALYZER";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub semantic: SemanticConfig,

    #[serde(default)]
    pub pipeline: AnalyzerConfig,
}

/// Outbound generation service settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct GenerationSettings {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generation_model(),
            endpoint: default_generation_endpoint(),
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl GenerationSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            generation: GenerationSettings::default(),
            semantic: SemanticConfig::default(),
            pipeline: AnalyzerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server` config file, and
    /// `RESUME_ANALYZER__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is the normal case in production.
        let _ = dotenvy::dotenv();

        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("server").required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        if !config.generation.has_api_key() {
            config.generation.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_body_size_mb == 0 {
            anyhow::bail!("max_body_size_mb must be greater than 0");
        }
        self.pipeline.validate()?;
        self.semantic.validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_generation_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_generation_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}
