//! Pipeline configuration.
//!
//! Every field has a default, so an empty table (or no table at all) yields the stock pipeline:
//!
//! ```toml
//! [pipeline]
//! min_chars = 300
//! max_chunks = 5
//! top_k = 3
//! query = "Analyze resume for ATS score, skills, grammar and improvements"
//! generation_timeout_secs = 60
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk::{ChunkConfig, DEFAULT_MAX_CHUNKS, DEFAULT_MIN_CHUNK_CHARS};
use crate::prompt::ANALYSIS_QUERY;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid pipeline config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub min_chars: usize,
    pub max_chunks: usize,
    /// Passages forwarded to the generation service.
    pub top_k: usize,
    /// Retrieval query the passages are ranked against.
    pub query: String,
    pub generation_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHUNK_CHARS,
            max_chunks: DEFAULT_MAX_CHUNKS,
            top_k: DEFAULT_TOP_K,
            query: ANALYSIS_QUERY.to_string(),
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_chars == 0 {
            return Err(ConfigError::Invalid(
                "min_chars must be greater than 0".into(),
            ));
        }
        if self.max_chunks == 0 {
            return Err(ConfigError::Invalid(
                "max_chunks must be greater than 0".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be greater than 0".into()));
        }
        if self.query.trim().is_empty() {
            return Err(ConfigError::Invalid("query must not be empty".into()));
        }
        if self.generation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "generation_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn chunking(&self) -> ChunkConfig {
        ChunkConfig {
            min_chars: self.min_chars,
            max_chunks: self.max_chunks,
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}
