use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SemanticError;

/// Runtime configuration describing which model/tokenizer to use and how to post-process vectors.
///
/// # Example
/// ```no_run
/// use semantic::{EmbeddingQueue, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     model_path: "./models/all-MiniLM-L6-v2/onnx/model.onnx".into(),
///     tokenizer_path: Some("./models/all-MiniLM-L6-v2/tokenizer.json".into()),
///     ..Default::default()
/// };
///
/// let queue = EmbeddingQueue::from_config(&cfg).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Inference mode selector: `"onnx"` (local model) or `"fast"` (deterministic stub).
    pub mode: String,
    /// Friendly label used in logs.
    pub model_name: String,
    /// Local path where the ONNX file should live (also the download target when
    /// [`model_url`](Self::model_url) is provided).
    pub model_path: PathBuf,
    /// Optional HTTPS URL downloaded when [`model_path`](Self::model_path) is missing.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent and [`tokenizer_url`](Self::tokenizer_url) is set the
    /// file is placed next to the model.
    pub tokenizer_path: Option<PathBuf>,
    /// Optional HTTPS URL for fetching the tokenizer on demand.
    pub tokenizer_url: Option<String>,
    /// Token budget per input; longer inputs are truncated.
    pub max_sequence_length: usize,
    /// How token representations become one vector: `"mean"` or `"cls"`.
    pub pooling_strategy: String,
    /// Normalize the resulting vector to unit length (required for cosine ranking).
    pub normalize: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            model_path: PathBuf::from("./models/all-MiniLM-L6-v2/onnx/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/all-MiniLM-L6-v2/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 256,
            pooling_strategy: "mean".into(),
            normalize: true,
        }
    }
}

impl SemanticConfig {
    /// Config for the deterministic stub model, handy for local runs without model files.
    pub fn fast() -> Self {
        Self {
            mode: "fast".into(),
            model_name: "stub".into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "onnx" | "fast" => {}
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown mode '{other}', expected 'onnx' or 'fast'"
                )))
            }
        }
        match self.pooling_strategy.as_str() {
            "mean" | "cls" => {}
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown pooling strategy '{other}'"
                )))
            }
        }
        if self.max_sequence_length == 0 {
            return Err(SemanticError::InvalidConfig(
                "max_sequence_length must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = SemanticConfig::default();
        assert_eq!(cfg.mode, "onnx");
        assert_eq!(cfg.model_name, "all-MiniLM-L6-v2");
        assert_eq!(cfg.pooling_strategy, "mean");
        assert_eq!(cfg.max_sequence_length, 256);
        assert!(cfg.normalize);
        assert!(cfg.model_url.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn fast_config_is_valid() {
        let cfg = SemanticConfig::fast();
        assert_eq!(cfg.mode, "fast");
        assert!(cfg.normalize);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_mode_rejected() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SemanticError::InvalidConfig(msg)) if msg.contains("api")
        ));
    }

    #[test]
    fn unknown_pooling_rejected() {
        let cfg = SemanticConfig {
            pooling_strategy: "max".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_sequence_length_rejected() {
        let cfg = SemanticConfig {
            max_sequence_length: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SemanticConfig = serde_json::from_str(r#"{"mode":"fast"}"#).unwrap();
        assert_eq!(cfg.mode, "fast");
        assert_eq!(cfg.pooling_strategy, "mean");
        assert!(cfg.normalize);
    }
}
