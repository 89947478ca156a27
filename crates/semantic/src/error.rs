use std::io;
use thiserror::Error;

/// Errors surfaced by the embedding provider.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model could not be located locally and no download URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (unknown mode, zero sequence length, ...).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The model failed to load. Memoized: every later call sees the same failure.
    #[error("embedding model failed to load: {0}")]
    ModelLoad(String),
    /// ONNX Runtime, tokenizer, or pooling errors.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The worker thread owning the model is gone.
    #[error("embedding worker unavailable: {0}")]
    WorkerUnavailable(String),
}

impl Clone for SemanticError {
    fn clone(&self) -> Self {
        match self {
            SemanticError::ModelNotFound(s) => SemanticError::ModelNotFound(s.clone()),
            SemanticError::TokenizerMissing(s) => SemanticError::TokenizerMissing(s.clone()),
            SemanticError::InvalidConfig(s) => SemanticError::InvalidConfig(s.clone()),
            SemanticError::Download(s) => SemanticError::Download(s.clone()),
            SemanticError::Io(err) => SemanticError::ModelLoad(format!("io error: {err}")),
            SemanticError::ModelLoad(s) => SemanticError::ModelLoad(s.clone()),
            SemanticError::Inference(s) => SemanticError::Inference(s.clone()),
            SemanticError::WorkerUnavailable(s) => SemanticError::WorkerUnavailable(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_model_not_found() {
        let err = SemanticError::ModelNotFound("/path/to/model.onnx".into());
        assert!(err.to_string().contains("model file not found"));
        assert!(err.to_string().contains("/path/to/model.onnx"));
    }

    #[test]
    fn error_model_load_mentions_cause() {
        let err = SemanticError::ModelLoad("bad protobuf".into());
        assert!(err.to_string().contains("failed to load"));
        assert!(err.to_string().contains("bad protobuf"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SemanticError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn error_clone_keeps_message() {
        let err = SemanticError::Inference("session failed".into());
        assert_eq!(err.to_string(), err.clone().to_string());
    }

    #[test]
    fn error_clone_io_becomes_model_load() {
        let err: SemanticError = io::Error::other("disk gone").into();
        let cloned = err.clone();
        assert!(matches!(cloned, SemanticError::ModelLoad(_)));
        assert!(cloned.to_string().contains("disk gone"));
    }
}
