use std::sync::Arc;

use analyzer::{Analyzer, EmbeddingQueue, GeminiClient, PdfTextExtractor};

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Analysis pipeline; owns the handle to the process-wide embedding worker.
    pub analyzer: Analyzer,
}

impl ServerState {
    /// Create server state with the production collaborators: the configured embedding model,
    /// PDF extraction and the Gemini client.
    ///
    /// The embedding model is not loaded here; the worker loads it on the first request.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let embedder = EmbeddingQueue::from_config(&config.semantic)?;
        let generator = GeminiClient::new(config.generation.gemini())?;
        let analyzer = Analyzer::new(
            config.pipeline.clone(),
            embedder,
            Arc::new(PdfTextExtractor),
            Arc::new(generator),
        )?;
        Ok(Self::with_analyzer(config, analyzer))
    }

    pub fn with_analyzer(config: ServerConfig, analyzer: Analyzer) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}
