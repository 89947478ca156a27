//! Resume analysis over retrieved passages.
//!
//! The [`Analyzer`] takes an uploaded document through a small retrieval-augmented pipeline:
//!
//! 1. extract plain text ([`TextExtractor`])
//! 2. split it into substantive paragraphs ([`chunk_text`])
//! 3. embed every paragraph and the analysis query through the shared [`EmbeddingQueue`]
//! 4. rank paragraphs by cosine similarity and keep the top `k` ([`rank`])
//! 5. send only those paragraphs to the [`GenerationService`]
//!
//! Failures are reported as [`PipelineError`], each variant naming the stage that failed.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use resume_analyzer::{
//!     Analyzer, AnalyzerConfig, EmbeddingQueue, GeminiClient, GeminiConfig, PdfTextExtractor,
//!     SemanticConfig,
//! };
//!
//! # async fn run(pdf: bytes::Bytes) -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::new(
//!     AnalyzerConfig::default(),
//!     EmbeddingQueue::from_config(&SemanticConfig::default())?,
//!     Arc::new(PdfTextExtractor),
//!     Arc::new(GeminiClient::new(GeminiConfig::default())?),
//! )?;
//! let analysis = analyzer.analyze(pdf).await?;
//! println!("{}", analysis.output);
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod config;
pub mod extract;
pub mod generate;
pub mod prompt;
pub mod rank;

pub use crate::chunk::{ChunkConfig, chunk_text};
pub use crate::config::{AnalyzerConfig, ConfigError};
#[cfg(feature = "pdf")]
pub use crate::extract::PdfTextExtractor;
pub use crate::extract::{ExtractError, TextExtractor};
pub use crate::generate::{GeminiClient, GeminiConfig, GenerationError, GenerationService};
pub use crate::prompt::{ANALYSIS_QUERY, NO_RESPONSE_SENTINEL, build_prompt};
pub use crate::rank::{Passage, RankError, RankedResult, cosine_similarity, rank};
pub use semantic::{EmbeddingQueue, ModelStatus, SemanticConfig, SemanticError};

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while analyzing a document.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("text extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("embedding model failed: {0}")]
    Model(#[from] SemanticError),
    #[error("ranking failed: {0}")]
    Ranking(#[from] RankError),
    #[error("generation service failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("document has no passage long enough to analyze")]
    EmptyContent,
}

/// Client-facing name of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    ExtractionFailure,
    ModelFailure,
    GenerationServiceFailure,
    EmptyContentFailure,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ExtractionFailure => "ExtractionFailure",
            FailureKind::ModelFailure => "ModelFailure",
            FailureKind::GenerationServiceFailure => "GenerationServiceFailure",
            FailureKind::EmptyContentFailure => "EmptyContentFailure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Extraction(_) => FailureKind::ExtractionFailure,
            // Inconsistent vectors are a model problem from the caller's point of view.
            PipelineError::Model(_) | PipelineError::Ranking(_) => FailureKind::ModelFailure,
            PipelineError::Generation(_) => FailureKind::GenerationServiceFailure,
            PipelineError::EmptyContent => FailureKind::EmptyContentFailure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Chunk,
    Embed,
    Rank,
    Generate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Chunk => "chunk",
            Stage::Embed => "embed",
            Stage::Rank => "rank",
            Stage::Generate => "generate",
        }
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, outcome: Result<(), FailureKind>);
}

/// Passages selected for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    /// Passages that survived chunking.
    pub passages_considered: usize,
    /// Best passages first, at most `top_k`.
    pub ranked: Vec<RankedResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub output: String,
    pub retrieved: Vec<RankedResult>,
    pub passages_considered: usize,
}

/// The analysis pipeline. Cheap to clone; clones share the embedding worker and collaborators.
#[derive(Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    embedder: EmbeddingQueue,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn GenerationService>,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl Analyzer {
    pub fn new(
        config: AnalyzerConfig,
        embedder: EmbeddingQueue,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn GenerationService>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            embedder,
            extractor,
            generator,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn embedder(&self) -> &EmbeddingQueue {
        &self.embedder
    }

    /// Runs the whole pipeline on an uploaded document.
    pub async fn analyze(&self, document: Bytes) -> Result<Analysis, PipelineError> {
        let started = Instant::now();
        let bytes = document.len();

        let result = self.run(document).await;
        match &result {
            Ok(analysis) => tracing::info!(
                bytes,
                passages = analysis.passages_considered,
                retrieved = analysis.retrieved.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "resume analyzed"
            ),
            Err(err) => tracing::warn!(
                bytes,
                kind = %err.kind(),
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "resume analysis failed"
            ),
        }
        result
    }

    async fn run(&self, document: Bytes) -> Result<Analysis, PipelineError> {
        let span = self.stage(Stage::Extract);
        let text = self.extractor.extract(document).await.map_err(PipelineError::from);
        let text = span.finish(text)?;
        tracing::debug!(chars = text.chars().count(), "text extracted");

        let retrieval = self.retrieve(&text).await?;
        let context: Vec<&str> = retrieval.ranked.iter().map(|r| r.text.as_str()).collect();
        let prompt = build_prompt(&context);

        let span = self.stage(Stage::Generate);
        let generated = self.generate(&prompt).await;
        let output = span.finish(generated)?.unwrap_or_else(|| {
            tracing::warn!("generation service returned no candidate text");
            NO_RESPONSE_SENTINEL.to_string()
        });

        Ok(Analysis {
            output,
            retrieved: retrieval.ranked,
            passages_considered: retrieval.passages_considered,
        })
    }

    /// Chunks `text`, embeds the passages and the query, and ranks them. Does not call the
    /// generation service.
    pub async fn retrieve(&self, text: &str) -> Result<Retrieval, PipelineError> {
        let span = self.stage(Stage::Chunk);
        let chunks = chunk_text(text, &self.config.chunking());
        let chunks = span.finish(if chunks.is_empty() {
            Err(PipelineError::EmptyContent)
        } else {
            Ok(chunks)
        })?;
        tracing::debug!(passages = chunks.len(), "text chunked");

        let span = self.stage(Stage::Embed);
        let embedded = self.embed_all(chunks).await;
        let (passages, query) = span.finish(embedded)?;

        let span = self.stage(Stage::Rank);
        let ranked = rank(&query, &passages, self.config.top_k).map_err(PipelineError::from);
        let ranked = span.finish(ranked)?;
        tracing::debug!(
            top_score = ranked.first().map(|r| r.score),
            retrieved = ranked.len(),
            "passages ranked"
        );

        Ok(Retrieval {
            passages_considered: passages.len(),
            ranked,
        })
    }

    /// Passages are embedded one after another, then the query.
    async fn embed_all(
        &self,
        chunks: Vec<String>,
    ) -> Result<(Vec<Passage>, Vec<f32>), PipelineError> {
        let mut passages = Vec::with_capacity(chunks.len());
        for text in chunks {
            let embedding = self.embedder.embed(&text).await?;
            passages.push(Passage::embedded(text, embedding));
        }
        let query = self.embedder.embed(&self.config.query).await?;
        Ok((passages, query))
    }

    async fn generate(&self, prompt: &str) -> Result<Option<String>, PipelineError> {
        let timeout = self.config.generation_timeout();
        match tokio::time::timeout(timeout, self.generator.generate(prompt)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GenerationError::Timeout(timeout.as_secs()).into()),
        }
    }

    fn stage(&self, stage: Stage) -> StageSpan<'_> {
        StageSpan {
            stage,
            start: Instant::now(),
            metrics: self.metrics.as_deref(),
        }
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("model_status", &self.embedder.status())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

struct StageSpan<'a> {
    stage: Stage,
    start: Instant,
    metrics: Option<&'a dyn PipelineMetrics>,
}

impl StageSpan<'_> {
    fn finish<T>(self, result: Result<T, PipelineError>) -> Result<T, PipelineError> {
        let latency = self.start.elapsed();
        if let Err(err) = &result {
            tracing::error!(
                stage = self.stage.as_str(),
                kind = %err.kind(),
                error = %err,
                "pipeline stage failed"
            );
        }
        if let Some(metrics) = self.metrics {
            let outcome = result.as_ref().map(|_| ()).map_err(PipelineError::kind);
            metrics.record_stage(self.stage, latency, outcome);
        }
        result
    }
}
