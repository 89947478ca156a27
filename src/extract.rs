//! Turning an uploaded document into plain text.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("failed to parse document: {0}")]
    Parse(String),
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Raw document bytes in, plain text out.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError>;
}

/// Extracts text from PDF bytes on tokio's blocking pool.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        if document.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let parsed = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
                .map_err(|err| ExtractError::Parse(err.to_string()))
        })
        .await;

        match parsed {
            Ok(result) => result,
            // The parser panics on some malformed inputs; the join error carries that panic.
            Err(join) if join.is_panic() => Err(ExtractError::Parse("pdf parser panicked".into())),
            Err(join) => Err(ExtractError::Task(join.to_string())),
        }
    }
}
