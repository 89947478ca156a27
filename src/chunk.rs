//! Paragraph chunking of extracted resume text.

use serde::{Deserialize, Serialize};

/// Paragraphs shorter than this are headers, contact lines and the like.
pub const DEFAULT_MIN_CHUNK_CHARS: usize = 300;

/// Upper bound on passages per document; every passage costs one embedding call.
pub const DEFAULT_MAX_CHUNKS: usize = 5;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Minimum passage length in characters (Unicode scalar values), inclusive.
    pub min_chars: usize,
    pub max_chunks: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHUNK_CHARS,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }
}

/// Splits `text` on blank lines and keeps the first `max_chunks` substantive paragraphs, in
/// document order. Returns an empty vector when nothing is long enough.
pub fn chunk_text(text: &str, cfg: &ChunkConfig) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|paragraph| paragraph.chars().count() >= cfg.min_chars)
        .take(cfg.max_chunks)
        .map(str::to_owned)
        .collect()
}
