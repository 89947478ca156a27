use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbeddingModel, SemanticError};

pub(crate) const STUB_DIMENSION: usize = 384;

/// Deterministic stand-in used when `mode == "fast"`.
///
/// Every lowercase word is hashed into two buckets, so texts sharing vocabulary end up with a
/// positive cosine score. Cheap enough for tests and local runs without model files.
pub(crate) struct StubModel {
    normalize: bool,
}

impl StubModel {
    pub(crate) fn new(normalize: bool) -> Self {
        Self { normalize }
    }
}

impl EmbeddingModel for StubModel {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(make_stub_vector(text, self.normalize))
    }
}

pub(crate) fn make_stub_vector(text: &str, normalize: bool) -> Vec<f32> {
    let mut v = vec![0f32; STUB_DIMENSION];
    for word in text.split_whitespace() {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        let h = hash64(word.as_bytes());
        v[(h % STUB_DIMENSION as u64) as usize] += 1.0;
        v[((h >> 32) % STUB_DIMENSION as u64) as usize] += 0.5;
    }
    if normalize {
        l2_normalize_in_place(&mut v);
    }
    v
}
