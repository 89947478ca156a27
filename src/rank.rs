//! Cosine ranking of embedded passages against a query vector.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A retrieval candidate. The embedding is attached once and not changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

impl Passage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embedding: None,
        }
    }

    pub fn embedded(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding: Some(embedding),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub text: String,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("passage {index} has no embedding")]
    MissingEmbedding { index: usize },
    #[error("passage {index} has dimension {found}, query has {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// `dot(a, b) / (|a| * |b|)`, or `0.0` when either vector has zero magnitude or holds a
/// non-finite value.
///
/// Both slices must have the same length; extra trailing values are ignored. Sums are kept in
/// `f64` so large unnormalized inputs do not overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}

/// Scores every passage against `query` and returns at most `k` results, best first.
///
/// The sort is stable, so equal scores keep passage order.
pub fn rank(
    query: &[f32],
    passages: &[Passage],
    k: usize,
) -> Result<Vec<RankedResult>, RankError> {
    let mut scored = Vec::with_capacity(passages.len());
    for (index, passage) in passages.iter().enumerate() {
        let embedding = passage
            .embedding
            .as_deref()
            .ok_or(RankError::MissingEmbedding { index })?;
        if embedding.len() != query.len() {
            return Err(RankError::DimensionMismatch {
                index,
                expected: query.len(),
                found: embedding.len(),
            });
        }
        scored.push(RankedResult {
            text: passage.text.clone(),
            score: cosine_similarity(query, embedding),
        });
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn cosine_is_symmetric() {
        let pairs = [
            (vec![1.0, 2.0, 3.0], vec![-3.0, 0.5, 2.0]),
            (vec![0.2, 0.0, -0.9], vec![0.1, 0.1, 0.1]),
            (vec![5.0, -5.0], vec![-1.0, 4.0]),
        ];
        for (a, b) in pairs {
            assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < EPS);
        }
    }

    #[test]
    fn cosine_with_self_is_one() {
        for v in [vec![1.0, 2.0, 3.0], vec![-0.5, 0.25], vec![1e-3, 7.0, -2.0, 0.0]] {
            assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cosine_known_values() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < EPS);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < EPS);
    }

    #[test]
    fn cosine_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_survives_large_magnitudes() {
        let score = cosine_similarity(&[1e30, 1e30], &[1.0, 0.0]);
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn cosine_non_finite_input_scores_zero() {
        assert_eq!(cosine_similarity(&[f32::NAN, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[f32::INFINITY, 1.0]), 0.0);
    }

    #[test]
    fn rank_keeps_bounds_with_degenerate_vectors() {
        let passages = vec![
            Passage::embedded("good", vec![1.0, 0.0]),
            Passage::embedded("nan", vec![f32::NAN, 0.0]),
            Passage::embedded("huge", vec![1e30, 1e30]),
        ];
        let ranked = rank(&[1.0, 0.0], &passages, 3).unwrap();
        let texts: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["good", "huge", "nan"]);
        assert!(ranked.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn rank_orders_by_descending_score() {
        let query = [1.0, 0.0];
        let passages = vec![
            Passage::embedded("orthogonal", vec![0.0, 1.0]),
            Passage::embedded("aligned", vec![2.0, 0.0]),
            Passage::embedded("opposite", vec![-1.0, 0.0]),
            Passage::embedded("diagonal", vec![1.0, 1.0]),
        ];
        let ranked = rank(&query, &passages, 10).unwrap();
        let texts: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["aligned", "diagonal", "orthogonal", "opposite"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn rank_caps_at_k() {
        let query = [1.0, 0.0];
        let passages: Vec<Passage> = (0..6)
            .map(|i| Passage::embedded(format!("p{i}"), vec![1.0, i as f32]))
            .collect();
        assert_eq!(rank(&query, &passages, 3).unwrap().len(), 3);
        assert_eq!(rank(&query, &passages[..2], 3).unwrap().len(), 2);
        assert!(rank(&query, &[], 3).unwrap().is_empty());
    }

    #[test]
    fn rank_ties_keep_passage_order() {
        let query = [1.0, 1.0];
        let passages = vec![
            Passage::embedded("first", vec![1.0, 1.0]),
            Passage::embedded("second", vec![2.0, 2.0]),
            Passage::embedded("third", vec![3.0, 3.0]),
        ];
        let ranked = rank(&query, &passages, 3).unwrap();
        let texts: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_rejects_unembedded_passage() {
        let passages = vec![Passage::embedded("ok", vec![1.0]), Passage::new("missing")];
        assert_eq!(
            rank(&[1.0], &passages, 2),
            Err(RankError::MissingEmbedding { index: 1 })
        );
    }

    #[test]
    fn rank_rejects_dimension_mismatch() {
        let passages = vec![Passage::embedded("short", vec![1.0])];
        assert_eq!(
            rank(&[1.0, 0.0], &passages, 1),
            Err(RankError::DimensionMismatch {
                index: 0,
                expected: 2,
                found: 1
            })
        );
    }
}
