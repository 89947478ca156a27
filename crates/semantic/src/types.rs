use serde::{Deserialize, Serialize};

use crate::SemanticError;

/// A model that turns one text into one vector.
///
/// Implementations are owned by the embedding worker thread and are never shared, so they need
/// neither `Send` nor `Sync`. Only the loader closure crosses threads.
pub trait EmbeddingModel {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, SemanticError>;
}

/// Lifecycle of the process-wide model handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ModelStatus {
    /// No embedding has been requested yet.
    Pending = 0,
    Ready = 1,
    /// Loading failed; the failure is permanent for this process.
    Failed = 2,
}

impl ModelStatus {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ModelStatus::Ready,
            2 => ModelStatus::Failed,
            _ => ModelStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Pending => "pending",
            ModelStatus::Ready => "ready",
            ModelStatus::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_u8() {
        for status in [ModelStatus::Pending, ModelStatus::Ready, ModelStatus::Failed] {
            assert_eq!(ModelStatus::from_u8(status as u8), status);
        }
        assert_eq!(ModelStatus::from_u8(42), ModelStatus::Pending);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ModelStatus::Ready).unwrap(),
            "\"ready\""
        );
        assert_eq!(ModelStatus::Failed.as_str(), "failed");
    }
}
