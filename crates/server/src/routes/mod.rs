//! API route handlers
//!
//! - `analyze`: resume upload and analysis
//! - `health`: liveness and readiness probes

pub mod analyze;
pub mod health;

use crate::error::ServerError;

pub const LIVENESS_TEXT: &str = "AI Resume Analyzer Backend Running";

/// Plain-text liveness message served at `GET /`.
pub async fn root() -> &'static str {
    LIVENESS_TEXT
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
