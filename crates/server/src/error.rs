use analyzer::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// Body of every `/analyze` response and of every error.
///
/// ```json
/// { "success": false, "error": "text extraction failed: document is empty", "kind": "ExtractionFailure" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Envelope {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            kind: None,
        }
    }

    pub fn failure(error: String, kind: Option<&str>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error),
            kind: kind.map(str::to_owned),
        }
    }
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Pipeline(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Failure kind reported to the client, when there is one.
    fn kind(&self) -> Option<&'static str> {
        match self {
            ServerError::Pipeline(err) => Some(err.kind().as_str()),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = Envelope::failure(self.to_string(), self.kind());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::ExtractError;

    #[test]
    fn pipeline_errors_carry_kind() {
        let err = ServerError::from(PipelineError::EmptyContent);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), Some("EmptyContentFailure"));

        let err = ServerError::from(PipelineError::Extraction(ExtractError::EmptyDocument));
        assert_eq!(err.kind(), Some("ExtractionFailure"));
        assert_eq!(err.to_string(), "text extraction failed: document is empty");
    }

    #[test]
    fn client_errors_have_no_kind() {
        let err = ServerError::BadRequest("missing file field 'resume'".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), None);
        assert_eq!(ServerError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let ok = serde_json::to_value(Envelope::success("ATS Score: 80".into())).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({ "success": true, "output": "ATS Score: 80" })
        );

        let failed = serde_json::to_value(Envelope::failure("boom".into(), None)).unwrap();
        assert_eq!(failed, serde_json::json!({ "success": false, "error": "boom" }));
    }
}
