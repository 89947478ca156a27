use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{Envelope, ServerError, ServerResult};
use crate::state::ServerState;

/// Multipart field carrying the uploaded document.
pub const RESUME_FIELD: &str = "resume";

/// `POST /analyze`: analyze an uploaded resume.
///
/// Expects `multipart/form-data` with the document in the `resume` field and answers with
/// `{ "success": true, "output": "..." }`. Pipeline failures are 500s carrying the failure kind.
pub async fn analyze_resume(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<Envelope>> {
    let mut multipart =
        multipart.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let document = read_resume_field(&mut multipart).await?;
    let analysis = state.analyzer.analyze(document).await?;

    Ok(Json(Envelope::success(analysis.output)))
}

async fn read_resume_field(multipart: &mut Multipart) -> ServerResult<Bytes> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        tracing::info!(
            filename = filename.as_deref().unwrap_or("<none>"),
            bytes = bytes.len(),
            "resume received"
        );
        return Ok(bytes);
    }

    Err(ServerError::BadRequest(format!(
        "missing file field '{RESUME_FIELD}'"
    )))
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(err.body_text())
    } else {
        ServerError::BadRequest(err.body_text())
    }
}
