use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;
use crate::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to extract text: {0}")]
    ExtractionFailed(#[source] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoFileProvided => AppError::NoFileProvided,
            PipelineError::ExtractionFailed(e) => AppError::ExtractionFailed(e),
            PipelineError::ArtifactUnreadable(e) => {
                AppError::Internal(anyhow::Error::new(e).context("reading extraction artifact"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NoFileProvided => (StatusCode::BAD_REQUEST, "No file uploaded"),
            AppError::Multipart(e) => {
                tracing::warn!("Rejected multipart request: {}", e.body_text());
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    (StatusCode::PAYLOAD_TOO_LARGE, "File too large")
                } else {
                    (StatusCode::BAD_REQUEST, "Invalid multipart request")
                }
            }
            AppError::ExtractionFailed(e) => {
                tracing::error!("Text extraction failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to extract text")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_no_file_maps_to_400() {
        let (status, body) = body_json(AppError::NoFileProvided).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file uploaded" }));
    }

    #[tokio::test]
    async fn test_extraction_failure_hides_cause() {
        let err = AppError::ExtractionFailed(ExtractError::Decode("bad xref table".to_string()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to extract text" }));
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let err = AppError::Internal(anyhow::anyhow!("disk full"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
