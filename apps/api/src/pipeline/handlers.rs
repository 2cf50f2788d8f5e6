//! Axum route handlers for the upload pipeline.

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::matching::MatchSet;
use crate::pipeline::{QuestionBundle, UploadedDocument};
use crate::state::AppState;

/// Multipart field carrying the document.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub technologies: MatchSet,
    pub questions: QuestionBundle,
}

/// POST /upload
///
/// Stores the `resume` file part, runs the pipeline and returns the matched
/// technologies with their questions. Parts other than `resume`, and `resume`
/// parts without a filename (or with `filename=""`, as browsers send when no
/// file was chosen), are ignored.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut document = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let Some(original_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(String::from)
        else {
            continue;
        };

        let bytes = field.bytes().await?;
        let file = state
            .uploads
            .save(&original_name, bytes)
            .await
            .context("storing uploaded document")?;

        document = Some(UploadedDocument::new(original_name, file));
        break;
    }

    let result = state.pipeline.process(document).await?;

    Ok(Json(UploadResponse {
        message: "Upload and parsing successful",
        technologies: result.technologies,
        questions: result.questions,
    }))
}
