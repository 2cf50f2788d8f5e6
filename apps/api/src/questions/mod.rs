//! Question Provider — per-technology interview questions from a pluggable source.
//!
//! `QuestionSource` is the seam: `ProcessQuestionSource` shells out to an
//! external generator, `GeminiQuestionSource` calls the Gemini API directly.
//! `QuestionProvider` wraps whichever source is configured with a timeout,
//! bounded retry and failure isolation: it never returns an error, a failing
//! technology just gets an empty list.

pub mod gemini;
pub mod process;
pub mod prompts;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub use gemini::GeminiQuestionSource;
pub use process::ProcessQuestionSource;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("failed to start question generator: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("question generator exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("question generator output is not valid UTF-8: {0}")]
    Decode(String),

    #[error("question generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("generator returned no content")]
    EmptyContent,
}

/// Produces interview questions for a single technology name.
///
/// Implementations must treat `technology` as untrusted input.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, technology: &str) -> Result<Vec<String>, QuestionError>;

    /// Short backend label for logs.
    fn name(&self) -> &'static str;
}

/// Splits generator output into one question per line.
///
/// Surrounding whitespace of the whole output is dropped and each line loses
/// its trailing whitespace (including `\r`). Blank lines inside the output are kept.
pub fn parse_question_lines(output: &str) -> Vec<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.trim_end().to_string()).collect()
}

#[derive(Clone)]
pub struct QuestionProvider {
    source: Arc<dyn QuestionSource>,
    timeout: Duration,
    retries: u32,
}

impl QuestionProvider {
    pub fn new(source: Arc<dyn QuestionSource>, timeout: Duration, retries: u32) -> Self {
        Self {
            source,
            timeout,
            retries,
        }
    }

    /// Questions for `technology`, or an empty list if the source failed.
    pub async fn questions_for(&self, technology: &str) -> Vec<String> {
        match self.try_questions_for(technology).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!(
                    technology,
                    source = self.source.name(),
                    "Question generation failed: {e}"
                );
                Vec::new()
            }
        }
    }

    async fn try_questions_for(&self, technology: &str) -> Result<Vec<String>, QuestionError> {
        let mut attempt = 0u32;

        loop {
            let result = tokio::time::timeout(self.timeout, self.source.generate(technology))
                .await
                .unwrap_or(Err(QuestionError::Timeout(self.timeout)));

            match result {
                Ok(questions) => return Ok(questions),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(technology, attempt, "Question generation failed, retrying: {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
