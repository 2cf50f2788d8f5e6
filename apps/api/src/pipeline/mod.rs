//! Pipeline Orchestrator — upload → extract → match → per-technology questions.
//!
//! Stages run strictly in order for one request. Only a missing document or a
//! failed extraction aborts the pipeline; question generation failures are
//! absorbed by `QuestionProvider` and surface as empty lists.
//!
//! Question calls for different technologies run concurrently (bounded by a
//! semaphore). The bundle is keyed by technology, so completion order never
//! changes the result.

pub mod handlers;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::extraction::{ExtractError, TextExtractor};
use crate::matching::{match_technologies, MatchSet, Vocabulary};
use crate::questions::QuestionProvider;
use crate::storage::ScopedFile;

/// Technology name → generated questions. Keys are exactly the matched technologies.
pub type QuestionBundle = BTreeMap<String, Vec<String>>;

/// A document received from a client, stored on disk for the duration of one request.
#[derive(Debug)]
pub struct UploadedDocument {
    original_name: String,
    file: ScopedFile,
}

impl UploadedDocument {
    pub fn new(original_name: impl Into<String>, file: ScopedFile) -> Self {
        Self {
            original_name: original_name.into(),
            file,
        }
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub technologies: MatchSet,
    pub questions: QuestionBundle,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no file provided")]
    NoFileProvided,

    #[error("text extraction failed: {0}")]
    ExtractionFailed(#[source] ExtractError),

    #[error("extraction artifact could not be read: {0}")]
    ArtifactUnreadable(#[source] std::io::Error),
}

pub struct Pipeline {
    vocabulary: Vocabulary,
    extractor: TextExtractor,
    provider: QuestionProvider,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(
        vocabulary: Vocabulary,
        extractor: TextExtractor,
        provider: QuestionProvider,
        concurrency: usize,
    ) -> Self {
        Self {
            vocabulary,
            extractor,
            provider,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the full pipeline for one upload. The uploaded document and the
    /// extraction artifact are released (and removed, unless retained) on return.
    pub async fn process(
        &self,
        document: Option<UploadedDocument>,
    ) -> Result<PipelineResult, PipelineError> {
        let document = document.ok_or(PipelineError::NoFileProvided)?;

        let bytes = tokio::fs::read(document.path())
            .await
            .map_err(|e| PipelineError::ExtractionFailed(e.into()))?;
        let artifact = self
            .extractor
            .extract(Bytes::from(bytes))
            .await
            .map_err(PipelineError::ExtractionFailed)?;

        let text = tokio::fs::read_to_string(artifact.path())
            .await
            .map_err(PipelineError::ArtifactUnreadable)?;
        let technologies = match_technologies(&text, &self.vocabulary);
        debug_assert!(technologies.iter().all(|t| self.vocabulary.contains(t)));

        info!(
            document = document.original_name(),
            artifact = artifact.id(),
            matched = technologies.len(),
            "Technologies matched: {:?}",
            technologies
        );

        let questions = self.enrich(&technologies).await;

        Ok(PipelineResult {
            technologies,
            questions,
        })
    }

    async fn enrich(&self, technologies: &MatchSet) -> QuestionBundle {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for technology in technologies.iter() {
            let technology = technology.to_string();
            let provider = self.provider.clone();
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let questions = match permits.acquire_owned().await {
                    Ok(_permit) => provider.questions_for(&technology).await,
                    Err(_) => Vec::new(),
                };
                (technology, questions)
            });
        }

        // Every matched technology keeps its key even if its task dies.
        let mut bundle: QuestionBundle = technologies
            .iter()
            .map(|t| (t.to_string(), Vec::new()))
            .collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((technology, questions)) => {
                    bundle.insert(technology, questions);
                }
                Err(e) => warn!("Question generation task failed: {e}"),
            }
        }

        bundle
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::extraction::tests::Utf8Decoder;
    use crate::questions::testing::{HangingSource, ScriptedSource};
    use crate::questions::QuestionSource;
    use crate::storage::UploadStore;

    struct Fixture {
        dir: tempfile::TempDir,
        uploads: UploadStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let uploads = UploadStore::new(dir.path().join("uploads"), false);
            Self { dir, uploads }
        }

        fn pipeline(&self, source: Arc<dyn QuestionSource>, concurrency: usize) -> Pipeline {
            Pipeline::new(
                Vocabulary::builtin(),
                TextExtractor::new(Arc::new(Utf8Decoder), self.dir.path().join("text"), false),
                QuestionProvider::new(source, Duration::from_secs(5), 0),
                concurrency,
            )
        }

        async fn upload(&self, contents: &'static str) -> UploadedDocument {
            let file = self
                .uploads
                .save("cv.pdf", Bytes::from_static(contents.as_bytes()))
                .await
                .unwrap();
            UploadedDocument::new("cv.pdf", file)
        }

        fn file_count(&self, sub: &str) -> usize {
            std::fs::read_dir(self.dir.path().join(sub))
                .map(|d| d.count())
                .unwrap_or(0)
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_rejected() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(ScriptedSource::new()), 4);

        let err = pipeline.process(None).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoFileProvided));
    }

    #[tokio::test]
    async fn test_matches_and_enriches_each_technology() {
        let fixture = Fixture::new();
        let source = Arc::new(ScriptedSource::new().answer("python", &["What is the GIL?"]));
        let pipeline = fixture.pipeline(source.clone(), 4);

        let doc = fixture.upload("I used Python and React with Docker").await;
        let result = pipeline.process(Some(doc)).await.unwrap();

        let matched: HashSet<&str> = result.technologies.iter().collect();
        assert_eq!(matched, HashSet::from(["python", "react", "docker"]));
        assert_eq!(
            result.questions.keys().map(String::as_str).collect::<HashSet<_>>(),
            matched
        );
        assert_eq!(result.questions["python"], vec!["What is the GIL?"]);
        assert_eq!(result.questions["docker"], vec!["What is docker?"]);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_no_matches_gives_empty_bundle() {
        let fixture = Fixture::new();
        let source = Arc::new(ScriptedSource::new());
        let pipeline = fixture.pipeline(source.clone(), 4);

        let doc = fixture.upload("Barista with latte art skills").await;
        let result = pipeline.process(Some(doc)).await.unwrap();

        assert!(result.technologies.is_empty());
        assert!(result.questions.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failing_technology_does_not_abort_request() {
        let fixture = Fixture::new();
        let source = Arc::new(ScriptedSource::new().fail("react"));
        let pipeline = fixture.pipeline(source, 4);

        let doc = fixture.upload("python and react").await;
        let result = pipeline.process(Some(doc)).await.unwrap();

        assert!(result.questions["react"].is_empty());
        assert_eq!(result.questions["python"], vec!["What is python?"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_generator_yields_empty_lists() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(HangingSource), 2);

        let doc = fixture.upload("terraform and jenkins").await;
        let result = pipeline.process(Some(doc)).await.unwrap();

        assert_eq!(result.questions.len(), 2);
        assert!(result.questions.values().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_sequential_and_parallel_enrichment_agree() {
        let fixture = Fixture::new();
        let text = "Kubernetes, AWS, Azure, GCP, Linux, Git, GraphQL, TypeScript";

        let sequential = fixture
            .pipeline(Arc::new(ScriptedSource::new()), 1)
            .process(Some(fixture.upload(text).await))
            .await
            .unwrap();
        let parallel = fixture
            .pipeline(Arc::new(ScriptedSource::new()), 8)
            .process(Some(fixture.upload(text).await))
            .await
            .unwrap();

        assert_eq!(sequential.questions, parallel.questions);
        assert_eq!(sequential.technologies, parallel.technologies);
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_and_skips_enrichment() {
        let fixture = Fixture::new();
        let source = Arc::new(ScriptedSource::new());
        let pipeline = fixture.pipeline(source.clone(), 4);

        let doc = fixture.upload("%BAD document with python").await;
        let err = pipeline.process(Some(doc)).await.unwrap_err();

        assert!(matches!(err, PipelineError::ExtractionFailed(_)));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transient_files_removed_after_processing() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(ScriptedSource::new()), 4);

        let doc = fixture.upload("rust? no, ruby").await;
        assert_eq!(fixture.file_count("uploads"), 1);

        pipeline.process(Some(doc)).await.unwrap();

        assert_eq!(fixture.file_count("uploads"), 0);
        assert_eq!(fixture.file_count("text"), 0);
    }

    #[tokio::test]
    async fn test_result_serializes_to_response_shape() {
        let fixture = Fixture::new();
        let pipeline = fixture.pipeline(Arc::new(ScriptedSource::new().answer("css", &["Q"])), 4);

        let result = pipeline
            .process(Some(fixture.upload("CSS").await))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "technologies": ["css"], "questions": { "css": ["Q"] } })
        );
    }
}
