mod config;
mod errors;
mod extraction;
mod matching;
mod pipeline;
mod questions;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, QuestionSourceKind};
use crate::extraction::{PdfDecoder, TextExtractor};
use crate::matching::Vocabulary;
use crate::pipeline::Pipeline;
use crate::questions::{
    GeminiQuestionSource, ProcessQuestionSource, QuestionProvider, QuestionSource,
};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;
use crate::storage::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting prep-api v{}", env!("CARGO_PKG_VERSION"));

    let vocabulary = Vocabulary::builtin();
    info!("Technology vocabulary loaded ({} terms)", vocabulary.len());

    let source: Arc<dyn QuestionSource> = match config.question_source {
        QuestionSourceKind::Process => Arc::new(ProcessQuestionSource::new(
            config.question_command.clone(),
            config.question_args.clone(),
        )),
        QuestionSourceKind::Gemini => {
            let api_key = config.google_api_key.clone().unwrap_or_default();
            Arc::new(GeminiQuestionSource::new(api_key)?)
        }
    };
    info!(
        "Question source: {} (timeout {:?}, retries {}, concurrency {})",
        source.name(),
        config.question_timeout,
        config.question_retries,
        config.question_concurrency
    );

    let extractor = TextExtractor::new(
        Arc::new(PdfDecoder),
        config.text_dir.clone(),
        config.retain_artifacts,
    );
    let provider = QuestionProvider::new(source, config.question_timeout, config.question_retries);
    let pipeline = Pipeline::new(vocabulary, extractor, provider, config.question_concurrency);

    // Build app state
    let state = AppState {
        uploads: UploadStore::new(config.uploads_dir.clone(), config.retain_artifacts),
        pipeline: Arc::new(pipeline),
    };

    // Build router
    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_origin)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
