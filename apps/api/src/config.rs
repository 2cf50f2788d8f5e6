use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which backend produces interview questions for a matched technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSourceKind {
    /// Runs `QUESTION_COMMAND QUESTION_ARGS.. <technology>` and reads stdout.
    Process,
    /// Calls the Gemini `generateContent` API directly.
    Gemini,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub frontend_origin: String,
    pub uploads_dir: PathBuf,
    pub text_dir: PathBuf,
    pub retain_artifacts: bool,
    pub max_upload_bytes: usize,
    pub question_source: QuestionSourceKind,
    pub question_command: String,
    pub question_args: Vec<String>,
    pub question_timeout: Duration,
    pub question_retries: u32,
    pub question_concurrency: usize,
    pub google_api_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let question_source = match env_or("QUESTION_SOURCE", "process").as_str() {
            "process" => QuestionSourceKind::Process,
            "gemini" => QuestionSourceKind::Gemini,
            other => bail!("QUESTION_SOURCE must be 'process' or 'gemini', got '{other}'"),
        };

        let google_api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty());
        if question_source == QuestionSourceKind::Gemini && google_api_key.is_none() {
            bail!("GOOGLE_API_KEY is required when QUESTION_SOURCE=gemini");
        }

        Ok(Config {
            port: parse_env("PORT", 3000)?,
            frontend_origin: env_or("FRONTEND_ORIGIN", "http://localhost:3001"),
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "uploads")),
            text_dir: PathBuf::from(env_or("TEXT_DIR", "text")),
            retain_artifacts: parse_env("RETAIN_ARTIFACTS", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            question_source,
            question_command: env_or("QUESTION_COMMAND", "python3"),
            question_args: split_args(&env_or("QUESTION_ARGS", "question_model.py")),
            question_timeout: Duration::from_secs(parse_env("QUESTION_TIMEOUT_SECS", 60)?),
            question_retries: parse_env("QUESTION_RETRIES", 0)?,
            question_concurrency: parse_env::<usize>("QUESTION_CONCURRENCY", 4)?.max(1),
            google_api_key,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_ignores_extra_whitespace() {
        assert_eq!(
            split_args("  question_model.py   --count 5 "),
            vec!["question_model.py", "--count", "5"]
        );
    }

    #[test]
    fn test_split_args_empty() {
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("PREP_API_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }
}
