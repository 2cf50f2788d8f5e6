use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{parse_question_lines, QuestionError, QuestionSource};

/// Runs `program args.. <technology>` and reads one question per stdout line.
///
/// No shell is involved: the technology name is passed as a single argv
/// element, so quotes or metacharacters in it are never interpreted. The child
/// is killed if the future is dropped (e.g. by the provider's timeout).
pub struct ProcessQuestionSource {
    program: String,
    args: Vec<String>,
}

impl ProcessQuestionSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl QuestionSource for ProcessQuestionSource {
    async fn generate(&self, technology: &str) -> Result<Vec<String>, QuestionError> {
        debug!(program = %self.program, technology, "Spawning question generator");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(technology)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(QuestionError::Spawn)?;

        if !output.status.success() {
            return Err(QuestionError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|e| QuestionError::Decode(e.to_string()))?;
        Ok(parse_question_lines(&stdout))
    }

    fn name(&self) -> &'static str {
        "process"
    }
}
