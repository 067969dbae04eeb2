// Runners Module
// Executes one simulation job in its working folder

pub mod solver;

pub use solver::SolverRunner;

use std::path::Path;
use std::time::Duration;

/// Result of one solver invocation
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    /// True exactly when the process exited with status zero
    pub success: bool,
    /// Exit code (None if the process never started or was killed)
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Summary naming the job and folder
    pub message: String,
    pub duration: Duration,
}

impl ExecutionOutcome {
    pub fn succeeded(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            message: message.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            message: message.into(),
            duration,
            ..Self::default()
        }
    }

    /// Captured output for error reports, stderr first
    pub fn captured_output(&self) -> String {
        match (self.stderr.is_empty(), self.stdout.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stderr.clone(),
            (true, false) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stderr, self.stdout),
        }
    }
}

/// Executes one job, never retrying
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run `job` inside `folder_path`, chaining from `predecessor` when given
    async fn execute(
        &self,
        folder_path: &Path,
        job: &str,
        predecessor: Option<&str>,
    ) -> ExecutionOutcome;
}
