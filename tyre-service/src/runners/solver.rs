// Solver Runner
// Launches the external simulation binary for one job in its folder

use crate::config::{NamingConfig, SolverConfig};
use crate::runners::{ExecutionOutcome, JobExecutor};
use crate::utils::strip_suffix;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// How long output collectors may run on after the solver was killed
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs `<program> [leading args] job=<id> [oldjob=<pred>] input=<id>.inp`.
///
/// The command is spawned from an argument vector, never through a shell,
/// so job names are passed through verbatim.
pub struct SolverRunner {
    config: SolverConfig,
    input_suffix: String,
}

impl SolverRunner {
    pub fn new(config: SolverConfig, naming: &NamingConfig) -> Self {
        Self {
            config,
            input_suffix: naming.input_suffix.clone(),
        }
    }

    /// Arguments for one solver invocation (after the program name)
    pub fn build_args(&self, job: &str, predecessor: Option<&str>) -> Vec<String> {
        let job = strip_suffix(job, &self.input_suffix);
        let mut args = self.config.leading_args.clone();
        args.push(format!("job={}", job));
        if let Some(pred) = predecessor {
            args.push(format!(
                "oldjob={}",
                strip_suffix(pred, &self.input_suffix)
            ));
        }
        args.push(format!("input={}{}", job, self.input_suffix));
        args
    }

    /// Resolve the solver program, searching PATH for bare names
    fn program(&self) -> PathBuf {
        let program = Path::new(&self.config.program);
        if program.components().count() > 1 {
            return program.to_path_buf();
        }
        which::which(&self.config.program).unwrap_or_else(|_| program.to_path_buf())
    }
}

#[async_trait::async_trait]
impl JobExecutor for SolverRunner {
    async fn execute(
        &self,
        folder_path: &Path,
        job: &str,
        predecessor: Option<&str>,
    ) -> ExecutionOutcome {
        let started = Instant::now();
        let program = self.program();
        let args = self.build_args(job, predecessor);

        tracing::info!(
            folder = %folder_path.display(),
            program = %program.display(),
            args = ?args,
            "launching solver"
        );

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        cmd.current_dir(folder_path);
        cmd.envs(&self.config.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        // Own process group, so a timeout can take down the solver's workers too
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExecutionOutcome::failed(
                    format!(
                        "Failed to start solver '{}' in {}: {}",
                        program.display(),
                        folder_path.display(),
                        e
                    ),
                    started.elapsed(),
                );
            }
        };

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        // Drain both pipes concurrently
        let stdout_handle = tokio::spawn(collect_output(stdout));
        let stderr_handle = tokio::spawn(collect_output(stderr));

        let wait_result = match self.config.timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        job,
                        folder = %folder_path.display(),
                        ?timeout,
                        "solver timed out, killing its process group"
                    );
                    kill_process_group(&child);
                    let _ = child.kill().await;
                    let mut outcome = ExecutionOutcome::failed(
                        format!(
                            "Solver timed out after {:?} for job {} in {}",
                            timeout,
                            job,
                            folder_path.display()
                        ),
                        started.elapsed(),
                    );
                    outcome.stdout = join_bounded(stdout_handle).await;
                    outcome.stderr = join_bounded(stderr_handle).await;
                    return outcome;
                }
            },
            None => child.wait().await,
        };

        let stdout = stdout_handle.await.unwrap_or_default();
        let stderr = stderr_handle.await.unwrap_or_default();
        let duration = started.elapsed();

        match wait_result {
            Ok(status) if status.success() => ExecutionOutcome {
                success: true,
                exit_code: status.code(),
                stdout,
                stderr,
                message: format!("Job {} completed in {}", job, folder_path.display()),
                duration,
            },
            Ok(status) => ExecutionOutcome {
                success: false,
                exit_code: status.code(),
                message: format!(
                    "Process exited with code {} in folder {}",
                    status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                    folder_path.display()
                ),
                stdout,
                stderr,
                duration,
            },
            Err(e) => {
                let mut outcome = ExecutionOutcome::failed(
                    format!("Failed to wait for solver in {}: {}", folder_path.display(), e),
                    duration,
                );
                outcome.stdout = stdout;
                outcome.stderr = stderr;
                outcome
            }
        }
    }
}

/// Read a pipe to its end; bytes that are not UTF-8 are replaced, never fatal
async fn collect_output<R>(mut reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_to_end(&mut bytes).await {
        tracing::debug!(error = %e, "solver output pipe closed with error");
    }
    String::from_utf8_lossy(&bytes).trim_end().to_string()
}

/// Collector result, giving up after `DRAIN_GRACE` when descendants keep the pipe open
async fn join_bounded(mut handle: JoinHandle<String>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, &mut handle).await {
        Ok(result) => result.unwrap_or_default(),
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    if let Some(pid) = child.id() {
        // SAFETY: kill(2) with a negative pid signals the group created at spawn
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}
