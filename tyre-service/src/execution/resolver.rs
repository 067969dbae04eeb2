// Dependency Resolver
// Walks predecessor links depth-first and runs each job at most once

use crate::execution::events::{EventSender, ProgressSender, ResolutionEvent};
use crate::execution::locks::FolderLocks;
use crate::layout::ProjectLayout;
use crate::records::{FolderCoordinate, JobLookup, RunRecord};
use crate::runners::JobExecutor;
use crate::utils::toggle_suffix;

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Canonical job names already entered during one top-level resolution
pub type VisitedSet = HashSet<String>;

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Resolution, ResolveError>> + Send + 'a>>;

/// Why a resolution failed
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Job \"{job}\" not found in folder {folder}. Dependencies must exist within the same folder.")]
    NotFound {
        job: String,
        folder: FolderCoordinate,
    },

    #[error("Failed to execute job {job} in folder {folder}: {message}")]
    ExecutionFailed {
        job: String,
        folder: FolderCoordinate,
        message: String,
        /// Captured solver output
        output: String,
    },

    #[error("Failed to resolve dependency {predecessor}: {source}")]
    PredecessorFailed {
        job: String,
        predecessor: String,
        source: Box<ResolveError>,
    },

    #[error("Run {0} not found")]
    RunNotFound(u32),

    #[error("Project folder not found: {}", .0.display())]
    ProjectMissing(PathBuf),

    #[error("Run-record lookup failed: {0}")]
    Lookup(String),
}

impl ResolveError {
    /// The innermost failure, following predecessor links
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::PredecessorFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// How a job reached the resolved state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// The solver ran and exited successfully
    Executed,
    /// The artifact already existed
    AlreadyComplete,
    /// The job was already entered earlier in this resolution
    CycleSkipped,
}

/// Successful resolution of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub job: String,
    pub folder: FolderCoordinate,
    pub status: ResolutionStatus,
    pub message: String,
}

/// Resolves a job and its predecessors inside one folder coordinate.
///
/// Resolution is depth-first and sequential: a predecessor is fully
/// resolved before its successor runs. The artifact file is the only
/// completion witness.
pub struct DependencyResolver {
    lookup: Arc<dyn JobLookup>,
    executor: Arc<dyn JobExecutor>,
    layout: ProjectLayout,
    locks: FolderLocks,
    events: EventSender,
}

impl DependencyResolver {
    pub fn new(
        lookup: Arc<dyn JobLookup>,
        executor: Arc<dyn JobExecutor>,
        layout: ProjectLayout,
    ) -> Self {
        Self {
            lookup,
            executor,
            layout,
            locks: FolderLocks::new(),
            events: EventSender::default(),
        }
    }

    /// Share folder locks with other resolvers working on the same project
    pub fn with_locks(mut self, locks: FolderLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Set progress event sender
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.events = EventSender::new(Some(tx));
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Look up run `run_number` and resolve its job in its own folder
    pub async fn resolve_run(&self, run_number: u32) -> Result<Resolution, ResolveError> {
        let record = self
            .lookup
            .find_run(run_number)
            .await
            .map_err(|e| ResolveError::Lookup(e.to_string()))?
            .ok_or(ResolveError::RunNotFound(run_number))?;

        if !self.layout.project_dir().exists() {
            return Err(ResolveError::ProjectMissing(
                self.layout.project_dir().to_path_buf(),
            ));
        }

        tracing::info!(run = run_number, job = %record.job, folder = %record.folder(), "starting dependency resolution");
        self.resolve(&record.job, &record.folder()).await
    }

    /// Resolve `job` in `folder` with a fresh visited set.
    ///
    /// Holds the folder's lock for the whole call, so concurrent
    /// resolutions of the same folder run one after the other.
    pub async fn resolve(
        &self,
        job: &str,
        folder: &FolderCoordinate,
    ) -> Result<Resolution, ResolveError> {
        let _guard = self.locks.acquire(folder).await;
        let mut visited = VisitedSet::new();
        self.resolve_with_visited(job, folder, &mut visited).await
    }

    /// Resolve `job` in `folder`, sharing `visited` with the caller.
    ///
    /// Does not take the folder lock.
    pub fn resolve_with_visited<'a>(
        &'a self,
        job: &'a str,
        folder: &'a FolderCoordinate,
        visited: &'a mut VisitedSet,
    ) -> ResolveFuture<'a> {
        self.resolve_node(job, folder, visited, 0)
    }

    fn resolve_node<'a>(
        &'a self,
        job: &'a str,
        folder: &'a FolderCoordinate,
        visited: &'a mut VisitedSet,
        depth: usize,
    ) -> ResolveFuture<'a> {
        Box::pin(async move {
            let canonical = self.layout.canonical_job(job).to_string();

            // Cycle breaker: a revisit counts as satisfied without checking the artifact
            if !visited.insert(canonical.clone()) {
                tracing::warn!(job = %canonical, folder = %folder, "circular dependency detected, skipping");
                self.events.send(ResolutionEvent::JobSkipped {
                    job: canonical.clone(),
                    folder: folder.clone(),
                    reason: "already visited in this resolution".to_string(),
                });
                return Ok(Resolution {
                    message: format!("Circular dependency avoided for {}", canonical),
                    job: canonical,
                    folder: folder.clone(),
                    status: ResolutionStatus::CycleSkipped,
                });
            }

            let record = self.find_record(job, folder).await?;
            let actual = self.layout.canonical_job(&record.job).to_string();

            tracing::debug!(job = %actual, folder = %folder, depth, "resolving job");
            self.events.send(ResolutionEvent::JobEntered {
                job: actual.clone(),
                folder: folder.clone(),
                depth,
            });

            let artifact = self.layout.artifact_path(folder, &record.job);
            if artifact.exists() {
                tracing::info!(job = %actual, folder = %folder, "artifact already exists");
                self.events.send(ResolutionEvent::JobSkipped {
                    job: actual.clone(),
                    folder: folder.clone(),
                    reason: format!("{} exists", artifact.display()),
                });
                return Ok(Resolution {
                    message: format!("Job {} already completed", actual),
                    job: actual,
                    folder: folder.clone(),
                    status: ResolutionStatus::AlreadyComplete,
                });
            }

            let predecessor = record.predecessor(&self.layout.naming().no_predecessor);
            if let Some(predecessor) = predecessor {
                tracing::debug!(job = %actual, predecessor, "resolving predecessor first");
                self.events.send(ResolutionEvent::PredecessorRequired {
                    job: actual.clone(),
                    predecessor: predecessor.to_string(),
                    folder: folder.clone(),
                });

                self.resolve_node(predecessor, folder, visited, depth + 1)
                    .await
                    .map_err(|e| ResolveError::PredecessorFailed {
                        job: actual.clone(),
                        predecessor: predecessor.to_string(),
                        source: Box::new(e),
                    })?;
            }

            self.run_job(&actual, folder, predecessor).await
        })
    }

    /// Find the record under the given name or with the input suffix toggled
    async fn find_record(
        &self,
        job: &str,
        folder: &FolderCoordinate,
    ) -> Result<RunRecord, ResolveError> {
        let job = job.trim();
        let candidates = [
            job.to_string(),
            toggle_suffix(job, &self.layout.naming().input_suffix),
        ];

        for candidate in &candidates {
            let found = self
                .lookup
                .find_job(candidate, folder)
                .await
                .map_err(|e| ResolveError::Lookup(e.to_string()))?;

            match found {
                Some(record) if record.folder() == *folder => return Ok(record),
                Some(record) => {
                    tracing::error!(
                        job = %candidate,
                        folder = %folder,
                        returned = %record.folder(),
                        "lookup returned a record from another folder"
                    );
                }
                None => {}
            }
        }

        Err(ResolveError::NotFound {
            job: job.to_string(),
            folder: folder.clone(),
        })
    }

    async fn run_job(
        &self,
        job: &str,
        folder: &FolderCoordinate,
        predecessor: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let folder_path = self.layout.folder_dir(folder);

        tracing::info!(job, folder = %folder, predecessor = ?predecessor, "executing job");
        self.events.send(ResolutionEvent::JobStarted {
            job: job.to_string(),
            folder: folder.clone(),
            predecessor: predecessor.map(String::from),
        });

        let outcome = self.executor.execute(&folder_path, job, predecessor).await;

        self.events.send(ResolutionEvent::JobCompleted {
            job: job.to_string(),
            folder: folder.clone(),
            success: outcome.success,
            exit_code: outcome.exit_code,
            duration: outcome.duration,
        });

        if !outcome.success {
            tracing::error!(job, folder = %folder, exit_code = ?outcome.exit_code, "job failed");
            return Err(ResolveError::ExecutionFailed {
                job: job.to_string(),
                folder: folder.clone(),
                output: outcome.captured_output(),
                message: outcome.message,
            });
        }

        tracing::info!(job, folder = %folder, "job executed successfully");
        Ok(Resolution {
            job: job.to_string(),
            folder: folder.clone(),
            status: ResolutionStatus::Executed,
            message: format!("Job {} executed successfully", job),
        })
    }
}
