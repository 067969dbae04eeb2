// Execution Module
// Dependency resolution, folder locking, progress events and status probes

pub mod events;
pub mod locks;
pub mod resolver;
pub mod status;

// Re-export key types
pub use events::{progress_channel, ProgressReceiver, ProgressSender, ResolutionEvent};
pub use locks::FolderLocks;
pub use resolver::{DependencyResolver, Resolution, ResolutionStatus, ResolveError, VisitedSet};
pub use status::{artifact_exists, probe_job, JobFiles, JobState, JobStatusReport};
