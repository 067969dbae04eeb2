// Tyre Simulation Service Library
// Job dependency resolution, solver execution and TYDEX document generation

pub mod channels;
pub mod config;
pub mod error;
pub mod execution;
pub mod layout;
pub mod params;
pub mod records;
pub mod runners;
pub mod tydex;
pub mod utils;

// Re-export commonly used types
pub use config::{DocumentConfig, NamingConfig, ServiceConfig, SolverConfig};
pub use error::{ServiceError, ServiceResult};
pub use layout::ProjectLayout;
pub use params::ParameterSet;

// Re-export record types
pub use records::{FolderCoordinate, JobLookup, Protocol, RunRecord, RunTable};

// Re-export execution types
pub use execution::{
    progress_channel, probe_job, DependencyResolver, FolderLocks, JobState, JobStatusReport,
    ProgressReceiver, ProgressSender, Resolution, ResolutionEvent, ResolutionStatus,
    ResolveError,
};

// Re-export runner types
pub use runners::{ExecutionOutcome, JobExecutor, SolverRunner};

// Re-export channel and document types
pub use channels::{ChannelData, ChannelDataLoader, ChannelSeries};
pub use tydex::{
    GeneratedDocument, ScalarContext, TydexDocument, TydexError, TydexGenerator,
    TydexTemplateEngine,
};
