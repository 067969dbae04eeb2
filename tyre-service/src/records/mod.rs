// Records Module
// Run-record models and the scoped lookup collaborator

pub mod models;
pub mod table;

pub use models::{FolderCoordinate, Protocol, RunRecord};
pub use table::{JobLookup, RunTable};
