// TYDEX Module
// Template model, value substitution and document generation

pub mod constants;
pub mod data;
pub mod document;
pub mod engine;
pub mod generator;

use std::path::PathBuf;
use thiserror::Error;

// Re-export key types
pub use constants::{Conversion, LabelRule, ScalarContext, ValueSource, LABEL_RULES};
pub use data::{generate_data_line, replace_token_at};
pub use document::{ChannelDefinition, Section, SectionKind, TydexDocument};
pub use engine::{RenderedDocument, TydexTemplateEngine};
pub use generator::{GeneratedDocument, TydexGenerator};

/// Errors raised while producing a TYDEX document
#[derive(Debug, Error)]
pub enum TydexError {
    #[error("Template '{name}' not found (available: {})", .available.join(", "))]
    TemplateMissing { name: String, available: Vec<String> },

    #[error("Simulation result not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Channel data directory not found: {0}")]
    ChannelDirMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
