// Project Layout
// Maps projects, folder coordinates and jobs to paths on disk

use crate::config::{NamingConfig, ServiceConfig};
use crate::records::{FolderCoordinate, Protocol};
use crate::utils::{ensure_extension, strip_suffix};

use std::path::{Path, PathBuf};

/// Directory name of the extracted channel CSV files inside a folder
pub const CHANNEL_DIR: &str = "temp";

/// Name of the parameter store inside a folder
pub const PARAMETER_FILE: &str = "parameters.inc";

/// Resolves paths below a project directory.
///
/// ```text
/// <root>/projects/<project>_<ABBR>/<p>_<l>/<job>.odb
///                                         /parameters.inc
///                                         /temp/*.csv
/// <root>/templates/Tydex/<protocol dir>/<template>.tdx
/// ```
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    project_dir: PathBuf,
    template_dir: PathBuf,
    naming: NamingConfig,
}

impl ProjectLayout {
    pub fn new(config: &ServiceConfig, project: &str, protocol: Protocol) -> Self {
        let project_dir = config
            .root
            .join("projects")
            .join(format!("{}_{}", project, protocol.abbreviation()));
        let template_dir = config
            .root
            .join("templates")
            .join("Tydex")
            .join(protocol.template_dir_name());
        Self {
            project_dir,
            template_dir,
            naming: config.naming.clone(),
        }
    }

    /// Layout rooted at an explicit project directory
    pub fn from_project_dir(
        project_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        naming: NamingConfig,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            template_dir: template_dir.into(),
            naming,
        }
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn folder_dir(&self, folder: &FolderCoordinate) -> PathBuf {
        self.project_dir.join(folder.folder_name())
    }

    /// Job name with the input suffix removed
    pub fn canonical_job<'a>(&self, job: &'a str) -> &'a str {
        strip_suffix(job.trim(), &self.naming.input_suffix)
    }

    /// Result file whose presence marks `job` as complete
    pub fn artifact_path(&self, folder: &FolderCoordinate, job: &str) -> PathBuf {
        self.job_file(folder, job, &self.naming.artifact_extension)
    }

    /// `<folder>/<job>.<extension>` for solver side files (`.sta`, `.msg`)
    pub fn job_file(&self, folder: &FolderCoordinate, job: &str, extension: &str) -> PathBuf {
        self.folder_dir(folder)
            .join(format!("{}.{}", self.canonical_job(job), extension))
    }

    pub fn channel_dir(&self, folder: &FolderCoordinate) -> PathBuf {
        self.folder_dir(folder).join(CHANNEL_DIR)
    }

    pub fn parameter_path(&self, folder: &FolderCoordinate) -> PathBuf {
        self.folder_dir(folder).join(PARAMETER_FILE)
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        self.template_dir
            .join(ensure_extension(template, &self.naming.template_extension))
    }

    pub fn document_path(&self, folder: &FolderCoordinate, document: &str) -> PathBuf {
        self.folder_dir(folder)
            .join(ensure_extension(document, &self.naming.template_extension))
    }
}
