// Job Status Probe
// Infers a job's state from the files the solver leaves in its folder

use crate::layout::ProjectLayout;
use crate::records::FolderCoordinate;

use serde::Serialize;
use std::fs;

/// Observed state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    NotStarted,
    Running,
    Completed,
    Error,
}

/// Which solver files exist for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JobFiles {
    pub artifact: bool,
    pub status_file: bool,
    pub message_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusReport {
    pub job: String,
    pub folder: String,
    pub state: JobState,
    pub message: String,
    pub files: JobFiles,
}

/// Probe `job` in `folder`.
///
/// The artifact wins; otherwise the `.sta` file is inspected for
/// `COMPLETED`, `ABORTED` or `ERROR`; a lone `.msg` file means the
/// solver has started.
pub fn probe_job(layout: &ProjectLayout, folder: &FolderCoordinate, job: &str) -> JobStatusReport {
    let sta = layout.job_file(folder, job, "sta");
    let msg = layout.job_file(folder, job, "msg");

    let files = JobFiles {
        artifact: artifact_exists(layout, folder, job),
        status_file: sta.exists(),
        message_file: msg.exists(),
    };

    let (state, message) = if files.artifact {
        (JobState::Completed, "Job completed successfully - artifact exists".to_string())
    } else if files.status_file {
        match fs::read_to_string(&sta) {
            Ok(content) if content.contains("COMPLETED") => {
                (JobState::Completed, "Job completed according to status file".to_string())
            }
            Ok(content) if content.contains("ABORTED") || content.contains("ERROR") => {
                (JobState::Error, "Job aborted or encountered error".to_string())
            }
            Ok(_) => (JobState::Running, "Job is currently running".to_string()),
            Err(e) => {
                tracing::warn!(path = %sta.display(), error = %e, "could not read status file");
                (JobState::Running, "Status file exists but could not be read".to_string())
            }
        }
    } else if files.message_file {
        (JobState::Running, "Job started - message file exists".to_string())
    } else {
        (JobState::NotStarted, String::new())
    };

    JobStatusReport {
        job: layout.canonical_job(job).to_string(),
        folder: folder.folder_name(),
        state,
        message,
        files,
    }
}

/// Whether the result artifact of `job` exists
pub fn artifact_exists(layout: &ProjectLayout, folder: &FolderCoordinate, job: &str) -> bool {
    layout.artifact_path(folder, job).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::NamingConfig;

    fn setup() -> (tempfile::TempDir, ProjectLayout, FolderCoordinate) {
        let temp = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::from_project_dir(
            temp.path(),
            temp.path().join("templates"),
            NamingConfig::default(),
        );
        let folder = FolderCoordinate::new("1", "1");
        fs::create_dir_all(layout.folder_dir(&folder)).unwrap();
        (temp, layout, folder)
    }

    #[test]
    fn test_not_started() {
        let (_temp, layout, folder) = setup();
        let report = probe_job(&layout, &folder, "rolling_1.inp");
        assert_eq!(report.state, JobState::NotStarted);
        assert_eq!(report.job, "rolling_1");
        assert_eq!(report.files, JobFiles::default());
    }

    #[test]
    fn test_artifact_means_completed() {
        let (_temp, layout, folder) = setup();
        fs::write(layout.artifact_path(&folder, "rolling_1"), "").unwrap();
        fs::write(layout.job_file(&folder, "rolling_1", "sta"), "ERROR").unwrap();

        let report = probe_job(&layout, &folder, "rolling_1");
        assert_eq!(report.state, JobState::Completed);
        assert!(report.files.artifact && report.files.status_file);
        assert!(artifact_exists(&layout, &folder, "rolling_1.inp"));
    }

    #[test]
    fn test_status_file_contents() {
        let (_temp, layout, folder) = setup();
        let sta = layout.job_file(&folder, "a", "sta");

        fs::write(&sta, " STEP 1 INCREMENT 4\n").unwrap();
        assert_eq!(probe_job(&layout, &folder, "a").state, JobState::Running);

        fs::write(&sta, " THE ANALYSIS HAS COMPLETED SUCCESSFULLY\n").unwrap();
        assert_eq!(probe_job(&layout, &folder, "a").state, JobState::Completed);

        fs::write(&sta, " THE ANALYSIS HAS BEEN ABORTED\n").unwrap();
        assert_eq!(probe_job(&layout, &folder, "a").state, JobState::Error);
    }

    #[test]
    fn test_message_file_means_running() {
        let (_temp, layout, folder) = setup();
        fs::write(layout.job_file(&folder, "a", "msg"), "").unwrap();
        let report = probe_job(&layout, &folder, "a");
        assert_eq!(report.state, JobState::Running);
        assert!(report.files.message_file);
    }
}
