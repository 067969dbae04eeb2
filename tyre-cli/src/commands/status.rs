use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use tyre_service::{
    probe_job, FolderCoordinate, JobLookup, JobState, ProjectLayout, Protocol,
    RunTable, ServiceConfig, TydexGenerator,
};

/// Show the solver state of a job
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project name
    #[arg(long, value_name = "NAME")]
    pub project: String,

    /// Protocol (mf62, mf52, ftire, cdtire, custom)
    #[arg(long, value_name = "PROTOCOL")]
    pub protocol: Protocol,

    /// Folder coordinate, written <p>_<l>
    #[arg(long, value_name = "P_L", required_unless_present = "runs", conflicts_with = "runs")]
    pub folder: Option<FolderCoordinate>,

    /// Job name, with or without the input suffix
    #[arg(long, value_name = "JOB", required_unless_present = "runs", conflicts_with = "runs")]
    pub job: Option<String>,

    /// Run table file; with --run, the job and folder come from the run and
    /// the TYDEX document is checked too
    #[arg(long, value_name = "FILE", requires = "run")]
    pub runs: Option<PathBuf>,

    /// Run number within the table
    #[arg(long, value_name = "N", requires = "runs")]
    pub run: Option<u32>,
}

pub async fn execute(args: StatusArgs, config: ServiceConfig) -> Result<()> {
    let layout = ProjectLayout::new(&config, &args.project, args.protocol);

    let (folder, job, document) = match (&args.runs, args.run) {
        (Some(runs), Some(run)) => {
            if !runs.exists() {
                color_eyre::eyre::bail!("Run table not found: {}", runs.display());
            }
            let table = RunTable::from_file_for(runs, args.protocol)?;
            let Some(record) = table.find_run(run).await? else {
                color_eyre::eyre::bail!("Run {} not found in {}", run, runs.display());
            };
            let generator = TydexGenerator::new(layout.clone(), config.document.clone());
            let (_, output_name) = generator.document_names(&record);
            let written = generator.document_exists(&record);
            (record.folder(), record.job, Some((output_name, written)))
        }
        _ => match (args.folder, args.job) {
            (Some(folder), Some(job)) => (folder, job, None),
            _ => color_eyre::eyre::bail!("Give --folder and --job, or --runs and --run"),
        },
    };

    let folder_dir = layout.folder_dir(&folder);
    if !folder_dir.is_dir() {
        color_eyre::eyre::bail!("Folder not found: {}", folder_dir.display());
    }

    tracing::debug!(job = %job, folder = %folder, "checking job status");
    let report = probe_job(&layout, &folder, &job);
    output::header(&format!("{} in {}", report.job, report.folder));

    let file_line = |present: bool, name: &str| {
        if present {
            output::check(name);
        } else {
            output::dim(&format!("  - {}", name));
        }
    };
    let naming = layout.naming();
    file_line(
        report.files.artifact,
        &format!("{}.{}", report.job, naming.artifact_extension),
    );
    file_line(report.files.status_file, &format!("{}.sta", report.job));
    file_line(report.files.message_file, &format!("{}.msg", report.job));
    if let Some((name, written)) = &document {
        file_line(*written, name);
    }

    println!("{}", state_label(report.state));

    match report.state {
        JobState::Completed => output::success(&report.message),
        JobState::Error => output::failure(&report.message),
        JobState::Running => output::info(&report.message),
        JobState::NotStarted => {}
    }
    if let Some((name, false)) = &document {
        if report.state == JobState::Completed {
            output::info(&format!("{} not generated yet", name));
        }
    }

    Ok(())
}

fn state_label(state: JobState) -> &'static str {
    match state {
        JobState::NotStarted => "not started",
        JobState::Running => "running",
        JobState::Completed => "completed",
        JobState::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        status: StatusArgs,
    }

    fn parse(args: &[&str]) -> Result<StatusArgs, clap::Error> {
        let argv = std::iter::once("tyre").chain(args.iter().copied());
        TestCli::try_parse_from(argv).map(|cli| cli.status)
    }

    #[test]
    fn test_status_by_folder_and_job() {
        let args = parse(&[
            "--project", "p", "--protocol", "mf62", "--folder", "1_2", "--job", "a.inp",
        ])
        .unwrap();
        assert_eq!(args.folder, Some(FolderCoordinate::new("1", "2")));
        assert_eq!(args.job.as_deref(), Some("a.inp"));
        assert!(args.runs.is_none());
    }

    #[test]
    fn test_status_by_run() {
        let args = parse(&[
            "--project", "p", "--protocol", "ftire", "--runs", "runs.yaml", "--run", "3",
        ])
        .unwrap();
        assert_eq!(args.run, Some(3));
        assert!(args.folder.is_none());
    }

    #[test]
    fn test_status_requires_a_target() {
        assert!(parse(&["--project", "p", "--protocol", "mf62"]).is_err());
        assert!(parse(&["--project", "p", "--protocol", "mf62", "--runs", "r.yaml"]).is_err());
        assert!(parse(&[
            "--project", "p", "--protocol", "mf62", "--runs", "r.yaml", "--run", "1", "--job", "a",
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_status_by_run_checks_document() {
        let temp = tempfile::tempdir().unwrap();
        let config = ServiceConfig::default().with_root(temp.path());
        let layout = ProjectLayout::new(&config, "p", Protocol::Mf62);
        let folder = FolderCoordinate::new("1", "1");
        std::fs::create_dir_all(layout.folder_dir(&folder)).unwrap();
        std::fs::write(layout.artifact_path(&folder, "a"), "").unwrap();
        std::fs::write(layout.document_path(&folder, "t.tdx"), "").unwrap();

        let runs = temp.path().join("runs.yaml");
        std::fs::write(
            &runs,
            "protocol: mf62\n\
             runs:\n\
             - {number_of_runs: 1, job: a.inp, old_job: '-', template_tydex: t, p: 1, l: 1}\n",
        )
        .unwrap();
        let runs = runs.to_str().unwrap();

        let args = parse(&["--project", "p", "--protocol", "mf62", "--runs", runs, "--run", "1"])
            .unwrap();
        execute(args, config.clone()).await.unwrap();

        let args = parse(&["--project", "p", "--protocol", "mf62", "--runs", runs, "--run", "9"])
            .unwrap();
        let err = execute(args, config).await.unwrap_err();
        assert!(err.to_string().contains("Run 9 not found"));
    }
}
