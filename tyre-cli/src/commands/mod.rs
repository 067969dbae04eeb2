pub mod generate;
pub mod render;
pub mod resolve;
pub mod status;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use tyre_service::{JobLookup, ProjectLayout, Protocol, RunRecord, RunTable, ServiceConfig};

/// Arguments naming one run of a project
#[derive(Args, Debug)]
pub struct RunSelection {
    /// Project name
    #[arg(long, value_name = "NAME")]
    pub project: String,

    /// Protocol (mf62, mf52, ftire, cdtire, custom)
    #[arg(long, value_name = "PROTOCOL")]
    pub protocol: Protocol,

    /// Run table file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub runs: PathBuf,

    /// Run number within the table
    #[arg(long, value_name = "N")]
    pub run: u32,
}

impl RunSelection {
    pub fn layout(&self, config: &ServiceConfig) -> ProjectLayout {
        ProjectLayout::new(config, &self.project, self.protocol)
    }

    pub fn table(&self) -> Result<RunTable> {
        if !self.runs.exists() {
            color_eyre::eyre::bail!("Run table not found: {}", self.runs.display());
        }
        Ok(RunTable::from_file_for(&self.runs, self.protocol)?)
    }

    pub async fn record(&self, table: &RunTable) -> Result<RunRecord> {
        match table.find_run(self.run).await? {
            Some(record) => Ok(record),
            None => color_eyre::eyre::bail!(
                "Run {} not found in {}",
                self.run,
                self.runs.display()
            ),
        }
    }
}
