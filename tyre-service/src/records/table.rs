// Run Table
// Scoped lookup of run records and a file-backed table implementation

use crate::error::{ServiceError, ServiceResult};
use crate::records::models::{FolderCoordinate, Protocol, RunRecord};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Run-record store consulted by the resolver.
///
/// Lookups are always scoped: `find_job` must never return a record from a
/// folder coordinate other than the one asked for.
#[async_trait::async_trait]
pub trait JobLookup: Send + Sync {
    /// Find a record whose job name equals `job` exactly within `folder`
    async fn find_job(&self, job: &str, folder: &FolderCoordinate)
        -> ServiceResult<Option<RunRecord>>;

    /// Find a record by its run number
    async fn find_run(&self, run_number: u32) -> ServiceResult<Option<RunRecord>>;
}

/// A protocol run table held in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTable {
    pub protocol: Protocol,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl RunTable {
    pub fn new(protocol: Protocol, runs: Vec<RunRecord>) -> Self {
        Self { protocol, runs }
    }

    /// Load a table from a YAML or JSON file (by extension, YAML otherwise)
    pub fn from_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Load a table and check that it belongs to the expected protocol
    pub fn from_file_for(path: impl AsRef<Path>, protocol: Protocol) -> ServiceResult<Self> {
        let table = Self::from_file(path)?;
        if table.protocol != protocol {
            return Err(ServiceError::InvalidInput(format!(
                "run table is for protocol {}, expected {}",
                table.protocol, protocol
            )));
        }
        Ok(table)
    }
}

#[async_trait::async_trait]
impl JobLookup for RunTable {
    async fn find_job(
        &self,
        job: &str,
        folder: &FolderCoordinate,
    ) -> ServiceResult<Option<RunRecord>> {
        Ok(self
            .runs
            .iter()
            .find(|r| r.job == job && r.p == folder.pressure && r.l == folder.load)
            .cloned())
    }

    async fn find_run(&self, run_number: u32) -> ServiceResult<Option<RunRecord>> {
        Ok(self.runs.iter().find(|r| r.run_number == run_number).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
protocol: mf62
runs:
  - number_of_runs: 1
    job: rolling_1.inp
    old_job: "-"
    template_tydex: rolling
    tydex_name: rolling_out
    p: 1
    l: 1
  - number_of_runs: 2
    job: cornering_2.inp
    old_job: rolling_1.inp
    p: 1
    l: 1
    slip_angle: 5
  - number_of_runs: 3
    job: rolling_1.inp
    old_job: "-"
    p: 2
    l: 1
"#;

    #[tokio::test]
    async fn test_find_job_scoped_to_folder() {
        let table: RunTable = serde_yaml::from_str(TABLE).unwrap();

        let found = table
            .find_job("rolling_1.inp", &FolderCoordinate::new("2", "1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.run_number, 3);

        let missing = table
            .find_job("cornering_2.inp", &FolderCoordinate::new("2", "1"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_job_exact_name_only() {
        let table: RunTable = serde_yaml::from_str(TABLE).unwrap();
        let found = table
            .find_job("rolling_1", &FolderCoordinate::new("1", "1"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_run() {
        let table: RunTable = serde_yaml::from_str(TABLE).unwrap();
        let record = table.find_run(2).await.unwrap().unwrap();
        assert_eq!(record.job, "cornering_2.inp");
        assert_eq!(record.slip_angle, Some(5.0));
        assert!(table.find_run(9).await.unwrap().is_none());
    }

    #[test]
    fn test_from_file_json_and_protocol_check() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("runs.json");
        fs::write(
            &path,
            r#"{"protocol":"FTire","runs":[{"number_of_runs":1,"job":"a.inp","p":"1","l":"1"}]}"#,
        )
        .unwrap();

        let table = RunTable::from_file_for(&path, Protocol::FTire).unwrap();
        assert_eq!(table.runs.len(), 1);
        assert!(RunTable::from_file_for(&path, Protocol::Mf52).is_err());
    }
}
