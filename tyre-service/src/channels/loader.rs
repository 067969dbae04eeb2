// Channel Data Loader
// Resolves TYDEX channel names to time series from extracted CSV files

use crate::channels::source::{Column, SourceTable};
use crate::error::ServiceResult;
use crate::params::ParameterSet;
use crate::utils::format_fixed;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Parameter holding the tyre's outer diameter
pub const OUTER_DIAMETER_PARAM: &str = "Outer_diameter";

/// How a channel's values are written into MEASURDATA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Row counter, written as an integer
    Sequence,
    /// Time stamps, 8 decimals
    Time,
    /// Measured values, 4 decimals
    Value,
}

impl ChannelKind {
    pub fn format(&self, value: f64) -> String {
        match self {
            ChannelKind::Sequence => format!("{}", value.round() as i64),
            ChannelKind::Time => format_fixed(value, 8),
            ChannelKind::Value => format_fixed(value, 4),
        }
    }
}

/// Where a channel's values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSource {
    /// One column of a source file
    File(&'static str, Column),
    /// Time column of FX.csv, falling back to U1.csv
    RunTime,
    /// Outer radius minus vertical displacement
    GroundClearance,
    /// 1..=maxRows, no file
    Sequence,
    /// Not a channel this system can supply
    Unknown,
}

/// Fixed table of channel name aliases
pub fn channel_source(name: &str) -> ChannelSource {
    match name {
        "FX" | "FXW" => ChannelSource::File("FX.csv", Column::Value),
        "FYW" | "FYH" => ChannelSource::File("FYW.csv", Column::Value),
        "FZW" | "FZH" => ChannelSource::File("FZW.csv", Column::Value),
        "MXW" | "MXH" => ChannelSource::File("MXW.csv", Column::Value),
        "MZW" | "MZH" => ChannelSource::File("MZW.csv", Column::Value),
        "U1" => ChannelSource::File("U1.csv", Column::Value),
        "U2" => ChannelSource::File("U2.csv", Column::Value),
        "U3" | "TYREDEFW" => ChannelSource::File("U3.csv", Column::Value),
        "DSTGRWHC" => ChannelSource::GroundClearance,
        "RUNTIME" => ChannelSource::RunTime,
        "MEASNUMB" => ChannelSource::Sequence,
        _ => ChannelSource::Unknown,
    }
}

impl ChannelSource {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelSource::Sequence => ChannelKind::Sequence,
            ChannelSource::RunTime => ChannelKind::Time,
            _ => ChannelKind::Value,
        }
    }
}

/// Ordered values of one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    pub name: String,
    pub kind: ChannelKind,
    pub values: Vec<f64>,
}

impl ChannelSeries {
    pub fn empty(name: &str, kind: ChannelKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Formatted value at `row`, or `None` past the end of the series
    pub fn formatted(&self, row: usize) -> Option<String> {
        self.values.get(row).map(|v| self.kind.format(*v))
    }
}

/// Every series needed for one document plus the shared row bound
#[derive(Debug, Clone, Default)]
pub struct ChannelData {
    series: HashMap<String, ChannelSeries>,
    max_rows: usize,
}

impl ChannelData {
    /// Build from already-materialized series; sequence channels are
    /// (re)numbered 1..=maxRows
    pub fn from_series(series: impl IntoIterator<Item = ChannelSeries>) -> Self {
        let mut series: HashMap<String, ChannelSeries> =
            series.into_iter().map(|s| (s.name.clone(), s)).collect();

        let max_rows = series
            .values()
            .filter(|s| s.kind != ChannelKind::Sequence)
            .map(ChannelSeries::len)
            .max()
            .unwrap_or(0);

        for s in series.values_mut().filter(|s| s.kind == ChannelKind::Sequence) {
            s.values = (1..=max_rows).map(|i| i as f64).collect();
        }

        Self { series, max_rows }
    }

    /// Length of the longest non-sequence series
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn get(&self, name: &str) -> Option<&ChannelSeries> {
        self.series.get(name)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Loads channel series from a directory of source files.
///
/// Each source file is read at most once per loader.
pub struct ChannelDataLoader {
    source_dir: PathBuf,
    outer_diameter: f64,
    tables: HashMap<&'static str, Option<SourceTable>>,
}

impl ChannelDataLoader {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            outer_diameter: 0.0,
            tables: HashMap::new(),
        }
    }

    /// Loader taking the outer diameter from run parameters (0 when absent)
    pub fn from_parameters(source_dir: impl Into<PathBuf>, params: &ParameterSet) -> Self {
        let outer_diameter = params.get_f64(OUTER_DIAMETER_PARAM).unwrap_or_else(|| {
            tracing::warn!(
                param = OUTER_DIAMETER_PARAM,
                "outer diameter not available, ground clearance uses 0"
            );
            0.0
        });
        Self::new(source_dir).with_outer_diameter(outer_diameter)
    }

    pub fn with_outer_diameter(mut self, outer_diameter: f64) -> Self {
        self.outer_diameter = outer_diameter;
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Load one channel.
    ///
    /// A missing source file gives an empty series. Sequence channels are
    /// empty here; `load_all` numbers them once the row bound is known.
    pub fn load(&mut self, name: &str) -> ServiceResult<ChannelSeries> {
        let source = channel_source(name);
        let kind = source.kind();

        let values = match source {
            ChannelSource::File(file, column) => self
                .table(file)?
                .map(|t| t.column(column).to_vec())
                .unwrap_or_default(),
            ChannelSource::RunTime => match self.table("FX.csv")? {
                Some(table) => table.column(Column::Time).to_vec(),
                None => {
                    tracing::debug!("FX.csv missing, taking run time from U1.csv");
                    self.table("U1.csv")?
                        .map(|t| t.column(Column::Time).to_vec())
                        .unwrap_or_default()
                }
            },
            ChannelSource::GroundClearance => {
                let outer_radius = self.outer_diameter / 2.0;
                self.table("U3.csv")?
                    .map(|t| {
                        t.column(Column::Value)
                            .iter()
                            .map(|u3| outer_radius - u3)
                            .collect()
                    })
                    .unwrap_or_default()
            }
            ChannelSource::Sequence => Vec::new(),
            ChannelSource::Unknown => {
                tracing::debug!(channel = name, "no source for channel");
                Vec::new()
            }
        };

        Ok(ChannelSeries {
            name: name.to_string(),
            kind,
            values,
        })
    }

    /// Load every named channel and number the sequence channels
    pub fn load_all<'n>(
        &mut self,
        names: impl IntoIterator<Item = &'n str>,
    ) -> ServiceResult<ChannelData> {
        let mut series = Vec::new();
        for name in names {
            if series.iter().any(|s: &ChannelSeries| s.name == name) {
                continue;
            }
            series.push(self.load(name)?);
        }

        let data = ChannelData::from_series(series);
        tracing::debug!(channels = data.len(), max_rows = data.max_rows(), "channel data loaded");
        Ok(data)
    }

    fn table(&mut self, file: &'static str) -> ServiceResult<Option<&SourceTable>> {
        if !self.tables.contains_key(file) {
            let path = self.source_dir.join(file);
            let table = SourceTable::read(&path)?;
            if table.is_none() {
                tracing::warn!(path = %path.display(), "channel source missing, using empty series");
            }
            self.tables.insert(file, table);
        }
        Ok(self.tables.get(file).and_then(Option::as_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn write_csv(dir: &Path, file: &str, rows: &[(f64, f64)]) {
        let mut content = String::from("Time,Value\n");
        for (t, v) in rows {
            content.push_str(&format!("{},{}\n", t, v));
        }
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_alias_table() {
        assert_eq!(channel_source("FXW"), channel_source("FX"));
        assert_eq!(channel_source("FYH"), ChannelSource::File("FYW.csv", Column::Value));
        assert_eq!(channel_source("TYREDEFW"), ChannelSource::File("U3.csv", Column::Value));
        assert_eq!(channel_source("VX"), ChannelSource::Unknown);
        assert_eq!(channel_source("MEASNUMB").kind(), ChannelKind::Sequence);
        assert_eq!(channel_source("RUNTIME").kind(), ChannelKind::Time);
    }

    #[test]
    fn test_kind_format() {
        assert_eq!(ChannelKind::Sequence.format(12.0), "12");
        assert_eq!(ChannelKind::Time.format(0.125), "0.12500000");
        assert_eq!(ChannelKind::Value.format(-1523.45678), "-1523.4568");
        assert_eq!(ChannelKind::Value.format(-0.0), "0.0000");
    }

    #[test]
    fn test_kind_format_halfway_values() {
        assert_eq!(ChannelKind::Value.format(0.03125), "0.0313");
        assert_eq!(ChannelKind::Value.format(-0.03125), "-0.0313");
        assert_eq!(ChannelKind::Sequence.format(2.0), "2");
    }

    #[test]
    fn test_aliases_share_source() {
        let temp = tempfile::tempdir().unwrap();
        write_csv(temp.path(), "FZW.csv", &[(0.0, 4000.0), (0.1, 4100.5)]);

        let mut loader = ChannelDataLoader::new(temp.path());
        let fzw = loader.load("FZW").unwrap();
        let fzh = loader.load("FZH").unwrap();
        assert_eq!(fzw.values, vec![4000.0, 4100.5]);
        assert_eq!(fzh.values, fzw.values);
    }

    #[test]
    fn test_missing_source_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let mut loader = ChannelDataLoader::new(temp.path());
        let series = loader.load("MZW").unwrap();
        assert!(series.is_empty());
        assert_eq!(series.kind, ChannelKind::Value);
    }

    #[test]
    fn test_ground_clearance_uses_outer_radius() {
        let temp = tempfile::tempdir().unwrap();
        write_csv(temp.path(), "U3.csv", &[(0.0, 10.0), (0.1, 12.5)]);

        let mut params = ParameterSet::new();
        params.insert(OUTER_DIAMETER_PARAM, "652");
        let mut loader = ChannelDataLoader::from_parameters(temp.path(), &params);

        let series = loader.load("DSTGRWHC").unwrap();
        assert_eq!(series.values, vec![316.0, 313.5]);
    }

    #[test]
    fn test_run_time_prefers_fx_then_u1() {
        let temp = tempfile::tempdir().unwrap();
        write_csv(temp.path(), "U1.csv", &[(1.0, 0.0), (2.0, 0.0)]);

        let mut loader = ChannelDataLoader::new(temp.path());
        assert_eq!(loader.load("RUNTIME").unwrap().values, vec![1.0, 2.0]);

        write_csv(temp.path(), "FX.csv", &[(0.5, 9.0)]);
        let mut loader = ChannelDataLoader::new(temp.path());
        assert_eq!(loader.load("RUNTIME").unwrap().values, vec![0.5]);
    }

    #[test]
    fn test_load_all_max_rows_and_sequence() {
        let temp = tempfile::tempdir().unwrap();
        let long: Vec<(f64, f64)> = (0..120).map(|i| (i as f64 * 0.01, i as f64)).collect();
        let short: Vec<(f64, f64)> = (0..100).map(|i| (i as f64 * 0.01, -(i as f64))).collect();
        write_csv(temp.path(), "FX.csv", &long);
        write_csv(temp.path(), "FYW.csv", &short);

        let mut loader = ChannelDataLoader::new(temp.path());
        let data = loader
            .load_all(["MEASNUMB", "RUNTIME", "FX", "FYW", "MZW"])
            .unwrap();

        assert_eq!(data.max_rows(), 120);
        let seq = data.get("MEASNUMB").unwrap();
        assert_eq!(seq.len(), 120);
        assert_eq!(seq.formatted(0), Some("1".to_string()));
        assert_eq!(seq.formatted(119), Some("120".to_string()));
        assert_eq!(data.get("FYW").unwrap().len(), 100);
        assert!(data.get("FYW").unwrap().formatted(100).is_none());
        assert!(data.get("MZW").unwrap().is_empty());
    }

    #[test]
    fn test_load_all_without_sources() {
        let temp = tempfile::tempdir().unwrap();
        let mut loader = ChannelDataLoader::new(temp.path());
        let data = loader.load_all(["MEASNUMB", "FX"]).unwrap();
        assert_eq!(data.max_rows(), 0);
        assert!(data.get("MEASNUMB").unwrap().is_empty());
    }
}
