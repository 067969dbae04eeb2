// Channel Source Files
// Two-column (time, value) CSV files extracted from a simulation result

use std::fs;
use std::io;
use std::path::Path;

/// Parsed contents of one channel source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

/// Column of a source table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Time,
    Value,
}

impl SourceTable {
    /// Parse CSV text: the first non-blank line is a header, the rest are
    /// `time,value` rows. Cells that are missing or not numbers read as 0.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::default();
        for line in content.lines().filter(|l| !l.trim().is_empty()).skip(1) {
            let mut cells = line.split(',');
            table.time.push(parse_cell(cells.next()));
            table.value.push(parse_cell(cells.next()));
        }
        table
    }

    /// Read a source file; `Ok(None)` when it does not exist
    pub fn read(path: &Path) -> io::Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::parse(&content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn column(&self, column: Column) -> &[f64] {
        match column {
            Column::Time => &self.time,
            Column::Value => &self.value,
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

fn parse_cell(cell: Option<&str>) -> f64 {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
