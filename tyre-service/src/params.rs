// Parameter Store
// Parses `name=value` run parameter files (parameters.inc)

use crate::error::ServiceResult;

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w+)\s*=\s*(.+)$").expect("valid assignment pattern"))
}

/// Run parameters keyed by name
///
/// Names are case-sensitive (`Outer_diameter` and `outer_diameter` differ).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse parameter text.
    ///
    /// Lines starting with `*` or `!` are comments. On an assignment line,
    /// anything after a `!` or `*` in the value is a trailing comment.
    /// Lines that are not assignments are ignored.
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('*') || line.starts_with('!') {
                continue;
            }

            let Some(caps) = assignment_pattern().captures(line) else {
                continue;
            };
            let name = caps[1].trim().to_string();
            let value = caps[2]
                .split('!')
                .next()
                .and_then(|v| v.split('*').next())
                .unwrap_or_default()
                .trim()
                .to_string();

            values.insert(name, value);
        }

        Self { values }
    }

    /// Read and parse a parameter file
    pub fn from_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Read a parameter file, returning an empty set if it does not exist
    pub fn from_file_or_empty(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "parameter file not found, using empty parameter set");
            return Ok(Self::new());
        }
        Self::from_file(path)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Numeric value of a parameter; `None` when absent or not a number
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.parse::<f64>().ok())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments() {
        let content = r#"
** tyre geometry
*PARAMETER
diameter = 431.8
width=215.9
Outer_diameter = 652 ! mm
speed_kmph = 90 * nominal
! pressure block
pressure1 = 30
"#;
        let params = ParameterSet::parse(content);

        assert_eq!(params.len(), 5);
        assert_eq!(params.get("diameter"), Some("431.8"));
        assert_eq!(params.get("width"), Some("215.9"));
        assert_eq!(params.get("Outer_diameter"), Some("652"));
        assert_eq!(params.get("speed_kmph"), Some("90"));
        assert_eq!(params.get_f64("pressure1"), Some(30.0));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let params = ParameterSet::parse("Outer_diameter=652\n");
        assert!(params.get("outer_diameter").is_none());
        assert_eq!(params.get_f64("Outer_diameter"), Some(652.0));
    }

    #[test]
    fn test_non_numeric_value() {
        let params = ParameterSet::parse("compound = soft\n");
        assert_eq!(params.get("compound"), Some("soft"));
        assert!(params.get_f64("compound").is_none());
    }

    #[test]
    fn test_ignores_non_assignment_lines() {
        let params = ParameterSet::parse("*NODE\n1, 0.0, 0.0\nload-case = 2\n");
        assert!(params.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let params = ParameterSet::from_file_or_empty(temp.path().join("parameters.inc")).unwrap();
        assert!(params.is_empty());
    }
}
