// Service Configuration
// Solver invocation, file naming conventions and document text values

use crate::error::ServiceResult;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, normally read from `config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base directory holding `projects/` and `templates/`
    pub root: PathBuf,
    /// External solver invocation
    pub solver: SolverConfig,
    /// File naming conventions
    pub naming: NamingConfig,
    /// Fixed text values written into generated documents
    pub document: DocumentConfig,
}

/// How the external solver binary is launched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solver executable, looked up on PATH when not absolute
    pub program: String,
    /// Arguments placed before `job=...`
    pub leading_args: Vec<String>,
    /// Kill the solver after this many seconds (None = wait forever)
    pub timeout_secs: Option<u64>,
    /// Extra environment for the child process
    pub env: HashMap<String, String>,
}

/// File naming conventions shared by the resolver and the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix conventionally carried by job names (`.inp`)
    pub input_suffix: String,
    /// Extension of the simulation result file (`odb`)
    pub artifact_extension: String,
    /// Extension of TYDEX templates and outputs (`tdx`)
    pub template_extension: String,
    /// Predecessor value meaning "no predecessor"
    pub no_predecessor: String,
}

/// Text values substituted into HEADER and CONSTANTS
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub supplier: String,
    pub location: String,
    pub manufacturer: String,
    /// Label appended to the clock time
    pub time_zone_label: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            solver: SolverConfig::default(),
            naming: NamingConfig::default(),
            document: DocumentConfig::default(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: "abaqus".to_string(),
            leading_args: Vec::new(),
            timeout_secs: None,
            env: HashMap::new(),
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            input_suffix: ".inp".to_string(),
            artifact_extension: "odb".to_string(),
            template_extension: "tdx".to_string(),
            no_predecessor: "-".to_string(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            supplier: "Apollo/Vredestein".to_string(),
            location: "R&D Chennai".to_string(),
            manufacturer: "Apollo/Vredestein".to_string(),
            time_zone_label: "IST".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Default location of the user configuration file (`~/.tyre/config.yaml`)
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tyre")
            .join("config.yaml")
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from YAML text; missing fields take defaults
    pub fn parse(content: &str) -> ServiceResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load an explicit file, else the default file if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> ServiceResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}
