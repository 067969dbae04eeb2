// Run Record Models
// Protocols, folder coordinates and the per-run metadata read by the resolver

use crate::error::ServiceError;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tyre model test protocol; each protocol has its own run table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Protocol {
    Mf62,
    Mf52,
    FTire,
    CdTire,
    Custom,
}

impl Protocol {
    pub const ALL: [Protocol; 5] = [
        Protocol::Mf62,
        Protocol::Mf52,
        Protocol::FTire,
        Protocol::CdTire,
        Protocol::Custom,
    ];

    /// Short key used in requests (`mf62`)
    pub fn key(&self) -> &'static str {
        match self {
            Protocol::Mf62 => "mf62",
            Protocol::Mf52 => "mf52",
            Protocol::FTire => "ftire",
            Protocol::CdTire => "cdtire",
            Protocol::Custom => "custom",
        }
    }

    /// Run table holding this protocol's records
    pub fn table_name(&self) -> &'static str {
        match self {
            Protocol::Mf62 => "mf_data",
            Protocol::Mf52 => "mf52_data",
            Protocol::FTire => "ftire_data",
            Protocol::CdTire => "cdtire_data",
            Protocol::Custom => "custom_data",
        }
    }

    /// Abbreviation used in project folder names (`<project>_MF62`)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Protocol::Mf62 => "MF62",
            Protocol::Mf52 => "MF52",
            Protocol::FTire => "FTire",
            Protocol::CdTire => "CDTire",
            Protocol::Custom => "Custom",
        }
    }

    /// Directory under `templates/Tydex` holding this protocol's templates
    pub fn template_dir_name(&self) -> &'static str {
        match self {
            Protocol::Mf62 => "MF6pt2",
            Protocol::Mf52 => "MF5pt2",
            Protocol::FTire => "FTire",
            Protocol::CdTire => "CDTire",
            Protocol::Custom => "Custom",
        }
    }
}

impl FromStr for Protocol {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Protocol::ALL
            .into_iter()
            .find(|p| {
                p.key() == wanted
                    || p.abbreviation().to_ascii_lowercase() == wanted
                    || p.template_dir_name().to_ascii_lowercase() == wanted
            })
            .ok_or_else(|| ServiceError::UnknownProtocol(s.to_string()))
    }
}

impl TryFrom<String> for Protocol {
    type Error = ServiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.abbreviation().to_string()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// (pressure group, load group) pair naming one isolated working folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderCoordinate {
    pub pressure: String,
    pub load: String,
}

impl FolderCoordinate {
    pub fn new(pressure: impl Into<String>, load: impl Into<String>) -> Self {
        Self {
            pressure: pressure.into(),
            load: load.into(),
        }
    }

    /// Directory name of this coordinate (`<p>_<l>`)
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.pressure, self.load)
    }
}

impl FromStr for FolderCoordinate {
    type Err = ServiceError;

    /// Parse a `<p>_<l>` folder name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('_') {
            Some((p, l)) if !p.is_empty() && !l.is_empty() => Ok(Self::new(p, l)),
            _ => Err(ServiceError::InvalidInput(format!(
                "folder '{}' is not of the form <p>_<l>",
                s
            ))),
        }
    }
}

impl fmt::Display for FolderCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pressure, self.load)
    }
}

/// One row of a protocol run table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Row number within the protocol table
    #[serde(rename = "number_of_runs")]
    pub run_number: u32,
    /// Producer job name, usually carrying the input suffix
    pub job: String,
    /// Predecessor job name; the configured sentinel means none
    #[serde(default)]
    pub old_job: String,
    #[serde(default)]
    pub template_tydex: String,
    #[serde(default)]
    pub tydex_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub p: String,
    #[serde(deserialize_with = "string_or_number")]
    pub l: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub slip_angle: Option<f64>,
    /// Slip ratio in percent; FTire tables call it `longitudinal_slip`, CDTire `slip_range`
    #[serde(
        default,
        alias = "longitudinal_slip",
        alias = "slip_range",
        deserialize_with = "lenient_number"
    )]
    pub slip_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub inclination_angle: Option<f64>,
}

impl RunRecord {
    pub fn folder(&self) -> FolderCoordinate {
        FolderCoordinate::new(self.p.clone(), self.l.clone())
    }

    /// Predecessor job name, or `None` when empty or equal to the sentinel
    pub fn predecessor(&self, sentinel: &str) -> Option<&str> {
        let old_job = self.old_job.trim();
        if old_job.is_empty() || old_job == sentinel {
            None
        } else {
            Some(old_job)
        }
    }
}

/// Folder coordinates are written as numbers in most tables
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

/// Scalar run inputs arrive as numbers or text; blank or unparseable text is absent
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse_variants() {
        assert_eq!("mf62".parse::<Protocol>().unwrap(), Protocol::Mf62);
        assert_eq!("MF6pt2".parse::<Protocol>().unwrap(), Protocol::Mf62);
        assert_eq!("MF52".parse::<Protocol>().unwrap(), Protocol::Mf52);
        assert_eq!("FTire".parse::<Protocol>().unwrap(), Protocol::FTire);
        assert_eq!("cdtire".parse::<Protocol>().unwrap(), Protocol::CdTire);
        assert!("mf61".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_protocol_names() {
        assert_eq!(Protocol::Mf62.table_name(), "mf_data");
        assert_eq!(Protocol::CdTire.abbreviation(), "CDTire");
        assert_eq!(Protocol::Mf52.template_dir_name(), "MF5pt2");
    }

    #[test]
    fn test_folder_coordinate() {
        let folder: FolderCoordinate = "1_2".parse().unwrap();
        assert_eq!(folder, FolderCoordinate::new("1", "2"));
        assert_eq!(folder.folder_name(), "1_2");
        assert!("12".parse::<FolderCoordinate>().is_err());
        assert!("_2".parse::<FolderCoordinate>().is_err());
    }

    #[test]
    fn test_record_predecessor_sentinel() {
        let yaml = r#"
number_of_runs: 3
job: cornering_3.inp
old_job: "-"
p: 1
l: 2
"#;
        let record: RunRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.predecessor("-"), None);
        assert_eq!(record.folder(), FolderCoordinate::new("1", "2"));
    }

    #[test]
    fn test_record_protocol_column_aliases() {
        let yaml = r#"
number_of_runs: 4
job: braking_4.inp
old_job: rolling_2.inp
p: "1"
l: "3"
longitudinal_slip: 5
"#;
        let record: RunRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.slip_ratio, Some(5.0));
        assert_eq!(record.predecessor("-"), Some("rolling_2.inp"));
        assert!(record.inclination_angle.is_none());
    }

    #[test]
    fn test_record_scalars_given_as_text() {
        let json = r#"{
            "number_of_runs": 2,
            "job": "cornering_2.inp",
            "old_job": "-",
            "p": 1,
            "l": 1,
            "slip_angle": "5",
            "slip_range": " 2.5 ",
            "inclination_angle": ""
        }"#;
        let record: RunRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.slip_angle, Some(5.0));
        assert_eq!(record.slip_ratio, Some(2.5));
        assert_eq!(record.inclination_angle, None);
    }

    #[test]
    fn test_record_scalars_null_or_garbage() {
        let yaml = r#"
number_of_runs: 2
job: cornering_2.inp
old_job: "-"
p: 1
l: 1
slip_angle: ~
slip_ratio: "n/a"
inclination_angle: -3
"#;
        let record: RunRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.slip_angle, None);
        assert_eq!(record.slip_ratio, None);
        assert_eq!(record.inclination_angle, Some(-3.0));
    }
}
