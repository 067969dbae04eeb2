// Header and Constant Substitution
// Label table mapping HEADER/CONSTANTS lines to converted scalar values

use crate::config::DocumentConfig;
use crate::params::ParameterSet;
use crate::records::RunRecord;
use crate::tydex::document::SectionKind;
use crate::utils::format_fixed;

use chrono::NaiveDateTime;

/// MEASID value when no artifact names the measurement
pub const UNKNOWN_MEASUREMENT: &str = "unknown_measurement";

/// Separator between description and a text value, as in `LOCATION  Location  - Site`
const TEXT_SEPARATOR: &str = " - ";

/// Unit conversion applied to a numeric source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// mm to m
    MillimetresToMetres { decimals: usize },
    /// km/h to m/s, 2 decimals
    KmhToMetresPerSecond,
    /// PSI to Pa, 0 decimals
    PsiToPascal,
    /// degrees to radians, 4 decimals
    DegreesToRadians,
    /// percent to fraction, 4 decimals
    PercentToFraction,
}

impl Conversion {
    pub fn apply(&self, value: f64) -> String {
        match self {
            Conversion::MillimetresToMetres { decimals } => format_fixed(value / 1000.0, *decimals),
            Conversion::KmhToMetresPerSecond => format_fixed(value * 1000.0 / 3600.0, 2),
            Conversion::PsiToPascal => format_fixed(value * 6894.76, 0),
            Conversion::DegreesToRadians => format_fixed(value.to_radians(), 4),
            Conversion::PercentToFraction => format_fixed(value / 100.0, 4),
        }
    }
}

/// Numeric inputs taken from the run record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScalar {
    SlipAngle,
    SlipRatio,
    InclinationAngle,
}

/// Text inputs taken from the document configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentText {
    Supplier,
    Location,
    Manufacturer,
}

/// Where a label's value comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueSource {
    Date,
    ClockTime,
    MeasurementId,
    Text(DocumentText),
    Parameter(&'static str, Conversion),
    Record(RecordScalar, Conversion),
}

/// One row of the label table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRule {
    pub label: &'static str,
    pub section: SectionKind,
    pub source: ValueSource,
}

const fn rule(label: &'static str, section: SectionKind, source: ValueSource) -> LabelRule {
    LabelRule {
        label,
        section,
        source,
    }
}

const MM_4: Conversion = Conversion::MillimetresToMetres { decimals: 4 };

/// Labels rewritten in HEADER and CONSTANTS
pub static LABEL_RULES: &[LabelRule] = &[
    rule("DATE", SectionKind::Header, ValueSource::Date),
    rule("CLCKTIME", SectionKind::Header, ValueSource::ClockTime),
    rule("SUPPLIER", SectionKind::Header, ValueSource::Text(DocumentText::Supplier)),
    rule("MEASID", SectionKind::Header, ValueSource::MeasurementId),
    rule("RIMDIAME", SectionKind::Constants, ValueSource::Parameter("diameter", MM_4)),
    rule("RIMWIDTH", SectionKind::Constants, ValueSource::Parameter("width", MM_4)),
    rule(
        "LONGVEL",
        SectionKind::Constants,
        ValueSource::Parameter("speed_kmph", Conversion::KmhToMetresPerSecond),
    ),
    rule(
        "TRAJVELH",
        SectionKind::Constants,
        ValueSource::Parameter("speed_kmph", Conversion::KmhToMetresPerSecond),
    ),
    rule(
        "INFLPRES",
        SectionKind::Constants,
        ValueSource::Parameter("pressure1", Conversion::PsiToPascal),
    ),
    rule(
        "INCLANGL",
        SectionKind::Constants,
        ValueSource::Record(RecordScalar::InclinationAngle, Conversion::DegreesToRadians),
    ),
    rule(
        "LONGSLIP",
        SectionKind::Constants,
        ValueSource::Record(RecordScalar::SlipRatio, Conversion::PercentToFraction),
    ),
    rule(
        "SLIPANGL",
        SectionKind::Constants,
        ValueSource::Record(RecordScalar::SlipAngle, Conversion::DegreesToRadians),
    ),
    rule("LOCATION", SectionKind::Constants, ValueSource::Text(DocumentText::Location)),
    rule("MANUFACT", SectionKind::Constants, ValueSource::Text(DocumentText::Manufacturer)),
    rule(
        "OVALLDIA",
        SectionKind::Constants,
        ValueSource::Parameter("Outer_diameter", Conversion::MillimetresToMetres { decimals: 3 }),
    ),
];

/// Scalar inputs for one rendered document
#[derive(Debug, Clone)]
pub struct ScalarContext {
    pub parameters: ParameterSet,
    pub slip_angle: Option<f64>,
    pub slip_ratio: Option<f64>,
    pub inclination_angle: Option<f64>,
    pub document: DocumentConfig,
    pub now: NaiveDateTime,
    pub measurement_id: String,
}

impl ScalarContext {
    pub fn new(parameters: ParameterSet, document: DocumentConfig, now: NaiveDateTime) -> Self {
        Self {
            parameters,
            slip_angle: None,
            slip_ratio: None,
            inclination_angle: None,
            document,
            now,
            measurement_id: UNKNOWN_MEASUREMENT.to_string(),
        }
    }

    /// Context stamped with the local clock
    pub fn local(parameters: ParameterSet, document: DocumentConfig) -> Self {
        Self::new(parameters, document, chrono::Local::now().naive_local())
    }

    /// Take slip and inclination values from a run record
    pub fn with_record(mut self, record: &RunRecord) -> Self {
        self.slip_angle = record.slip_angle;
        self.slip_ratio = record.slip_ratio;
        self.inclination_angle = record.inclination_angle;
        self
    }

    pub fn with_measurement_id(mut self, measurement_id: impl Into<String>) -> Self {
        self.measurement_id = measurement_id.into();
        self
    }

    fn record_scalar(&self, scalar: RecordScalar) -> Option<f64> {
        match scalar {
            RecordScalar::SlipAngle => self.slip_angle,
            RecordScalar::SlipRatio => self.slip_ratio,
            RecordScalar::InclinationAngle => self.inclination_angle,
        }
    }

    fn text(&self, text: DocumentText) -> &str {
        match text {
            DocumentText::Supplier => &self.document.supplier,
            DocumentText::Location => &self.document.location,
            DocumentText::Manufacturer => &self.document.manufacturer,
        }
    }

    /// Value for a source, or `None` when the input is missing or not numeric
    pub fn value(&self, source: ValueSource) -> Option<String> {
        match source {
            ValueSource::Date => Some(self.now.format("%d-%b-%Y").to_string()),
            ValueSource::ClockTime => Some(format!(
                "{} {}",
                self.now.format("%I:%M %P"),
                self.document.time_zone_label
            )),
            ValueSource::MeasurementId => Some(self.measurement_id.clone()),
            ValueSource::Text(text) => Some(self.text(text).to_string()),
            ValueSource::Parameter(name, conversion) => {
                self.parameters.get_f64(name).map(|v| conversion.apply(v))
            }
            ValueSource::Record(scalar, conversion) => {
                self.record_scalar(scalar).map(|v| conversion.apply(v))
            }
        }
    }
}

/// Find the rule for a line's leading label within a section
pub fn find_rule(section: SectionKind, line: &str) -> Option<&'static LabelRule> {
    let label = line.split_whitespace().next()?;
    LABEL_RULES
        .iter()
        .find(|rule| rule.section == section && rule.label == label)
}

/// Replace the last whitespace-delimited token, keeping everything else.
///
/// Returns `None` when the line has no value token after its label.
pub fn replace_trailing_token(line: &str, value: &str) -> Option<String> {
    let content = line.trim_end();
    if content.split_whitespace().count() < 2 {
        return None;
    }
    let start = content
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())?;
    Some(format!("{}{}{}", &line[..start], value, &line[content.len()..]))
}

/// Replace the text after the ` - ` separator, falling back to the
/// trailing token when the line has no separator
pub fn replace_text_value(line: &str, value: &str) -> Option<String> {
    let content = line.trim_end();
    match content.find(TEXT_SEPARATOR) {
        Some(pos) => {
            let start = pos + TEXT_SEPARATOR.len();
            let spacing = content[start..].len() - content[start..].trim_start().len();
            let start = start + spacing;
            Some(format!("{}{}{}", &line[..start], value, &line[content.len()..]))
        }
        None => replace_trailing_token(line, value),
    }
}

/// Apply the label table to one HEADER or CONSTANTS line.
///
/// Lines without a matching rule, or whose source has no value, are
/// returned unchanged.
pub fn substitute_line(section: SectionKind, line: &str, scalars: &ScalarContext) -> String {
    let Some(rule) = find_rule(section, line) else {
        return line.to_string();
    };
    let Some(value) = scalars.value(rule.source) else {
        tracing::debug!(label = rule.label, "no value for label, line kept");
        return line.to_string();
    };

    let replaced = match rule.source {
        ValueSource::Text(_) => replace_text_value(line, &value),
        _ => replace_trailing_token(line, &value),
    };
    replaced.unwrap_or_else(|| line.to_string())
}
