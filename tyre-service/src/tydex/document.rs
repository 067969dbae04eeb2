// TYDEX Document Model
// Splits a template into sentinel-delimited sections of physical lines

/// Prefix of a section sentinel line
pub const SENTINEL_PREFIX: &str = "**";

/// Section a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Lines before the first sentinel
    Preamble,
    Header,
    Constants,
    MeasurChannels,
    MeasurData,
    /// Any other sentinel; copied verbatim
    Other,
}

impl SectionKind {
    /// Classify a sentinel line such as `**MEASURDATA 120`
    pub fn from_sentinel(line: &str) -> Option<Self> {
        let name = line.strip_prefix(SENTINEL_PREFIX)?;
        let name = name.split_whitespace().next().unwrap_or_default();
        Some(match name.to_ascii_uppercase().as_str() {
            "HEADER" => SectionKind::Header,
            "CONSTANTS" => SectionKind::Constants,
            "MEASURCHANNELS" => SectionKind::MeasurChannels,
            "MEASURDATA" => SectionKind::MeasurData,
            _ => SectionKind::Other,
        })
    }
}

/// A sentinel line and the lines that follow it
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// `None` only for the preamble
    pub sentinel: Option<String>,
    pub lines: Vec<String>,
}

/// A channel declared in MEASURCHANNELS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDefinition {
    pub name: String,
    /// Position among the declared channels, counting from 0
    pub ordinal: usize,
}

/// Whether a line carries no content for any section pass
pub fn is_passive_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('!')
}

/// Parsed template, ordered as in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct TydexDocument {
    sections: Vec<Section>,
}

impl TydexDocument {
    /// Parse template text. Lines are split on `\n` only, so any `\r`
    /// stays part of its line and survives serialization.
    pub fn parse(text: &str) -> Self {
        let mut sections = vec![Section {
            kind: SectionKind::Preamble,
            sentinel: None,
            lines: Vec::new(),
        }];

        for line in text.split('\n') {
            match SectionKind::from_sentinel(line) {
                Some(kind) => sections.push(Section {
                    kind,
                    sentinel: Some(line.to_string()),
                    lines: Vec::new(),
                }),
                None => {
                    if let Some(section) = sections.last_mut() {
                        section.lines.push(line.to_string());
                    }
                }
            }
        }

        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    /// Channels declared in MEASURCHANNELS; the first token of each
    /// content line is the name and its position is the ordinal
    pub fn channels(&self) -> Vec<ChannelDefinition> {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::MeasurChannels)
            .flat_map(|s| s.lines.iter())
            .filter(|line| !is_passive_line(line))
            .filter_map(|line| line.split_whitespace().next())
            .enumerate()
            .map(|(ordinal, name)| ChannelDefinition {
                name: name.to_string(),
                ordinal,
            })
            .collect()
    }

    /// Write the document back out, joining lines with `\n`
    pub fn serialize(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for section in &self.sections {
            if let Some(sentinel) = &section.sentinel {
                lines.push(sentinel);
            }
            lines.extend(section.lines.iter().map(String::as_str));
        }
        lines.join("\n")
    }
}
