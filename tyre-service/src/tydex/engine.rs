// TYDEX Template Engine
// Renders a template against channel data and scalar inputs

use crate::channels::{ChannelData, ChannelDataLoader};
use crate::error::ServiceResult;
use crate::tydex::constants::{substitute_line, ScalarContext};
use crate::tydex::data::{generate_data_line, rewrite_row_count};
use crate::tydex::document::{is_passive_line, ChannelDefinition, SectionKind, TydexDocument};

use std::path::Path;

/// A rendered document and the number of data rows written
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub text: String,
    pub rows: usize,
}

/// Stateless renderer over the TYDEX section model
pub struct TydexTemplateEngine;

impl TydexTemplateEngine {
    /// Render a template, loading the channels it declares from `source_dir`
    pub fn render_from_sources(
        template: &str,
        source_dir: &Path,
        scalars: &ScalarContext,
    ) -> ServiceResult<RenderedDocument> {
        let mut document = TydexDocument::parse(template);
        let names: Vec<String> = document.channels().into_iter().map(|c| c.name).collect();

        let mut loader = ChannelDataLoader::from_parameters(source_dir, &scalars.parameters);
        let channels = loader.load_all(names.iter().map(String::as_str))?;

        Self::render_document(&mut document, &channels, scalars);
        Ok(RenderedDocument {
            text: document.serialize(),
            rows: channels.max_rows(),
        })
    }

    /// Render template text into a finished document
    pub fn render(template: &str, channels: &ChannelData, scalars: &ScalarContext) -> String {
        let mut document = TydexDocument::parse(template);
        Self::render_document(&mut document, channels, scalars);
        document.serialize()
    }

    /// Apply every substitution pass to a parsed document.
    ///
    /// HEADER and CONSTANTS lines go through the label table. The
    /// MEASURDATA count becomes `maxRows`, the first `maxRows` data lines
    /// are regenerated and the rest are dropped. Everything else,
    /// including blank and `!` comment lines, is left as it is.
    pub fn render_document(
        document: &mut TydexDocument,
        channels: &ChannelData,
        scalars: &ScalarContext,
    ) {
        let definitions: Vec<ChannelDefinition> = document.channels();
        let max_rows = channels.max_rows();
        let mut row = 0;
        let mut dropped = 0;

        for section in document.sections_mut() {
            match section.kind {
                SectionKind::Header | SectionKind::Constants => {
                    for line in section.lines.iter_mut() {
                        *line = substitute_line(section.kind, line, scalars);
                    }
                }
                SectionKind::MeasurData => {
                    if let Some(sentinel) = section.sentinel.as_mut() {
                        *sentinel = rewrite_row_count(sentinel, max_rows);
                    }

                    let lines = std::mem::take(&mut section.lines);
                    for line in lines {
                        if is_passive_line(&line) {
                            section.lines.push(line);
                        } else if row < max_rows {
                            section
                                .lines
                                .push(generate_data_line(&line, &definitions, channels, row));
                            row += 1;
                        } else {
                            dropped += 1;
                        }
                    }
                }
                SectionKind::Preamble | SectionKind::MeasurChannels | SectionKind::Other => {}
            }
        }

        tracing::debug!(
            channels = definitions.len(),
            rows = row,
            dropped,
            "template rendered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::channels::{ChannelKind, ChannelSeries};
    use crate::config::DocumentConfig;
    use crate::params::ParameterSet;

    use chrono::NaiveDate;

    fn scalars() -> ScalarContext {
        let now = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut params = ParameterSet::new();
        params.insert("pressure1", "30");
        params.insert("speed_kmph", "90");
        let mut ctx = ScalarContext::new(params, DocumentConfig::default(), now);
        ctx.slip_angle = Some(5.0);
        ctx
    }

    fn value_series(name: &str, len: usize) -> ChannelSeries {
        ChannelSeries {
            name: name.to_string(),
            kind: ChannelKind::Value,
            values: (0..len).map(|i| i as f64).collect(),
        }
    }

    fn template_with_rows(rows: usize) -> String {
        let mut text = String::from(
            "**HEADER\n\
             RELEASE   Release of TYDEX-Format                      1.3\n\
             DATE      Date of measurement                          01-Jan-2000\n\
             **CONSTANTS\n\
             FNOMIN    Nominal force                     N          4000\n\
             INFLPRES  Inflation pressure                Pa         0\n\
             LONGVEL   Longitudinal velocity             m/s        0.00\n\
             SLIPANGL  Slip angle                        rad        0.0000\n\
             **MEASURCHANNELS\n\
             MEASNUMB  -     Measurement number     1 0 0\n\
             FX        N     Longitudinal force     1 0 0\n\
             FYW       N     Lateral force          1 0 0\n",
        );
        text.push_str(&format!("**MEASURDATA {}\n", rows));
        for _ in 0..rows {
            text.push_str("   0   -1.0000   0.0000\n");
        }
        text.push_str("**END\n");
        text
    }

    fn measurdata_lines(output: &str) -> Vec<&str> {
        output
            .lines()
            .skip_while(|l| !l.starts_with("**MEASURDATA"))
            .skip(1)
            .take_while(|l| !l.starts_with("**"))
            .collect()
    }

    #[test]
    fn test_rows_truncated_to_longest_series() {
        let data = ChannelData::from_series(vec![
            ChannelSeries::empty("MEASNUMB", ChannelKind::Sequence),
            value_series("FX", 120),
            value_series("FYW", 100),
        ]);
        assert_eq!(data.max_rows(), 120);

        let output = TydexTemplateEngine::render(&template_with_rows(150), &data, &scalars());
        let rows = measurdata_lines(&output);

        assert!(output.contains("**MEASURDATA 120\n"));
        assert_eq!(rows.len(), 120);
        assert_eq!(rows[0], "   1    0.0000   0.0000");
        assert_eq!(rows[99], "   100    99.0000   99.0000");
        // FYW ran out; its template field is kept
        assert_eq!(rows[119], "   120    119.0000   0.0000");
        assert!(output.ends_with("**END\n"));
    }

    #[test]
    fn test_unmatched_lines_round_trip() {
        let data = ChannelData::from_series(vec![value_series("FX", 1)]);
        let template = template_with_rows(1);
        let output = TydexTemplateEngine::render(&template, &data, &scalars());

        for line in [
            "RELEASE   Release of TYDEX-Format                      1.3",
            "FNOMIN    Nominal force                     N          4000",
            "FYW       N     Lateral force          1 0 0",
        ] {
            assert!(output.lines().any(|l| l == line), "missing {line:?}");
        }
        assert!(output.contains("INFLPRES  Inflation pressure                Pa         206843\n"));
        assert!(output.contains("LONGVEL   Longitudinal velocity             m/s        25.00\n"));
        assert!(output.contains("SLIPANGL  Slip angle                        rad        0.0873\n"));
        assert!(output.contains("DATE      Date of measurement                          02-Mar-2024\n"));
    }

    #[test]
    fn test_comments_in_data_pass_through() {
        let data = ChannelData::from_series(vec![value_series("A", 1)]);
        let template = "**MEASURCHANNELS\nA x y 1 0 0\n**MEASURDATA 3\n! rows\n5.0000\n\n6.0000\n7.0000";
        let output = TydexTemplateEngine::render(template, &data, &scalars());
        assert_eq!(
            output,
            "**MEASURCHANNELS\nA x y 1 0 0\n**MEASURDATA 1\n! rows\n0.0000\n"
        );
    }

    #[test]
    fn test_render_from_sources() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("FX.csv"), "Time,FX\n0.0,-3.14\n0.25,2\n").unwrap();

        let template = "**MEASURCHANNELS\n\
                        RUNTIME s t 1 0 0\n\
                        FXW N f 1 0 0\n\
                        **MEASURDATA 1\n\
                        0.00000000 -5.0000";
        let rendered =
            TydexTemplateEngine::render_from_sources(template, temp.path(), &scalars()).unwrap();

        assert_eq!(rendered.rows, 2);
        // only one template row to fill
        assert!(rendered.text.ends_with("**MEASURDATA 2\n0.00000000  -3.1400"));
    }

    #[test]
    fn test_no_channel_data_empties_measurdata() {
        let output = TydexTemplateEngine::render(
            &template_with_rows(3),
            &ChannelData::default(),
            &scalars(),
        );
        assert!(output.contains("**MEASURDATA 0\n**END"));
    }
}
