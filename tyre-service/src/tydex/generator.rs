// TYDEX Generator
// Produces the exchange document for a completed run inside a project

use crate::config::DocumentConfig;
use crate::error::ServiceResult;
use crate::layout::ProjectLayout;
use crate::params::ParameterSet;
use crate::records::RunRecord;
use crate::tydex::constants::{ScalarContext, UNKNOWN_MEASUREMENT};
use crate::tydex::engine::TydexTemplateEngine;
use crate::tydex::TydexError;
use crate::utils::{ensure_extension, first_stem_with_extension, list_with_extension};

use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

/// Result of a successful generation
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub template: String,
    pub measurement_id: String,
    pub rows: usize,
}

/// Renders documents for run records of one project
pub struct TydexGenerator {
    layout: ProjectLayout,
    document: DocumentConfig,
}

impl TydexGenerator {
    pub fn new(layout: ProjectLayout, document: DocumentConfig) -> Self {
        Self { layout, document }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Template and output file names; the output defaults to the template name
    pub fn document_names(&self, record: &RunRecord) -> (String, String) {
        let extension = &self.layout.naming().template_extension;
        let template = ensure_extension(&record.template_tydex, extension);
        let output = if record.tydex_name.trim().is_empty() {
            template.clone()
        } else {
            ensure_extension(&record.tydex_name, extension)
        };
        (template, output)
    }

    /// Whether the output document of `record` has been written
    pub fn document_exists(&self, record: &RunRecord) -> bool {
        let (_, output) = self.document_names(record);
        self.layout.document_path(&record.folder(), &output).exists()
    }

    /// Template files available for this protocol
    pub fn available_templates(&self) -> Vec<String> {
        list_with_extension(
            self.layout.template_dir(),
            &self.layout.naming().template_extension,
        )
    }

    /// Generate the document for `record` using the local clock
    pub fn generate(&self, record: &RunRecord) -> ServiceResult<GeneratedDocument> {
        self.generate_at(record, chrono::Local::now().naive_local())
    }

    /// Generate the document for `record` with an explicit time stamp
    pub fn generate_at(
        &self,
        record: &RunRecord,
        now: NaiveDateTime,
    ) -> ServiceResult<GeneratedDocument> {
        let folder = record.folder();
        let (template_name, output_name) = self.document_names(record);

        let artifact = self.layout.artifact_path(&folder, &record.job);
        if !artifact.exists() {
            return Err(TydexError::ArtifactMissing(artifact).into());
        }

        let channel_dir = self.layout.channel_dir(&folder);
        if !channel_dir.is_dir() {
            return Err(TydexError::ChannelDirMissing(channel_dir).into());
        }

        let template_path = self.layout.template_path(&template_name);
        if !template_path.is_file() {
            return Err(TydexError::TemplateMissing {
                name: template_name,
                available: self.available_templates(),
            }
            .into());
        }
        let template = fs::read_to_string(&template_path).map_err(TydexError::Io)?;

        let parameters = ParameterSet::from_file_or_empty(self.layout.parameter_path(&folder))?;
        let folder_dir = self.layout.folder_dir(&folder);
        let measurement_id =
            first_stem_with_extension(&folder_dir, &self.layout.naming().artifact_extension)
                .unwrap_or_else(|| UNKNOWN_MEASUREMENT.to_string());

        let scalars = ScalarContext::new(parameters, self.document.clone(), now)
            .with_record(record)
            .with_measurement_id(measurement_id.clone());
        let rendered = TydexTemplateEngine::render_from_sources(&template, &channel_dir, &scalars)?;

        fs::create_dir_all(&folder_dir).map_err(TydexError::Io)?;
        let path = self.layout.document_path(&folder, &output_name);
        fs::write(&path, rendered.text).map_err(TydexError::Io)?;

        tracing::info!(
            job = %record.job,
            folder = %folder,
            template = %template_name,
            rows = rendered.rows,
            path = %path.display(),
            "TYDEX document written"
        );

        Ok(GeneratedDocument {
            path,
            template: template_name,
            measurement_id,
            rows: rendered.rows,
        })
    }
}
