use crate::commands::RunSelection;
use crate::output;

use clap::Args;
use color_eyre::Result;

use tyre_service::{ServiceConfig, ServiceError, TydexError, TydexGenerator};

/// Generate the TYDEX document of a completed run
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: RunSelection,
}

pub async fn execute(args: GenerateArgs, config: ServiceConfig) -> Result<()> {
    let selection = &args.selection;
    let table = selection.table()?;
    let record = selection.record(&table).await?;
    let generator = TydexGenerator::new(selection.layout(&config), config.document.clone());

    output::status(
        "Generating",
        &format!("run {} ({} in {})", selection.run, record.job, record.folder()),
    );

    tracing::debug!(run = selection.run, job = %record.job, "generating document");
    match generator.generate(&record) {
        Ok(document) => {
            tracing::info!(
                run = selection.run,
                path = %document.path.display(),
                "document generated"
            );
            output::check(&format!("Template {}", document.template));
            output::check(&format!("Measurement {}", document.measurement_id));
            output::success(&format!(
                "Wrote {} ({} rows)",
                document.path.display(),
                document.rows
            ));
            Ok(())
        }
        Err(ServiceError::Tydex(TydexError::TemplateMissing { name, available })) => {
            tracing::error!(run = selection.run, template = %name, "template missing");
            output::failure(&format!("Template {} not found", name));
            if available.is_empty() {
                output::info("No templates available for this protocol");
            } else {
                output::info(&format!("Available templates: {}", available.join(", ")));
            }
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(run = selection.run, error = %e, "generation failed");
            output::failure(&e.to_string());
            std::process::exit(1);
        }
    }
}
