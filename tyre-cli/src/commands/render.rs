use crate::output;

use std::fs;
use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use tyre_service::{ParameterSet, ScalarContext, ServiceConfig, TydexTemplateEngine};

/// Render a template against a directory of channel files
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// TYDEX template file
    #[arg(long, value_name = "FILE")]
    pub template: PathBuf,

    /// Directory holding the channel CSV files
    #[arg(long, value_name = "DIR")]
    pub channels: PathBuf,

    /// Parameter file (name=value lines)
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Measurement id written to MEASID
    #[arg(long, value_name = "ID")]
    pub measurement_id: Option<String>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, config: ServiceConfig) -> Result<()> {
    if !args.template.is_file() {
        color_eyre::eyre::bail!("Template not found: {}", args.template.display());
    }
    if !args.channels.is_dir() {
        color_eyre::eyre::bail!("Channel directory not found: {}", args.channels.display());
    }

    let template = fs::read_to_string(&args.template)?;
    let parameters = match &args.params {
        Some(path) => ParameterSet::from_file(path)?,
        None => ParameterSet::new(),
    };

    let mut scalars = ScalarContext::local(parameters, config.document);
    if let Some(id) = args.measurement_id {
        scalars = scalars.with_measurement_id(id);
    }

    let rendered = TydexTemplateEngine::render_from_sources(&template, &args.channels, &scalars)?;

    match &args.out {
        Some(path) => {
            fs::write(path, &rendered.text)?;
            output::success(&format!("Wrote {} ({} rows)", path.display(), rendered.rows));
        }
        None => print!("{}", rendered.text),
    }

    Ok(())
}
