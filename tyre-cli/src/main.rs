mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use tyre_service::ServiceConfig;

/// Resolve simulation job chains and produce TYDEX documents
#[derive(Parser, Debug)]
#[command(name = "tyre", version, about)]
struct Cli {
    /// Configuration file (default: ~/.tyre/config.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory holding projects/ and templates/
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a job after resolving its predecessors
    Resolve(commands::resolve::ResolveArgs),

    /// Generate the TYDEX document of a completed run
    Generate(commands::generate::GenerateArgs),

    /// Show the solver state of a job
    Status(commands::status::StatusArgs),

    /// Render a template against a directory of channel files
    Render(commands::render::RenderArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ServiceConfig::load_or_default(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }

    match cli.command {
        Command::Resolve(args) => commands::resolve::execute(args, config).await,
        Command::Generate(args) => commands::generate::execute(args, config).await,
        Command::Status(args) => commands::status::execute(args, config).await,
        Command::Render(args) => commands::render::execute(args, config),
    }
}
