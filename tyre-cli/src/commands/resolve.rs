use crate::commands::RunSelection;
use crate::output;

use std::sync::Arc;

use clap::Args;
use color_eyre::Result;

use tyre_service::{
    progress_channel, DependencyResolver, ResolutionEvent, ResolutionStatus, ResolveError,
    ServiceConfig, SolverRunner,
};

/// Run a job after resolving its predecessors
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub selection: RunSelection,
}

pub async fn execute(args: ResolveArgs, config: ServiceConfig) -> Result<()> {
    let selection = &args.selection;
    let layout = selection.layout(&config);
    let table = selection.table()?;

    output::status(
        "Resolving",
        &format!(
            "run {} of {} ({})",
            selection.run,
            layout.project_dir().display(),
            selection.protocol
        ),
    );

    let runner = SolverRunner::new(config.solver.clone(), &config.naming);
    let (tx, mut rx) = progress_channel();
    let resolver = DependencyResolver::new(Arc::new(table), Arc::new(runner), layout)
        .with_progress(tx);

    let run = selection.run;
    tracing::info!(
        run,
        project = %selection.project,
        protocol = %selection.protocol,
        "resolution started"
    );
    let handle = tokio::spawn(async move { resolver.resolve_run(run).await });

    while let Some(event) = rx.recv().await {
        match &event {
            ResolutionEvent::JobEntered { job, folder, depth } => {
                tracing::debug!(job = %job, folder = %folder, depth, "job entered");
                output::dim(&format!("{:indent$}{} in {}", "", job, folder, indent = 4 + depth * 2));
            }

            ResolutionEvent::PredecessorRequired {
                job, predecessor, ..
            } => {
                output::info(&format!("{} requires {}", job, predecessor));
            }

            ResolutionEvent::JobSkipped { job, reason, .. } => {
                output::warning(&format!("{} skipped: {}", job, reason));
            }

            ResolutionEvent::JobStarted {
                job,
                folder,
                predecessor,
            } => {
                let from = predecessor
                    .as_deref()
                    .map(|p| format!(" (from {})", p))
                    .unwrap_or_default();
                output::status("Running", &format!("{} in {}{}", job, folder, from));
            }

            ResolutionEvent::JobCompleted {
                job,
                success,
                exit_code,
                duration,
                ..
            } => {
                let line = format!("    {} finished ({:.2}s)", job, duration.as_secs_f64());
                if *success {
                    output::dim_success(&line);
                } else {
                    let code = exit_code.map(|c| format!(", exit code {}", c)).unwrap_or_default();
                    output::dim_failure(&format!("{}{}", line, code));
                }
            }
        }
    }

    match handle.await? {
        Ok(resolution) => {
            tracing::info!(
                run,
                job = %resolution.job,
                status = ?resolution.status,
                "resolution finished"
            );
            match resolution.status {
                ResolutionStatus::Executed => output::success(&resolution.message),
                ResolutionStatus::AlreadyComplete => output::check(&resolution.message),
                ResolutionStatus::CycleSkipped => output::warning(&resolution.message),
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(run, error = %e, "resolution failed");
            output::failure(&e.to_string());
            if let ResolveError::ExecutionFailed { output: captured, .. } = e.root_cause() {
                for line in captured.lines() {
                    output::solver_output(line);
                }
            }
            std::process::exit(1);
        }
    }
}
