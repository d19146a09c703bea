//! Application entry point for `data-morph`.
//!
//! Loads settings and datasets, then either runs every requested morph on
//! the worker pool, writing frames and animations, or opens the first
//! morph in the interactive [`viewer::Viewer`].

mod cli;
mod persist;
mod render;
mod runner;
mod settings;
mod viewer;

use anyhow::{Context, bail};
use clap::Parser;
use cli::Args;
use morph_core::Dataset;
use morph_core::loader::load_csv;
use settings::Settings;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(err) = run(Args::parse()) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = Settings::load_or_default(&args.config);
    settings.apply_args(&args);
    settings.validate().context("invalid settings")?;

    let datasets = args
        .start_shape
        .iter()
        .map(|path| {
            load_csv(path, settings.runner.scale)
                .map(Arc::new)
                .with_context(|| format!("failed to load dataset {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<Arc<Dataset>>>>()?;
    for ds in &datasets {
        info!(dataset = ds.name(), points = ds.len(), "loaded dataset");
    }

    let jobs = runner::plan_jobs(&datasets, &args.target_shape);
    if args.gui {
        let Some(job) = jobs.first() else {
            bail!("no morph to show");
        };
        let app = Viewer::new(Arc::clone(&job.dataset), &job.shape, settings.morph.clone())
            .with_context(|| format!("failed to prepare {}", job.name()))?;
        eframe::run_native(
            "Data Morph",
            eframe::NativeOptions::default(),
            Box::new(move |_cc| Ok(Box::new(app))),
        )
        .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))?;
        return Ok(());
    }

    let outcomes = runner::run_jobs(&jobs, &settings);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    for outcome in &outcomes {
        if let Ok(report) = &outcome.result {
            info!(
                job = %outcome.name,
                accepted = report.accepted,
                rejected = report.rejected,
                "done"
            );
        }
    }
    if failed > 0 {
        bail!("{failed} of {} morphs failed", outcomes.len());
    }
    Ok(())
}
