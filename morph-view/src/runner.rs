//! Batch execution of morph jobs on a pool of worker threads.
//!
//! Jobs are queued on a `crossbeam-channel`; each worker builds the target
//! shape and engine for the jobs it takes and reports progress on a second
//! channel. The calling thread aggregates progress into log lines and
//! collects one [`JobOutcome`] per job.

use crate::persist::{OutputPaths, ensure_dir, remove_files, write_points};
use crate::render::{FrameRenderer, PlotStyle};
use crate::settings::Settings;
use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::DVec2;
use morph_core::{
    AVAILABLE_SHAPES, Dataset, Frame, MorphEngine, MorphObserver, MorphReport, Result,
    ShapeFactory,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Progress messages sent per job before it finishes.
const PROGRESS_UPDATES: usize = 100;

/// One dataset morphed into one named shape.
#[derive(Clone, Debug)]
pub struct Job {
    pub dataset: Arc<Dataset>,
    pub shape: String,
}

impl Job {
    pub fn name(&self) -> String {
        format!("{}-to-{}", self.dataset.name(), self.shape)
    }
}

/// Target names with `all` expanded to the whole catalogue. Duplicates are
/// dropped, keeping the first occurrence.
pub fn expand_targets(targets: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for target in targets {
        let names: Vec<String> = if target == "all" {
            AVAILABLE_SHAPES.iter().map(|s| s.to_string()).collect()
        } else {
            vec![target.clone()]
        };
        for name in names {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

/// Every dataset paired with every target.
pub fn plan_jobs(datasets: &[Arc<Dataset>], targets: &[String]) -> Vec<Job> {
    let targets = expand_targets(targets);
    datasets
        .iter()
        .flat_map(|ds| {
            targets.iter().map(move |shape| Job {
                dataset: Arc::clone(ds),
                shape: shape.clone(),
            })
        })
        .collect()
}

/// What happened to one job.
#[derive(Debug)]
pub struct JobOutcome {
    pub name: String,
    pub result: Result<MorphReport>,
}

#[derive(Clone, Copy, Debug)]
struct Progress {
    job: usize,
    completed: usize,
    total: usize,
}

/// Writes frames of a running morph to disk and forwards its progress.
struct FrameWriter<'a> {
    job: usize,
    caption: String,
    paths: OutputPaths,
    settings: &'a Settings,
    renderer: FrameRenderer,
    progress: &'a Sender<Progress>,
    progress_every: usize,
    images: Vec<PathBuf>,
    frames: Vec<Vec<DVec2>>,
}

impl MorphObserver for FrameWriter<'_> {
    fn on_progress(&mut self, completed: usize, total: usize) {
        if completed % self.progress_every == 0 || completed == total {
            // The receiver only goes away once every worker is done.
            let _ = self.progress.send(Progress {
                job: self.job,
                completed,
                total,
            });
        }
    }

    fn on_frame(&mut self, frame: &Frame<'_>) -> Result<()> {
        let output = &self.settings.output;
        if output.write_images {
            let path = self.paths.image(frame.number);
            self.renderer
                .render_png(&path, &self.caption, frame.points, frame.plot_bounds)?;
            self.images.push(path);
            self.frames.push(frame.points.to_vec());
        }
        if output.write_data && frame.iteration > 0 {
            write_points(&self.paths.data(frame.number), frame.points)?;
        }
        Ok(())
    }
}

impl FrameWriter<'_> {
    /// Saves the final points after the last scheduled frame, assembles
    /// the animation and cleans up the frame images.
    fn finish(self, engine: &MorphEngine, report: &MorphReport) -> Result<()> {
        let output = &self.settings.output;
        if output.write_data {
            write_points(&self.paths.data(report.frames), engine.points())?;
        }
        if output.write_images && !self.frames.is_empty() {
            let path = self.paths.animation();
            self.renderer.render_gif(
                &path,
                &self.caption,
                &self.frames,
                engine.plot_bounds(),
                output.frame_delay_ms,
                output.forward_only,
            )?;
            info!(path = %path.display(), "wrote animation");
            if !output.keep_frames {
                remove_files(&self.images)?;
            }
        }
        Ok(())
    }
}

/// Builds and runs a single job.
fn run_job(
    index: usize,
    job: &Job,
    settings: &Settings,
    progress: &Sender<Progress>,
) -> Result<MorphReport> {
    let shape = ShapeFactory::new(&job.dataset).generate(&job.shape)?;
    let mut engine = MorphEngine::new(&job.dataset, &shape, settings.morph.clone())?;

    let dir = settings.output.dir.clone().unwrap_or_default();
    if settings.output.writes_anything() {
        ensure_dir(&dir)?;
    }

    let mut writer = FrameWriter {
        job: index,
        caption: engine.name().to_string(),
        paths: OutputPaths::new(dir, job.dataset.name(), &job.shape),
        settings,
        renderer: FrameRenderer::new(
            PlotStyle::square(settings.output.image_size),
            settings.morph.decimals,
            settings.morph.with_median,
        ),
        progress,
        progress_every: (settings.morph.iterations / PROGRESS_UPDATES).max(1),
        images: Vec::new(),
        frames: Vec::new(),
    };

    let report = engine.run(&mut writer)?;
    writer.finish(&engine, &report)?;
    Ok(report)
}

fn worker(
    jobs: &[Job],
    queue: Receiver<usize>,
    settings: &Settings,
    progress: Sender<Progress>,
    outcomes: Sender<(usize, JobOutcome)>,
) {
    while let Ok(index) = queue.recv() {
        let job = &jobs[index];
        debug!(job = %job.name(), "worker picked up job");
        let result = run_job(index, job, settings, &progress);
        let outcome = JobOutcome {
            name: job.name(),
            result,
        };
        if outcomes.send((index, outcome)).is_err() {
            break;
        }
    }
}

/// Runs every job on `settings.runner.workers` threads.
///
/// ### Returns
/// One outcome per job, in the order of `jobs`. A failing job does not
/// stop the others.
pub fn run_jobs(jobs: &[Job], settings: &Settings) -> Vec<JobOutcome> {
    let workers = settings.runner.workers.clamp(1, jobs.len().max(1));
    info!(jobs = jobs.len(), workers, "starting morph jobs");

    let (job_tx, job_rx) = unbounded::<usize>();
    for index in 0..jobs.len() {
        // The receiver is alive until the scope below ends.
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    let (progress_tx, progress_rx) = unbounded::<Progress>();
    let (outcome_tx, outcome_rx) = unbounded::<(usize, JobOutcome)>();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let queue = job_rx.clone();
            let progress = progress_tx.clone();
            let outcomes = outcome_tx.clone();
            scope.spawn(move || worker(jobs, queue, settings, progress, outcomes));
        }
        drop(progress_tx);
        drop(outcome_tx);

        let mut done = vec![0usize; jobs.len()];
        let mut totals = vec![settings.morph.iterations; jobs.len()];
        let mut last_logged = 0;
        for update in progress_rx.iter() {
            done[update.job] = update.completed;
            totals[update.job] = update.total;
            let percent = done.iter().sum::<usize>() * 100 / totals.iter().sum::<usize>().max(1);
            if percent >= last_logged + 10 {
                last_logged = percent - percent % 10;
                info!(progress = format!("{percent}%"), "morphing");
            }
        }
    });

    let mut outcomes: Vec<(usize, JobOutcome)> = outcome_rx.iter().collect();
    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<JobOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            warn!(job = %outcome.name, %err, "job failed");
        }
    }
    outcomes
}
