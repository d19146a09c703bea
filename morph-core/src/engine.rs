//! The simulated-annealing morph loop.
//!
//! Each iteration picks one point, proposes Gaussian moves until one is
//! acceptable for the target shape and stays inside the morph bounds, and
//! commits it only if the summary statistics still floor to the original
//! values. Temperature and shake ease down over the run (see
//! [`crate::schedule::annealing_value`]).

use crate::bounds::BoundingBox;
use crate::config::MorphConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::schedule::{FrameSchedule, annealing_value};
use crate::shapes::Shape;
use crate::stats::SummaryStatistics;
use crate::tracker::StatisticsTracker;
use crate::types::PointId;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::{debug, info, warn};

/// Proposals drawn per iteration before the iteration is given up.
pub const MAX_CANDIDATES: usize = 10_000;

/// Why an iteration did not move its point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The move would change a statistic at the configured precision.
    StatisticsChanged,
    /// No proposal passed the acceptance rule within [`MAX_CANDIDATES`]
    /// draws.
    NoCandidate,
}

/// Result of a single [`MorphEngine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted { index: PointId },
    Rejected { index: PointId, reason: Rejection },
    /// All iterations have run; the engine no longer changes.
    Finished,
}

/// A snapshot handed to observers at a scheduled iteration.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Position of the frame in the schedule.
    pub number: usize,
    /// Iterations completed when the frame was taken.
    pub iteration: usize,
    pub points: &'a [DVec2],
    pub plot_bounds: &'a BoundingBox,
}

/// Receives progress and frames from [`MorphEngine::run`].
pub trait MorphObserver {
    /// Called after every iteration with `(completed, total)`.
    fn on_progress(&mut self, _completed: usize, _total: usize) {}

    /// Called for every scheduled frame, in schedule order.
    ///
    /// ### Errors
    /// Any error aborts the run and is returned from
    /// [`MorphEngine::run`].
    fn on_frame(&mut self, _frame: &Frame<'_>) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores everything.
impl MorphObserver for () {}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphReport {
    pub iterations: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub frames: usize,
    /// Statistics of the input data.
    pub initial: SummaryStatistics,
    /// Statistics of the output data, recomputed in full.
    pub final_stats: SummaryStatistics,
}

impl MorphReport {
    pub fn acceptance_rate(&self) -> f64 {
        self.accepted as f64 / self.iterations.max(1) as f64
    }
}

/// The acceptance rule for a proposed move, before the statistics check.
///
/// A candidate is taken if it gets closer to the shape, is already within
/// `allowed_dist` of it, or the iteration drew `accept_anyway`.
#[inline]
pub fn accepts(old_dist: f64, new_dist: f64, allowed_dist: f64, accept_anyway: bool) -> bool {
    new_dist < old_dist || new_dist < allowed_dist || accept_anyway
}

/// Morphs one dataset towards one shape.
///
/// The engine owns the working point set, the statistics tracker and its
/// random generator; points change only through an accepted
/// [`MorphEngine::step`].
pub struct MorphEngine {
    name: String,
    shape: Shape,
    config: MorphConfig,
    schedule: FrameSchedule,
    morph_bounds: BoundingBox,
    plot_bounds: BoundingBox,
    points: Vec<DVec2>,
    tracker: StatisticsTracker,
    target: SummaryStatistics,
    rng: StdRng,
    iteration: usize,
    accepted: usize,
    rejected: usize,
}

impl MorphEngine {
    /// Prepares a run.
    ///
    /// ### Parameters
    /// - `dataset` - Starting points and the bounds moves must respect.
    /// - `shape` - Target shape; cloned into the engine.
    /// - `config` - Run parameters; `config.seed` makes the run
    ///   reproducible.
    ///
    /// ### Errors
    /// [`crate::MorphError::InvalidConfig`] if `config` fails
    /// [`MorphConfig::validate`].
    pub fn new(dataset: &Dataset, shape: &Shape, config: MorphConfig) -> Result<Self> {
        config.validate()?;
        let schedule = config.frame_schedule()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let points = dataset.points().to_vec();
        let tracker = StatisticsTracker::new(&points, config.with_median);
        let target = SummaryStatistics::of(&points, config.with_median);

        Ok(Self {
            name: format!("{}-to-{}", dataset.name(), shape.name()),
            shape: shape.clone(),
            schedule,
            morph_bounds: *dataset.morph_bounds(),
            plot_bounds: *dataset.plot_bounds(),
            points,
            tracker,
            target,
            rng,
            iteration: 0,
            accepted: 0,
            rejected: 0,
            config,
        })
    }

    /// `<dataset>-to-<shape>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    pub fn schedule(&self) -> &FrameSchedule {
        &self.schedule
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DVec2> {
        self.points
    }

    pub fn morph_bounds(&self) -> &BoundingBox {
        &self.morph_bounds
    }

    pub fn plot_bounds(&self) -> &BoundingBox {
        &self.plot_bounds
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_finished(&self) -> bool {
        self.iteration >= self.config.iterations
    }

    /// Statistics every accepted move must preserve.
    pub fn target_statistics(&self) -> &SummaryStatistics {
        &self.target
    }

    /// Statistics of the current points, as tracked incrementally.
    pub fn current_statistics(&self) -> SummaryStatistics {
        self.tracker.current()
    }

    /// Temperature used at iteration `iteration`.
    pub fn temperature_at(&self, iteration: usize) -> f64 {
        let c = &self.config;
        annealing_value(iteration, c.iterations, c.min_temp, c.max_temp)
    }

    /// Shake used at iteration `iteration`.
    pub fn shake_at(&self, iteration: usize) -> f64 {
        let c = &self.config;
        annealing_value(iteration, c.iterations, c.min_shake, c.max_shake)
    }

    /// Runs one outer iteration.
    pub fn step(&mut self) -> StepOutcome {
        if self.is_finished() {
            return StepOutcome::Finished;
        }
        let i = self.iteration;
        self.iteration += 1;

        let temperature = self.temperature_at(i);
        let shake = self.shake_at(i);

        let index = self.rng.random_range(0..self.points.len());
        let accept_anyway = self.rng.random::<f64>() < temperature;

        let Some(delta) = self.propose(index, shake, accept_anyway) else {
            self.rejected += 1;
            return StepOutcome::Rejected {
                index,
                reason: Rejection::NoCandidate,
            };
        };

        let candidate = self.tracker.query(index, delta.x, delta.y);
        if !candidate.matches(&self.target, self.config.decimals) {
            self.rejected += 1;
            return StepOutcome::Rejected {
                index,
                reason: Rejection::StatisticsChanged,
            };
        }

        self.tracker.commit(index, delta.x, delta.y);
        self.points[index] += delta;
        self.accepted += 1;
        StepOutcome::Accepted { index }
    }

    /// Draws moves for point `index` until one passes [`accepts`] and stays
    /// inside the morph bounds. Any in-bounds move passes for the null
    /// shape.
    fn propose(&mut self, index: PointId, shake: f64, accept_anyway: bool) -> Option<DVec2> {
        let accept_anyway = accept_anyway || self.shape.is_null();
        let old = self.points[index];
        let old_dist = self.shape.distance(old);

        for _ in 0..MAX_CANDIDATES {
            let delta = DVec2::new(
                self.rng.sample::<f64, _>(StandardNormal),
                self.rng.sample::<f64, _>(StandardNormal),
            ) * shake;
            let new = old + delta;
            let new_dist = self.shape.distance(new);

            if accepts(old_dist, new_dist, self.config.allowed_dist, accept_anyway)
                && self.morph_bounds.contains(new)
            {
                return Some(delta);
            }
        }
        None
    }

    /// Runs every remaining iteration, reporting to `observer`.
    ///
    /// Frames scheduled at iteration `0` are emitted before the first
    /// step; a frame scheduled at `k` is emitted once `k` iterations have
    /// completed.
    ///
    /// ### Errors
    /// The first error returned by [`MorphObserver::on_frame`].
    pub fn run(&mut self, observer: &mut impl MorphObserver) -> Result<MorphReport> {
        let total = self.config.iterations;
        info!(
            run = %self.name,
            points = self.points.len(),
            iterations = total,
            decimals = self.config.decimals,
            frames = self.schedule.len(),
            "starting morph"
        );

        let mut next_frame = self.emit_frames(0, observer)?;
        while self.step() != StepOutcome::Finished {
            observer.on_progress(self.iteration, total);
            next_frame = self.emit_frames(next_frame, observer)?;
        }

        let final_stats = SummaryStatistics::of(&self.points, self.config.with_median);
        if !final_stats.matches(&self.target, self.config.decimals) {
            warn!(run = %self.name, "final statistics drifted from the target");
        }
        let report = MorphReport {
            iterations: self.iteration,
            accepted: self.accepted,
            rejected: self.rejected,
            frames: next_frame,
            initial: self.target,
            final_stats,
        };
        info!(
            run = %self.name,
            accepted = report.accepted,
            rejected = report.rejected,
            acceptance_rate = report.acceptance_rate(),
            "morph finished"
        );
        Ok(report)
    }

    fn emit_frames(&self, mut next: usize, observer: &mut impl MorphObserver) -> Result<usize> {
        let values = self.schedule.values();
        while next < values.len() && values[next] <= self.iteration {
            debug!(run = %self.name, frame = next, iteration = self.iteration, "capturing frame");
            observer.on_frame(&Frame {
                number: next,
                iteration: self.iteration,
                points: &self.points,
                plot_bounds: &self.plot_bounds,
            })?;
            next += 1;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeFactory;

    fn tri() -> Dataset {
        Dataset::new(
            "tri",
            vec![
                DVec2::new(10.0, 50.0),
                DVec2::new(20.0, 50.0),
                DVec2::new(30.0, 80.0),
            ],
            None,
        )
        .unwrap()
    }

    fn config(iterations: usize) -> MorphConfig {
        MorphConfig {
            iterations,
            seed: Some(42),
            num_frames: 5,
            ..MorphConfig::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<(usize, usize)>,
        frames: Vec<(usize, usize)>,
    }

    impl MorphObserver for Recorder {
        fn on_progress(&mut self, completed: usize, total: usize) {
            self.progress.push((completed, total));
        }

        fn on_frame(&mut self, frame: &Frame<'_>) -> Result<()> {
            self.frames.push((frame.number, frame.iteration));
            Ok(())
        }
    }

    #[test]
    fn acceptance_rule() {
        assert!(accepts(2.0, 1.0, 0.0, false));
        assert!(!accepts(1.0, 2.0, 0.0, false));
        assert!(accepts(1.0, 2.0, 3.0, false));
        assert!(accepts(1.0, 2.0, 0.0, true));
        assert!(!accepts(1.0, 1.0, 0.0, false));
    }

    #[test]
    fn rejects_invalid_config() {
        let ds = tri();
        let shape = ShapeFactory::new(&ds).generate("circle").unwrap();
        let mut cfg = config(10);
        cfg.decimals = 9;
        assert!(MorphEngine::new(&ds, &shape, cfg).is_err());
    }

    #[test]
    fn step_stops_at_iteration_limit() {
        let ds = tri();
        let shape = ShapeFactory::new(&ds).generate("circle").unwrap();
        let mut engine = MorphEngine::new(&ds, &shape, config(3)).unwrap();
        for _ in 0..3 {
            assert_ne!(engine.step(), StepOutcome::Finished);
        }
        assert_eq!(engine.step(), StepOutcome::Finished);
        assert_eq!(engine.iteration(), 3);
        assert_eq!(engine.accepted() + engine.rejected(), 3);
    }

    #[test]
    fn run_reports_progress_and_frames_in_order() {
        let ds = tri();
        let shape = ShapeFactory::new(&ds).generate("circle").unwrap();
        let mut engine = MorphEngine::new(&ds, &shape, config(20)).unwrap();
        let mut recorder = Recorder::default();
        let report = engine.run(&mut recorder).unwrap();

        assert_eq!(recorder.progress.len(), 20);
        assert_eq!(recorder.progress[0], (1, 20));
        assert_eq!(recorder.progress[19], (20, 20));

        // Linear, 5 frames over 20 iterations: 0, 4, 8, 12, 16.
        assert_eq!(recorder.frames, vec![(0, 0), (1, 4), (2, 8), (3, 12), (4, 16)]);
        assert_eq!(report.frames, 5);
        assert_eq!(report.iterations, 20);
    }

    #[test]
    fn same_seed_same_result() {
        let ds = tri();
        let shape = ShapeFactory::new(&ds).generate("x").unwrap();
        let run = || {
            let mut engine = MorphEngine::new(&ds, &shape, config(300)).unwrap();
            engine.run(&mut ()).unwrap();
            engine.into_points()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn observer_errors_abort_the_run() {
        struct Failing;
        impl MorphObserver for Failing {
            fn on_frame(&mut self, _frame: &Frame<'_>) -> Result<()> {
                Err(crate::MorphError::Render("disk full".into()))
            }
        }
        let ds = tri();
        let shape = ShapeFactory::new(&ds).generate("circle").unwrap();
        let mut engine = MorphEngine::new(&ds, &shape, config(10)).unwrap();
        assert!(engine.run(&mut Failing).is_err());
        assert_eq!(engine.iteration(), 0);
    }
}
