//! Same-stats data morphing.
//!
//! Moves the points of a 2-D dataset, one at a time, towards a target
//! shape while the means, standard deviations and correlation (optionally
//! the medians) stay equal to a fixed number of decimals.
//!
//! Main components:
//! - [`bounds`] — intervals and bounding boxes.
//! - [`dataset`] — starting points and their derived bounds.
//! - [`loader`] — reading datasets from CSV.
//! - [`shapes`] — target shapes and the shape catalogue.
//! - [`stats`] — summary statistics computed in full.
//! - [`tracker`] — incremental statistics for single-point moves.
//! - [`schedule`] — annealing and frame-capture schedules.
//! - [`config`] — run parameters.
//! - [`engine`] — the annealing loop.
//! - [`error`] — the crate error type.
//! - [`types`] — shared type aliases.

pub mod bounds;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod loader;
pub mod schedule;
pub mod shapes;
pub mod stats;
pub mod tracker;
pub mod types;

pub use config::MorphConfig;
pub use dataset::Dataset;
pub use engine::{Frame, MorphEngine, MorphObserver, MorphReport, StepOutcome};
pub use error::{MorphError, Result};
pub use shapes::{AVAILABLE_SHAPES, Shape, ShapeFactory};
pub use stats::SummaryStatistics;
