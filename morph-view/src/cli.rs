use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Morph datasets into shapes while keeping their summary statistics.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("easing").args(["ease", "ease_in", "ease_out"])))]
pub struct Args {
    /// CSV files with `x` and `y` columns to start from
    #[arg(long, required = true, num_args = 1.., value_name = "CSV")]
    pub start_shape: Vec<PathBuf>,

    /// Shapes to morph into, or `all`
    #[arg(long, required = true, num_args = 1.., value_name = "NAME")]
    pub target_shape: Vec<String>,

    /// Number of iterations per morph
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Decimal places the statistics must agree to (0-5)
    #[arg(long)]
    pub decimals: Option<u32>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Divide every input coordinate by this value
    #[arg(long)]
    pub scale: Option<f64>,

    /// Minimum perturbation size
    #[arg(long = "shake")]
    pub min_shake: Option<f64>,

    /// Maximum perturbation size
    #[arg(long)]
    pub max_shake: Option<f64>,

    /// Minimum temperature
    #[arg(long)]
    pub min_temp: Option<f64>,

    /// Maximum temperature
    #[arg(long)]
    pub max_temp: Option<f64>,

    /// Distance to the target below which moves are always accepted
    #[arg(long)]
    pub allowed_dist: Option<f64>,

    /// Also preserve the x and y medians
    #[arg(long)]
    pub with_median: bool,

    /// Directory for images, data and animations
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write the points of every frame as CSV
    #[arg(long)]
    pub write_data: bool,

    /// Do not render frames or animations
    #[arg(long)]
    pub no_images: bool,

    /// Keep the PNG frames after the animation is assembled
    #[arg(long)]
    pub keep_frames: bool,

    /// Play the animation forward only instead of forward then back
    #[arg(long)]
    pub forward_only: bool,

    /// Capture more frames at both ends of the run
    #[arg(long)]
    pub ease: bool,

    /// Capture more frames at the start of the run
    #[arg(long)]
    pub ease_in: bool,

    /// Capture more frames at the end of the run
    #[arg(long)]
    pub ease_out: bool,

    /// Frames to hold still at the start and the end
    #[arg(long)]
    pub freeze: Option<usize>,

    /// Frames in the animation (1-100)
    #[arg(long)]
    pub num_frames: Option<usize>,

    /// Morphs to run in parallel
    #[arg(long)]
    pub workers: Option<usize>,

    /// Path to config TOML
    #[arg(long, default_value = "data-morph.toml")]
    pub config: PathBuf,

    /// Watch the first morph in an interactive window instead of writing files
    #[arg(long, default_value_t = false)]
    pub gui: bool,
}
