use crate::error::{MorphError, Result};
use crate::schedule::{Easing, FrameSchedule};
use serde::{Deserialize, Serialize};

/// Parameters of one annealing run.
///
/// Every field has a serde default so partial configuration files load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Number of outer iterations.
    #[serde(default = "MorphConfig::default_iterations")]
    pub iterations: usize,
    /// Decimal places to which the statistics must stay equal, `0..=5`.
    #[serde(default = "MorphConfig::default_decimals")]
    pub decimals: u32,
    #[serde(default = "MorphConfig::default_min_shake")]
    pub min_shake: f64,
    #[serde(default = "MorphConfig::default_max_shake")]
    pub max_shake: f64,
    #[serde(default)]
    pub min_temp: f64,
    #[serde(default = "MorphConfig::default_max_temp")]
    pub max_temp: f64,
    /// Candidates closer than this to the target are always accepted.
    #[serde(default = "MorphConfig::default_allowed_dist")]
    pub allowed_dist: f64,
    /// Also keep the x and y medians fixed.
    #[serde(default)]
    pub with_median: bool,
    /// Seed for the random generator; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "MorphConfig::default_num_frames")]
    pub num_frames: usize,
    #[serde(default)]
    pub freeze_for: usize,
    #[serde(default)]
    pub easing: Easing,
}

impl MorphConfig {
    pub const MAX_DECIMALS: u32 = 5;

    fn default_iterations() -> usize {
        100_000
    }
    fn default_decimals() -> u32 {
        2
    }
    fn default_min_shake() -> f64 {
        0.3
    }
    fn default_max_shake() -> f64 {
        1.0
    }
    fn default_max_temp() -> f64 {
        0.4
    }
    fn default_allowed_dist() -> f64 {
        2.0
    }
    fn default_num_frames() -> usize {
        100
    }

    /// Checks every field against its accepted range.
    ///
    /// ### Errors
    /// [`MorphError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(invalid("iterations must be greater than 0".into()));
        }
        if self.decimals > Self::MAX_DECIMALS {
            return Err(invalid(format!(
                "decimals must be in 0..={}, got {}",
                Self::MAX_DECIMALS,
                self.decimals
            )));
        }
        check_range("shake", self.min_shake, self.max_shake)?;
        check_range("temp", self.min_temp, self.max_temp)?;
        if !self.allowed_dist.is_finite() || self.allowed_dist < 0.0 {
            return Err(invalid(format!(
                "allowed_dist must be a non-negative number, got {}",
                self.allowed_dist
            )));
        }
        self.frame_schedule().map(|_| ())
    }

    /// The frame capture schedule these settings describe.
    pub fn frame_schedule(&self) -> Result<FrameSchedule> {
        FrameSchedule::select(self.iterations, self.num_frames, self.freeze_for, self.easing)
    }
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            iterations: Self::default_iterations(),
            decimals: Self::default_decimals(),
            min_shake: Self::default_min_shake(),
            max_shake: Self::default_max_shake(),
            min_temp: 0.0,
            max_temp: Self::default_max_temp(),
            allowed_dist: Self::default_allowed_dist(),
            with_median: false,
            seed: None,
            num_frames: Self::default_num_frames(),
            freeze_for: 0,
            easing: Easing::default(),
        }
    }
}

fn invalid(message: String) -> MorphError {
    MorphError::InvalidConfig(message)
}

/// `min` and `max` both in `[0, 1]` with `max > min`.
fn check_range(name: &str, min: f64, max: f64) -> Result<()> {
    for (label, v) in [("min", min), ("max", max)] {
        if !(0.0..=1.0).contains(&v) {
            return Err(invalid(format!(
                "{label}_{name} must be in [0, 1], got {v}"
            )));
        }
    }
    if max <= min {
        return Err(invalid(format!(
            "max_{name} must be greater than min_{name}, got {min} >= {max}"
        )));
    }
    Ok(())
}
