//! Application settings: an optional TOML file overridden by CLI flags.

use crate::cli::Args;
use morph_core::MorphConfig;
use morph_core::schedule::Easing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "OutputSettings::default_dir")]
    pub dir: Option<PathBuf>,
    #[serde(default = "OutputSettings::default_write_images")]
    pub write_images: bool,
    #[serde(default)]
    pub write_data: bool,
    #[serde(default)]
    pub keep_frames: bool,
    #[serde(default)]
    pub forward_only: bool,
    /// Delay between animation frames.
    #[serde(default = "OutputSettings::default_frame_delay_ms")]
    pub frame_delay_ms: u32,
    /// Edge length of rendered frames, in pixels.
    #[serde(default = "OutputSettings::default_image_size")]
    pub image_size: u32,
}

impl OutputSettings {
    fn default_dir() -> Option<PathBuf> {
        Some(PathBuf::from("morphed_data"))
    }
    fn default_write_images() -> bool {
        true
    }
    fn default_frame_delay_ms() -> u32 {
        50
    }
    fn default_image_size() -> u32 {
        600
    }

    pub fn writes_anything(&self) -> bool {
        self.write_images || self.write_data
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            write_images: Self::default_write_images(),
            write_data: false,
            keep_frames: false,
            forward_only: false,
            frame_delay_ms: Self::default_frame_delay_ms(),
            image_size: Self::default_image_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default = "RunnerSettings::default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub scale: Option<f64>,
}

impl RunnerSettings {
    fn default_workers() -> usize {
        2
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            workers: Self::default_workers(),
            scale: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub morph: MorphConfig,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub runner: RunnerSettings,
}

impl Settings {
    /// Reads settings from `path`, falling back to defaults (with a
    /// warning) when the file is missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to parse settings; using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read settings; using defaults");
                Self::default()
            }
        }
    }

    /// Applies every flag the user passed on top of the file values.
    pub fn apply_args(&mut self, args: &Args) {
        let m = &mut self.morph;
        override_with(&mut m.iterations, args.iterations);
        override_with(&mut m.decimals, args.decimals);
        override_with(&mut m.min_shake, args.min_shake);
        override_with(&mut m.max_shake, args.max_shake);
        override_with(&mut m.min_temp, args.min_temp);
        override_with(&mut m.max_temp, args.max_temp);
        override_with(&mut m.allowed_dist, args.allowed_dist);
        override_with(&mut m.num_frames, args.num_frames);
        override_with(&mut m.freeze_for, args.freeze);
        if args.seed.is_some() {
            m.seed = args.seed;
        }
        m.with_median |= args.with_median;
        if args.ease {
            m.easing = Easing::InOut;
        } else if args.ease_in || args.ease_out {
            m.easing = Easing::from_flags(args.ease_in, args.ease_out);
        }

        let o = &mut self.output;
        if args.output_dir.is_some() {
            o.dir = args.output_dir.clone();
        }
        o.write_data |= args.write_data;
        o.write_images &= !args.no_images;
        o.keep_frames |= args.keep_frames;
        o.forward_only |= args.forward_only;

        override_with(&mut self.runner.workers, args.workers);
        if args.scale.is_some() {
            self.runner.scale = args.scale;
        }
    }

    /// Checks the settings as a whole.
    ///
    /// ### Errors
    /// Any [`MorphConfig::validate`] failure, a missing output directory
    /// while files are to be written, or zero workers.
    pub fn validate(&self) -> morph_core::Result<()> {
        self.morph.validate()?;
        if self.output.writes_anything() && self.output.dir.is_none() {
            return Err(morph_core::MorphError::InvalidConfig(
                "an output directory is required to write images or data".into(),
            ));
        }
        if self.runner.workers == 0 {
            return Err(morph_core::MorphError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}
