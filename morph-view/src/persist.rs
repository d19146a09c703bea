//! Writing frame data and naming output files.

use glam::DVec2;
use morph_core::{MorphError, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// File names for one `<dataset>-to-<shape>` run inside an output
/// directory.
#[derive(Clone, Debug)]
pub struct OutputPaths {
    dir: PathBuf,
    dataset: String,
    shape: String,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>, dataset: &str, shape: &str) -> Self {
        Self {
            dir: dir.into(),
            dataset: dataset.to_string(),
            shape: shape.to_string(),
        }
    }

    pub fn image(&self, frame: usize) -> PathBuf {
        self.dir.join(format!(
            "{}-to-{}-image-{frame:03}.png",
            self.dataset, self.shape
        ))
    }

    pub fn data(&self, frame: usize) -> PathBuf {
        self.dir.join(format!(
            "{}-to-{}-data-{frame:03}.csv",
            self.dataset, self.shape
        ))
    }

    pub fn animation(&self) -> PathBuf {
        self.dir
            .join(format!("{}_to_{}.gif", self.dataset, self.shape))
    }
}

/// Creates `dir` and its parents if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| MorphError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Formats points as CSV with an `x,y` header.
pub fn points_to_csv(points: &[DVec2]) -> String {
    let mut out = String::with_capacity(16 + points.len() * 24);
    out.push_str("x,y\n");
    for p in points {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{},{}", p.x, p.y);
    }
    out
}

/// Writes `points` as CSV to `path`.
pub fn write_points(path: &Path, points: &[DVec2]) -> Result<()> {
    fs::write(path, points_to_csv(points)).map_err(|source| MorphError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes the given files, ignoring ones that are already gone.
pub fn remove_files<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<()> {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(MorphError::Io {
                    path: path.clone(),
                    source,
                });
            }
        }
    }
    Ok(())
}
