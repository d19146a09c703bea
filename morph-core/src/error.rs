use std::path::PathBuf;

/// Errors raised while building or running a morph.
///
/// Every variant is raised before the annealing loop starts (configuration,
/// dataset, or shape construction) or by an observer while recording a
/// frame. The loop itself has no failure state.
#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown shape \"{name}\"; valid options are: {}", available.join(", "))]
    UnknownShape {
        name: String,
        available: Vec<&'static str>,
    },

    #[error("line {index} has the same start and end point")]
    DegenerateLine { index: usize },

    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("failed to parse {}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render frame: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, MorphError>;
