//! Loading [`Dataset`]s from comma-separated files.

use crate::dataset::Dataset;
use crate::error::{MorphError, Result};
use glam::DVec2;
use std::fs;
use std::path::Path;

/// Reads a CSV file with `x` and `y` columns into a [`Dataset`].
///
/// The header row must name both columns (case-insensitive, any order,
/// extra columns ignored). Blank lines are skipped. The dataset is named
/// after the file stem.
///
/// ### Errors
/// - [`MorphError::Io`] if the file cannot be read.
/// - [`MorphError::Parse`] for missing columns or unparsable values.
/// - Any error from [`Dataset::new`].
pub fn load_csv(path: impl AsRef<Path>, scale: Option<f64>) -> Result<Dataset> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MorphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    let points = parse_points(&text).map_err(|(line, message)| MorphError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    })?;

    Dataset::new(name, points, scale)
}

/// Parses CSV text into points. Errors carry the 1-based line number.
pub fn parse_points(text: &str) -> std::result::Result<Vec<DVec2>, (usize, String)> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or((1, "file is empty".to_string()))?;
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_ascii_lowercase())
        .collect();
    let find = |name: &str| columns.iter().position(|c| c == name);
    let (xi, yi) = match (find("x"), find("y")) {
        (Some(xi), Some(yi)) => (xi, yi),
        (x, y) => {
            let missing: Vec<&str> = [("x", x), ("y", y)]
                .into_iter()
                .filter_map(|(name, idx)| idx.is_none().then_some(name))
                .collect();
            return Err((
                header_line,
                format!(
                    "columns \"x\" and \"y\" are required; missing: {}",
                    missing.join(", ")
                ),
            ));
        }
    };

    let mut points = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |idx: usize, name: &str| -> std::result::Result<f64, (usize, String)> {
            let raw = fields
                .get(idx)
                .ok_or((line_no, format!("missing value for column {name}")))?;
            raw.trim_matches('"')
                .parse::<f64>()
                .map_err(|e| (line_no, format!("invalid {name} value {raw:?}: {e}")))
        };
        points.push(DVec2::new(field(xi, "x")?, field(yi, "y")?));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_columns_in_any_order_and_case() {
        let points = parse_points("id,Y,X\n1,2.5,3\n\n2,-1,0.5\n").unwrap();
        assert_eq!(points, vec![DVec2::new(3.0, 2.5), DVec2::new(0.5, -1.0)]);
    }

    #[test]
    fn reports_missing_columns() {
        let (line, message) = parse_points("a,x\n1,2\n").unwrap_err();
        assert_eq!(line, 1);
        assert!(message.contains("missing: y"), "{message}");
    }

    #[test]
    fn reports_bad_values_with_line_numbers() {
        let (line, message) = parse_points("x,y\n1,2\n3,oops\n").unwrap_err();
        assert_eq!(line, 3);
        assert!(message.contains("invalid y"), "{message}");
    }

    #[test]
    fn load_csv_names_dataset_after_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("morph_core_loader_{}.csv", std::process::id()));
        fs::write(&path, "x,y\n10,50\n20,50\n30,80\n").unwrap();

        let ds = load_csv(&path, None).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.name(),
            path.file_stem().unwrap().to_string_lossy().as_ref()
        );
    }

    #[test]
    fn load_csv_surfaces_io_errors() {
        let err = load_csv("/definitely/not/here.csv", None).unwrap_err();
        assert!(matches!(err, MorphError::Io { .. }));
    }
}
