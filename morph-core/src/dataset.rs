use crate::bounds::BoundingBox;
use crate::error::{MorphError, Result};
use glam::DVec2;

/// Fraction of the data range added to each axis when deriving the morph
/// bounds, and again when deriving the plot bounds.
const BOUNDS_MARGIN: f64 = 0.2;

/// A starting point set together with the bounds derived from it.
///
/// The bounds are computed once at construction:
/// - `data_bounds` fit the points tightly,
/// - `morph_bounds` grow the data bounds by 20 % of the data range per axis
///   and constrain every perturbation,
/// - `plot_bounds` grow the morph bounds by the same amount and are then
///   squared up for rendering.
#[derive(Clone, Debug)]
pub struct Dataset {
    name: String,
    points: Vec<DVec2>,
    scaled: bool,
    data_bounds: BoundingBox,
    morph_bounds: BoundingBox,
    plot_bounds: BoundingBox,
}

impl Dataset {
    /// Builds a dataset from raw points.
    ///
    /// ### Parameters
    /// - `name` - Display name, used in output file names.
    /// - `points` - At least two finite points spanning a non-zero range on
    ///   both axes.
    /// - `scale` - Optional divisor applied to every coordinate.
    ///
    /// ### Errors
    /// [`MorphError::InvalidDataset`] for too few or non-finite points and
    /// invalid scales; [`MorphError::InvalidBounds`] when the points are
    /// flat along an axis.
    pub fn new(name: impl Into<String>, points: Vec<DVec2>, scale: Option<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(MorphError::InvalidDataset(format!(
                "at least 2 points are required, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
            return Err(MorphError::InvalidDataset(format!(
                "point {bad} has a non-finite coordinate"
            )));
        }

        let points = match scale {
            None => points,
            Some(s) if s == 0.0 || !s.is_finite() => {
                return Err(MorphError::InvalidDataset(format!(
                    "scale must be a non-zero finite value, got {s}"
                )));
            }
            Some(s) => points.into_iter().map(|p| p / s).collect(),
        };

        let data_bounds = BoundingBox::around(&points)?;
        let offsets = data_bounds.range() * BOUNDS_MARGIN;

        let mut morph_bounds = data_bounds;
        morph_bounds.adjust_bounds(Some(offsets.x), Some(offsets.y))?;

        let mut plot_bounds = morph_bounds;
        plot_bounds.adjust_bounds(Some(offsets.x), Some(offsets.y))?;
        plot_bounds.align_aspect_ratio(false)?;

        Ok(Self {
            name: name.into(),
            points,
            scaled: scale.is_some(),
            data_bounds,
            morph_bounds,
            plot_bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    pub fn data_bounds(&self) -> &BoundingBox {
        &self.data_bounds
    }

    pub fn morph_bounds(&self) -> &BoundingBox {
        &self.morph_bounds
    }

    pub fn plot_bounds(&self) -> &BoundingBox {
        &self.plot_bounds
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_points() -> Vec<DVec2> {
        vec![
            DVec2::new(10.0, 50.0),
            DVec2::new(20.0, 50.0),
            DVec2::new(30.0, 80.0),
        ]
    }

    #[test]
    fn derives_nested_bounds() {
        let ds = Dataset::new("tri", three_points(), None).unwrap();

        assert_eq!(ds.data_bounds().range(), DVec2::new(20.0, 30.0));

        // 20 % of the data range is added per axis.
        let morph = ds.morph_bounds().range();
        assert!((morph.x - 24.0).abs() < 1e-12);
        assert!((morph.y - 36.0).abs() < 1e-12);

        // Plot bounds grow again and are squared up.
        let plot = ds.plot_bounds();
        assert!((plot.aspect_ratio() - 1.0).abs() < 1e-12);
        assert!((plot.y.range() - 42.0).abs() < 1e-12);
        assert!(plot.center().abs_diff_eq(ds.data_bounds().center(), 1e-9));

        for p in ds.points() {
            assert!(ds.morph_bounds().contains(*p));
        }
    }

    #[test]
    fn scale_divides_coordinates() {
        let ds = Dataset::new("tri", three_points(), Some(10.0)).unwrap();
        assert!(ds.is_scaled());
        assert_eq!(ds.points()[2], DVec2::new(3.0, 8.0));
        assert!(Dataset::new("tri", three_points(), Some(0.0)).is_err());
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(Dataset::new("one", vec![DVec2::ZERO], None).is_err());
        assert!(Dataset::new("nan", vec![DVec2::ZERO, DVec2::new(f64::NAN, 1.0)], None).is_err());
        assert!(
            Dataset::new("flat", vec![DVec2::new(0.0, 1.0), DVec2::new(5.0, 1.0)], None).is_err()
        );
    }
}
