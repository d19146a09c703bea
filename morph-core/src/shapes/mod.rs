//! Target shapes and their distance functions.
//!
//! Every target is a [`Shape`]: a name plus one of a closed set of
//! [`Geometry`] variants that answer `distance(p) >= 0`.
//!
//! - [`circles`] — circles and concentric rings.
//! - [`lines`] — collections of line segments.
//! - [`points`] — collections of sample points on curves.
//!
//! [`ShapeFactory`] builds the named catalogue from a [`Dataset`].

pub mod circles;
pub mod lines;
pub mod points;

use crate::dataset::Dataset;
use crate::error::{MorphError, Result};
use circles::Rings;
use glam::DVec2;
use lines::LineCollection;
use points::PointCollection;
use std::fmt;

/// Names accepted by [`ShapeFactory::generate`], in display order.
pub const AVAILABLE_SHAPES: [&str; 24] = [
    "bullseye",
    "circle",
    "club",
    "diamond",
    "dots",
    "down_parab",
    "figure_eight",
    "heart",
    "h_lines",
    "high_lines",
    "left_parab",
    "rectangle",
    "right_parab",
    "rings",
    "scatter",
    "slant_down",
    "slant_up",
    "spade",
    "spiral",
    "star",
    "up_parab",
    "v_lines",
    "wide_lines",
    "x",
];

/// The geometric primitive behind a [`Shape`].
#[derive(Clone, Debug)]
pub enum Geometry {
    /// Minimum distance to any of a fixed set of points.
    Points(PointCollection),
    /// Minimum distance to any of a set of segments.
    Lines(LineCollection),
    /// Minimum distance to the edge of any of a set of circles.
    Rings(Rings),
    /// Null shape: every point is at distance zero. The points are only
    /// kept for display.
    Scatter(PointCollection),
}

/// A named morph target.
#[derive(Clone, Debug)]
pub struct Shape {
    name: &'static str,
    geometry: Geometry,
}

impl Shape {
    pub fn new(name: &'static str, geometry: Geometry) -> Self {
        Self { name, geometry }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// `true` for the null shape, which every move satisfies.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.geometry, Geometry::Scatter(_))
    }

    /// Distance from `p` to the shape.
    #[inline]
    pub fn distance(&self, p: DVec2) -> f64 {
        match &self.geometry {
            Geometry::Points(points) => points.distance(p),
            Geometry::Lines(lines) => lines.distance(p),
            Geometry::Rings(rings) => rings.distance(p),
            Geometry::Scatter(_) => 0.0,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Builds catalogue shapes sized to a dataset.
pub struct ShapeFactory<'a> {
    dataset: &'a Dataset,
}

impl<'a> ShapeFactory<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Builds the shape registered under `name`.
    ///
    /// ### Errors
    /// - [`MorphError::UnknownShape`] if `name` is not in
    ///   [`AVAILABLE_SHAPES`].
    /// - [`MorphError::DegenerateLine`] if the dataset is so small that a
    ///   line shape collapses to a point.
    pub fn generate(&self, name: &str) -> Result<Shape> {
        let ds = self.dataset;
        let (name, geometry) = match name {
            "bullseye" => ("bullseye", Geometry::Rings(Rings::bullseye(ds))),
            "circle" => ("circle", Geometry::Rings(Rings::circle(ds))),
            "rings" => ("rings", Geometry::Rings(Rings::rings(ds))),

            "x" => ("x", Geometry::Lines(LineCollection::x_lines(ds)?)),
            "h_lines" => ("h_lines", Geometry::Lines(LineCollection::horizontal(ds)?)),
            "v_lines" => ("v_lines", Geometry::Lines(LineCollection::vertical(ds)?)),
            "wide_lines" => ("wide_lines", Geometry::Lines(LineCollection::wide(ds)?)),
            "high_lines" => ("high_lines", Geometry::Lines(LineCollection::high(ds)?)),
            "slant_up" => ("slant_up", Geometry::Lines(LineCollection::slant_up(ds)?)),
            "slant_down" => ("slant_down", Geometry::Lines(LineCollection::slant_down(ds)?)),
            "diamond" => ("diamond", Geometry::Lines(LineCollection::diamond(ds)?)),
            "rectangle" => ("rectangle", Geometry::Lines(LineCollection::rectangle(ds)?)),
            "star" => ("star", Geometry::Lines(LineCollection::star(ds)?)),

            "dots" => ("dots", Geometry::Points(PointCollection::dots_grid(ds))),
            "down_parab" => ("down_parab", Geometry::Points(PointCollection::down_parabola(ds))),
            "up_parab" => ("up_parab", Geometry::Points(PointCollection::up_parabola(ds))),
            "left_parab" => ("left_parab", Geometry::Points(PointCollection::left_parabola(ds))),
            "right_parab" => (
                "right_parab",
                Geometry::Points(PointCollection::right_parabola(ds)),
            ),
            "heart" => ("heart", Geometry::Points(PointCollection::heart(ds))),
            "spade" => ("spade", Geometry::Points(PointCollection::spade(ds))),
            "club" => ("club", Geometry::Points(PointCollection::club(ds))),
            "spiral" => ("spiral", Geometry::Points(PointCollection::spiral(ds))),
            "figure_eight" => (
                "figure_eight",
                Geometry::Points(PointCollection::figure_eight(ds)),
            ),
            "scatter" => ("scatter", Geometry::Scatter(PointCollection::scatter(ds))),

            other => {
                return Err(MorphError::UnknownShape {
                    name: other.to_string(),
                    available: AVAILABLE_SHAPES.to_vec(),
                });
            }
        };
        Ok(Shape::new(name, geometry))
    }
}

/// `num` evenly spaced values from `start` towards `end`, including `end`
/// only when `endpoint` is set.
pub(crate) fn linspace(start: f64, end: f64, num: usize, endpoint: bool) -> Vec<f64> {
    let divisions = match (num, endpoint) {
        (0, _) => return Vec::new(),
        (1, _) => return vec![start],
        (n, true) => n - 1,
        (n, false) => n,
    };
    let step = (end - start) / divisions as f64;
    (0..num).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let points = (0..40)
            .map(|i| {
                let t = i as f64;
                DVec2::new(10.0 + (t * 0.7).sin() * 8.0 + t * 0.5, 40.0 + (t * 1.3).cos() * 12.0)
            })
            .collect();
        Dataset::new("wave", points, None).unwrap()
    }

    #[test]
    fn linspace_matches_endpoint_semantics() {
        assert_eq!(linspace(0.0, 1.0, 5, true), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(1.0, 0.0, 2, false), vec![1.0, 0.5]);
        assert!(linspace(0.0, 1.0, 0, true).is_empty());
    }

    #[test]
    fn factory_builds_every_listed_shape() {
        let ds = dataset();
        let factory = ShapeFactory::new(&ds);
        let sample = ds.data_bounds().center();
        for name in AVAILABLE_SHAPES {
            let shape = factory.generate(name).unwrap();
            assert_eq!(shape.name(), name);
            let d = shape.distance(sample);
            assert!(d.is_finite() && d >= 0.0, "{name}: {d}");
        }
    }

    #[test]
    fn factory_rejects_unknown_names() {
        let ds = dataset();
        match ShapeFactory::new(&ds).generate("hexagon") {
            Err(MorphError::UnknownShape { name, available }) => {
                assert_eq!(name, "hexagon");
                assert!(available.contains(&"circle"));
            }
            other => panic!("expected UnknownShape, got {other:?}"),
        }
    }

    #[test]
    fn scatter_is_always_at_distance_zero() {
        let ds = dataset();
        let shape = ShapeFactory::new(&ds).generate("scatter").unwrap();
        assert_eq!(shape.distance(DVec2::new(-1e6, 1e6)), 0.0);
        assert!(shape.is_null());
        assert!(!factory_shape(&ds, "circle").is_null());
    }

    fn factory_shape(ds: &Dataset, name: &str) -> Shape {
        ShapeFactory::new(ds).generate(name).unwrap()
    }
}
