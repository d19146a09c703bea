use super::linspace;
use crate::dataset::Dataset;
use crate::stats::SummaryStatistics;
use glam::DVec2;

/// A circle outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    /// Absolute distance between the circle's edge and `p`.
    #[inline]
    pub fn distance(&self, p: DVec2) -> f64 {
        (self.center.distance(p) - self.radius).abs()
    }
}

/// Concentric circles; the distance is taken to the nearest edge.
#[derive(Clone, Debug)]
pub struct Rings {
    circles: Vec<Circle>,
}

impl Rings {
    pub fn new(center: DVec2, radii: impl IntoIterator<Item = f64>) -> Self {
        Self {
            circles: radii
                .into_iter()
                .map(|radius| Circle { center, radius })
                .collect(),
        }
    }

    /// One circle at the data-bounds center with radius
    /// `1.5 * mean(x stdev, y stdev)`.
    pub fn circle(ds: &Dataset) -> Self {
        Self::new(ds.data_bounds().center(), [default_radius(ds)])
    }

    /// Two rings from the circle radius down towards the center.
    pub fn bullseye(ds: &Dataset) -> Self {
        Self::new(
            ds.data_bounds().center(),
            linspace(default_radius(ds), 0.0, 2, false),
        )
    }

    /// Three rings sized from the smaller data and morph ranges.
    pub fn rings(ds: &Dataset) -> Self {
        let data = ds.data_bounds().range();
        let morph = ds.morph_bounds().range();
        let outer = (data.min_element() + morph.min_element()) / 4.0;
        Self::new(ds.data_bounds().center(), linspace(outer, 0.0, 3, false))
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn distance(&self, p: DVec2) -> f64 {
        self.circles
            .iter()
            .map(|c| c.distance(p))
            .fold(f64::INFINITY, f64::min)
    }
}

fn default_radius(ds: &Dataset) -> f64 {
    let stats = SummaryStatistics::of(ds.points(), false);
    (stats.x_stdev + stats.y_stdev) / 2.0 * 1.5
}
