use super::linspace;
use crate::dataset::Dataset;
use crate::error::{MorphError, Result};
use crate::stats::quantile;
use glam::DVec2;

/// Distance reported for a segment too short to project onto.
pub const DEGENERATE_DISTANCE: f64 = 9999.0;

/// Segments shorter than this are treated as degenerate during queries.
const MIN_SEGMENT_LENGTH: f64 = 1e-8;

/// A segment between two endpoints.
pub type Segment = [DVec2; 2];

/// A set of line segments; the distance is taken to the nearest one.
#[derive(Clone, Debug)]
pub struct LineCollection {
    lines: Vec<Segment>,
}

impl LineCollection {
    /// ### Errors
    /// [`MorphError::DegenerateLine`] if a segment's endpoints are
    /// (nearly) the same point.
    pub fn new(lines: Vec<Segment>) -> Result<Self> {
        if let Some(index) = lines.iter().position(|[a, b]| all_close(*a, *b)) {
            return Err(MorphError::DegenerateLine { index });
        }
        Ok(Self { lines })
    }

    /// Connects consecutive vertices of `path`.
    pub fn polyline(path: &[DVec2]) -> Result<Self> {
        Self::new(path.windows(2).map(|w| [w[0], w[1]]).collect())
    }

    pub fn lines(&self) -> &[Segment] {
        &self.lines
    }

    pub fn distance(&self, p: DVec2) -> f64 {
        self.lines
            .iter()
            .map(|seg| segment_distance(seg, p))
            .fold(f64::INFINITY, f64::min)
    }

    /// The two diagonals of the morph bounds.
    pub fn x_lines(ds: &Dataset) -> Result<Self> {
        let b = ds.morph_bounds();
        let (xmin, xmax, ymin, ymax) = (b.x.low(), b.x.high(), b.y.low(), b.y.high());
        Self::new(vec![
            [DVec2::new(xmin, ymin), DVec2::new(xmax, ymax)],
            [DVec2::new(xmin, ymax), DVec2::new(xmax, ymin)],
        ])
    }

    /// Five horizontal lines spread evenly across the data bounds.
    pub fn horizontal(ds: &Dataset) -> Result<Self> {
        let b = ds.data_bounds();
        Self::new(
            linspace(b.y.low(), b.y.high(), 5, true)
                .into_iter()
                .map(|y| [DVec2::new(b.x.low(), y), DVec2::new(b.x.high(), y)])
                .collect(),
        )
    }

    /// Five vertical lines spread evenly across the data bounds.
    pub fn vertical(ds: &Dataset) -> Result<Self> {
        let b = ds.data_bounds();
        Self::new(
            linspace(b.x.low(), b.x.high(), 5, true)
                .into_iter()
                .map(|x| [DVec2::new(x, b.y.low()), DVec2::new(x, b.y.high())])
                .collect(),
        )
    }

    /// Two vertical lines, each a fifth of the x range in from the edge.
    pub fn wide(ds: &Dataset) -> Result<Self> {
        let b = ds.data_bounds();
        let offset = b.x.range() / 5.0;
        Self::new(
            [b.x.low() + offset, b.x.high() - offset]
                .into_iter()
                .map(|x| [DVec2::new(x, b.y.low()), DVec2::new(x, b.y.high())])
                .collect(),
        )
    }

    /// Two horizontal lines, each a fifth of the y range in from the edge.
    pub fn high(ds: &Dataset) -> Result<Self> {
        let b = ds.data_bounds();
        let offset = b.y.range() / 5.0;
        Self::new(
            [b.y.low() + offset, b.y.high() - offset]
                .into_iter()
                .map(|y| [DVec2::new(b.x.low(), y), DVec2::new(b.x.high(), y)])
                .collect(),
        )
    }

    /// Five parallel rising diagonals across the morph bounds.
    pub fn slant_up(ds: &Dataset) -> Result<Self> {
        let g = QuarterGrid::of(ds);
        Self::new(vec![
            [g.at(0, 2), g.at(2, 4)],
            [g.at(0, 1), g.at(3, 4)],
            [g.at(0, 0), g.at(4, 4)],
            [g.at(1, 0), g.at(4, 3)],
            [g.at(2, 0), g.at(4, 2)],
        ])
    }

    /// Five parallel falling diagonals across the morph bounds.
    pub fn slant_down(ds: &Dataset) -> Result<Self> {
        let g = QuarterGrid::of(ds);
        Self::new(vec![
            [g.at(0, 2), g.at(2, 0)],
            [g.at(0, 3), g.at(3, 0)],
            [g.at(0, 4), g.at(4, 0)],
            [g.at(1, 4), g.at(4, 1)],
            [g.at(2, 4), g.at(4, 2)],
        ])
    }

    /// A rhombus on the 5 % and 95 % quantiles.
    pub fn diamond(ds: &Dataset) -> Result<Self> {
        let (lo, hi) = quantile_box(ds, 0.05, 0.95);
        let mid = (lo + hi) / 2.0;
        Self::polyline(&[
            DVec2::new(lo.x, mid.y),
            DVec2::new(mid.x, hi.y),
            DVec2::new(hi.x, mid.y),
            DVec2::new(mid.x, lo.y),
            DVec2::new(lo.x, mid.y),
        ])
    }

    /// A rectangle on the 10 % and 90 % quantiles.
    pub fn rectangle(ds: &Dataset) -> Result<Self> {
        let (lo, hi) = quantile_box(ds, 0.1, 0.9);
        Self::polyline(&[
            lo,
            DVec2::new(lo.x, hi.y),
            hi,
            DVec2::new(hi.x, lo.y),
            lo,
        ])
    }

    /// A five-pointed star outline inside the square part of the morph
    /// bounds.
    pub fn star(ds: &Dataset) -> Result<Self> {
        let mut bounds = *ds.morph_bounds();
        bounds.align_aspect_ratio(true)?;
        let origin = DVec2::new(bounds.x.low(), bounds.y.low());
        let range = bounds.range();
        let vertex = |fx: f64, fy: f64| origin + range * DVec2::new(fx, fy);

        Self::polyline(&[
            vertex(0.0, 0.625),
            vertex(0.375, 0.625),
            vertex(0.5, 1.0),
            vertex(0.625, 0.625),
            vertex(1.0, 0.625),
            vertex(0.6875, 0.375),
            vertex(0.8125, 0.0),
            vertex(0.5, 0.25),
            vertex(0.1875, 0.0),
            vertex(0.3125, 0.375),
            vertex(0.0, 0.625),
        ])
    }
}

/// Distance from `p` to the segment `[a, b]`.
///
/// Projects `p` onto the infinite line through the segment. Projections
/// falling outside the segment measure to the nearer endpoint instead.
pub fn segment_distance([a, b]: &Segment, p: DVec2) -> f64 {
    let ab = *b - *a;
    let len2 = ab.length_squared();
    if len2 < MIN_SEGMENT_LENGTH * MIN_SEGMENT_LENGTH {
        return DEGENERATE_DISTANCE;
    }
    let u = (p - *a).dot(ab) / len2;
    if u < 0.0 {
        p.distance(*a)
    } else if u > 1.0 {
        p.distance(*b)
    } else {
        p.distance(*a + ab * u)
    }
}

/// Element-wise closeness with a relative and an absolute tolerance.
fn all_close(a: DVec2, b: DVec2) -> bool {
    const RTOL: f64 = 1e-5;
    const ATOL: f64 = 1e-8;
    (a - b).abs().cmple(ATOL + RTOL * b.abs()).all()
}

fn quantile_box(ds: &Dataset, low: f64, high: f64) -> (DVec2, DVec2) {
    let (xs, ys) = (ds.xs(), ds.ys());
    (
        DVec2::new(quantile(&xs, low), quantile(&ys, low)),
        DVec2::new(quantile(&xs, high), quantile(&ys, high)),
    )
}

/// The morph bounds divided into quarters along each axis.
struct QuarterGrid {
    origin: DVec2,
    step: DVec2,
}

impl QuarterGrid {
    fn of(ds: &Dataset) -> Self {
        let b = ds.morph_bounds();
        Self {
            origin: DVec2::new(b.x.low(), b.y.low()),
            step: b.range() / 4.0,
        }
    }

    /// Grid vertex `(i, j)` with `i, j` in `0..=4`.
    fn at(&self, i: u32, j: u32) -> DVec2 {
        self.origin + self.step * DVec2::new(i as f64, j as f64)
    }
}
