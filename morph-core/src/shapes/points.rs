use super::linspace;
use crate::dataset::Dataset;
use crate::stats::{SummaryStatistics, quantile};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Samples taken along each parabola.
const PARABOLA_SAMPLES: usize = 100;

/// Seed for the decorative scatter cloud, so it looks the same every run.
const SCATTER_SEED: u64 = 1;

/// A fixed set of points; the distance is taken to the nearest one.
#[derive(Clone, Debug)]
pub struct PointCollection {
    points: Vec<DVec2>,
}

impl PointCollection {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn distance(&self, p: DVec2) -> f64 {
        self.points
            .iter()
            .map(|q| q.distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// A 3x3 grid on the 5 %, middle and 95 % quantiles.
    pub fn dots_grid(ds: &Dataset) -> Self {
        let (xs, ys) = (ds.xs(), ds.ys());
        let three = |v: &[f64]| {
            let (lo, hi) = (quantile(v, 0.05), quantile(v, 0.95));
            [lo, (lo + hi) / 2.0, hi]
        };
        let (gx, gy) = (three(&xs), three(&ys));
        Self::new(
            gx.iter()
                .flat_map(|&x| gy.iter().map(move |&y| DVec2::new(x, y)))
                .collect(),
        )
    }

    /// Opens downward: peaks at the top of the data bounds.
    pub fn down_parabola(ds: &Dataset) -> Self {
        let (lo, hi) = vertical_parabola_bounds(ds);
        Self::new(parabola(
            [lo.x, ds.data_bounds().x.center(), hi.x],
            [lo.y, hi.y, lo.y],
        ))
    }

    /// Opens upward: bottoms out at the foot of the data bounds.
    pub fn up_parabola(ds: &Dataset) -> Self {
        let (lo, hi) = vertical_parabola_bounds(ds);
        Self::new(parabola(
            [lo.x, ds.data_bounds().x.center(), hi.x],
            [hi.y, lo.y, hi.y],
        ))
    }

    /// Opens to the left: its vertex touches the right edge.
    pub fn left_parabola(ds: &Dataset) -> Self {
        let (lo, hi) = horizontal_parabola_bounds(ds);
        Self::new(transpose(parabola(
            [lo.y, ds.data_bounds().y.center(), hi.y],
            [lo.x, hi.x, lo.x],
        )))
    }

    /// Opens to the right: its vertex touches the left edge.
    pub fn right_parabola(ds: &Dataset) -> Self {
        let (lo, hi) = horizontal_parabola_bounds(ds);
        Self::new(transpose(parabola(
            [lo.y, ds.data_bounds().y.center(), hi.y],
            [hi.x, lo.x, hi.x],
        )))
    }

    /// 80 samples of the classic heart curve, centered on the data bounds
    /// and scaled to their half width.
    pub fn heart(ds: &Dataset) -> Self {
        let center = ds.data_bounds().center();
        let scale = heart_scale(ds);
        Self::new(heart_curve().map(|p| p * scale + center).collect())
    }

    /// An upside-down heart on a flared base.
    pub fn spade(ds: &Dataset) -> Self {
        let center = ds.data_bounds().center();
        let scale = heart_scale(ds);

        let base_line = linspace(-6.0, 6.0, 12, true)
            .into_iter()
            .map(|x| DVec2::new(x, -16.0));
        let left = linspace(-6.0, 0.0, 12, true)
            .into_iter()
            .map(|x| DVec2::new(x, 0.278 * (x + 6.0).powi(2) - 16.0));
        let right = linspace(0.0, 6.0, 12, true)
            .into_iter()
            .map(|x| DVec2::new(x, 0.278 * (x - 6.0).powi(2) - 16.0));

        let points = heart_curve()
            .map(|p| DVec2::new(p.x, -p.y))
            .chain(base_line)
            .chain(left)
            .chain(right)
            .map(|p| p * scale + center)
            .collect();
        Self::new(points)
    }

    /// Three round lobes over a flared stem.
    pub fn club(ds: &Dataset) -> Self {
        let s = ds.data_bounds().range().min_element() / 75.0;
        let center = ds.data_bounds().center();

        let radius = 15.0 * s;
        let t = linspace(0.0, (2.0 - 1.0 / 3.0) * PI, 30, true);
        let arc = |start: f64, offset: DVec2| {
            t.iter()
                .map(move |&t| offset + radius * DVec2::from_angle(t + start))
                .collect::<Vec<_>>()
        };
        let mut points = Vec::with_capacity(110);
        points.extend(arc(-PI / 3.0, DVec2::new(0.0, 18.0 * s)));
        points.extend(arc(PI / 3.0, DVec2::new(-15.0 * s, -9.0 * s)));
        points.extend(arc(PI, DVec2::new(15.0 * s, -9.0 * s)));

        let stem_x = 8.0 * s;
        let stem_y = 34.0 * s;
        let curve = 0.35 / s;
        let pad = 1.5 * s;
        points.extend(
            linspace(-stem_x, stem_x, 8, true)
                .into_iter()
                .map(|x| DVec2::new(x, -stem_y)),
        );
        points.extend(
            linspace(-(stem_x - pad), -pad, 6, true)
                .into_iter()
                .map(|x| DVec2::new(x, curve * (x + stem_x).powi(2) - stem_y)),
        );
        points.extend(
            linspace(pad, stem_x - pad, 6, true)
                .into_iter()
                .map(|x| DVec2::new(x, curve * (x - stem_x).powi(2) - stem_y)),
        );

        Self::new(points.into_iter().map(|p| p + center).collect())
    }

    /// An Archimedean spiral out from the data-bounds center, sampled more
    /// densely towards the outside.
    pub fn spiral(ds: &Dataset) -> Self {
        let max_radius = ds.morph_bounds().range().min_element() / 2.0;
        let center = ds.data_bounds().center();
        let range = ds.data_bounds().range();
        let rotations = if range.x >= range.y { 3.0 } else { 3.25 };

        let t = [
            linspace(0.0, 0.1, 3, false),
            linspace(0.1, 0.2, 5, false),
            linspace(0.2, 0.5, 25, false),
            linspace(0.5, 0.75, 30, false),
            linspace(0.75, 1.0, 35, true),
        ]
        .concat();

        Self::new(
            t.into_iter()
                .map(|t| center + t * max_radius * DVec2::from_angle(2.0 * rotations * PI * t))
                .collect(),
        )
    }

    /// A lemniscate of Bernoulli lying along the wider data axis.
    pub fn figure_eight(ds: &Dataset) -> Self {
        let center = ds.data_bounds().center();
        let range = ds.data_bounds().range();
        let half_width = range.max_element() * 0.3 * 2f64.sqrt();
        let wide = range.x >= range.y;

        Self::new(
            linspace(-3.1, 3.1, 80, true)
                .into_iter()
                .map(|t| {
                    let x = half_width * t.cos() / (1.0 + t.sin().powi(2));
                    let p = DVec2::new(x, x * t.sin());
                    center + if wide { p } else { DVec2::new(p.y, p.x) }
                })
                .collect(),
        )
    }

    /// A noisy cloud of rings around the data mean. Only used for display.
    pub fn scatter(ds: &Dataset) -> Self {
        let stats = SummaryStatistics::of(ds.points(), false);
        let center = DVec2::new(stats.x_mean, stats.y_mean);
        let max_radius = stats.x_stdev.max(stats.y_stdev);
        let mut rng = StdRng::seed_from_u64(SCATTER_SEED);

        let mut points = vec![center];
        for radius in linspace((max_radius / 5.0).floor(), max_radius, 5, true) {
            for angle in linspace(0.0, 360.0, 50, false) {
                let jitter = DVec2::new(
                    rng.sample::<f64, _>(StandardNormal),
                    rng.sample::<f64, _>(StandardNormal),
                );
                let ring = radius * DVec2::from_angle(angle.to_radians());
                points.push(center + ring + jitter * max_radius);
            }
        }
        Self::new(points)
    }
}

/// Parabola endpoints for the up/down variants: x pulled in by a tenth of
/// the range, y at the data bounds.
fn vertical_parabola_bounds(ds: &Dataset) -> (DVec2, DVec2) {
    let b = ds.data_bounds();
    let offset = b.x.range() / 10.0;
    (
        DVec2::new(b.x.low() + offset, b.y.low()),
        DVec2::new(b.x.high() - offset, b.y.high()),
    )
}

/// Parabola endpoints for the left/right variants: y pulled in by a tenth
/// of the range, x at the data bounds.
fn horizontal_parabola_bounds(ds: &Dataset) -> (DVec2, DVec2) {
    let b = ds.data_bounds();
    let offset = b.y.range() / 10.0;
    (
        DVec2::new(b.x.low(), b.y.low() + offset),
        DVec2::new(b.x.high(), b.y.high() - offset),
    )
}

/// Samples the quadratic through `(u[k], v[k])` evenly over `u[0]..=u[2]`.
fn parabola(u: [f64; 3], v: [f64; 3]) -> Vec<DVec2> {
    // Lagrange form of the interpolating quadratic.
    let f = |x: f64| {
        (0..3)
            .map(|k| {
                let (i, j) = ((k + 1) % 3, (k + 2) % 3);
                v[k] * (x - u[i]) * (x - u[j]) / ((u[k] - u[i]) * (u[k] - u[j]))
            })
            .sum::<f64>()
    };
    linspace(u[0], u[2], PARABOLA_SAMPLES, true)
        .into_iter()
        .map(|x| DVec2::new(x, f(x)))
        .collect()
}

fn transpose(points: Vec<DVec2>) -> Vec<DVec2> {
    points.into_iter().map(|p| DVec2::new(p.y, p.x)).collect()
}

fn heart_scale(ds: &Dataset) -> f64 {
    let b = ds.data_bounds();
    (b.x.high() - b.x.center()) / 16.0
}

/// The unit heart curve, x spanning roughly `[-16, 16]`.
fn heart_curve() -> impl Iterator<Item = DVec2> {
    linspace(-3.0, 3.0, 80, true).into_iter().map(|t| {
        DVec2::new(
            16.0 * t.sin().powi(3),
            13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri() -> Dataset {
        Dataset::new(
            "tri",
            vec![
                DVec2::new(10.0, 50.0),
                DVec2::new(20.0, 50.0),
                DVec2::new(30.0, 80.0),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn distance_is_to_nearest_point() {
        let shape = PointCollection::new(vec![DVec2::new(0.0, 0.0), DVec2::new(20.0, 50.0)]);
        assert_relative_eq!(shape.distance(DVec2::new(-1.0, -1.0)), 2f64.sqrt());
        assert_relative_eq!(shape.distance(DVec2::new(20.0, 49.0)), 1.0);
    }

    #[test]
    fn parabola_passes_through_its_anchor_points() {
        let points = parabola([0.0, 5.0, 10.0], [0.0, 10.0, 0.0]);
        assert_eq!(points.len(), PARABOLA_SAMPLES);
        assert_relative_eq!(points[0].y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(points[99].y, 0.0, epsilon = 1e-12);
        let peak = points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(peak <= 10.0 && peak > 9.9);
    }

    #[test]
    fn down_and_up_parabolas_mirror_each_other() {
        let ds = tri();
        let down = PointCollection::down_parabola(&ds);
        let up = PointCollection::up_parabola(&ds);
        let b = ds.data_bounds();
        for (d, u) in down.points().iter().zip(up.points()) {
            assert_relative_eq!(d.x, u.x);
            assert_relative_eq!(d.y - b.y.low(), b.y.high() - u.y, epsilon = 1e-9);
        }
        assert_relative_eq!(down.points()[0].x, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn side_parabolas_run_along_y() {
        let ds = tri();
        let left = PointCollection::left_parabola(&ds);
        assert_relative_eq!(left.points()[0].y, 53.0, epsilon = 1e-12);
        assert_relative_eq!(left.points()[0].x, 10.0, epsilon = 1e-9);
        let right = PointCollection::right_parabola(&ds);
        assert_relative_eq!(right.points()[0].x, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn catalogue_point_counts() {
        let ds = tri();
        assert_eq!(PointCollection::dots_grid(&ds).points().len(), 9);
        assert_eq!(PointCollection::heart(&ds).points().len(), 80);
        assert_eq!(PointCollection::spade(&ds).points().len(), 80 + 36);
        assert_eq!(PointCollection::club(&ds).points().len(), 90 + 20);
        assert_eq!(PointCollection::spiral(&ds).points().len(), 98);
        assert_eq!(PointCollection::figure_eight(&ds).points().len(), 80);
        assert_eq!(PointCollection::scatter(&ds).points().len(), 251);
    }

    #[test]
    fn heart_spans_the_data_width() {
        let ds = tri();
        let heart = PointCollection::heart(&ds);
        let max_x = heart.points().iter().map(|p| p.x).fold(f64::MIN, f64::max);
        // sin(t)^3 peaks just short of 1 on the sampled grid.
        assert!(max_x <= ds.data_bounds().x.high() + 1e-9);
        assert!(max_x > ds.data_bounds().x.high() - 0.5);
    }

    #[test]
    fn figure_eight_follows_the_wider_axis() {
        let ds = tri();
        let eight = PointCollection::figure_eight(&ds);
        let spread = |f: fn(&DVec2) -> f64| {
            let vals: Vec<f64> = eight.points().iter().map(f).collect();
            let max = vals.iter().cloned().fold(f64::MIN, f64::max);
            let min = vals.iter().cloned().fold(f64::MAX, f64::min);
            max - min
        };
        // The data are taller than wide.
        assert!(spread(|p| p.y) > spread(|p| p.x));
    }

    #[test]
    fn scatter_is_deterministic() {
        let ds = tri();
        let a = PointCollection::scatter(&ds);
        let b = PointCollection::scatter(&ds);
        assert_eq!(a.points(), b.points());
        assert_eq!(a.points()[0], DVec2::new(20.0, 60.0));
    }
}
