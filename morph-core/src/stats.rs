//! Summary statistics of a point set, computed in a full pass.
//!
//! [`crate::tracker::StatisticsTracker`] maintains the same values
//! incrementally; the functions here are the reference it is checked
//! against and the source of the target statistics for a morph.

use glam::DVec2;

/// The statistics that must stay fixed while morphing.
///
/// Standard deviations are sample standard deviations (`n - 1`
/// denominator). The medians are only present when median preservation is
/// requested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummaryStatistics {
    pub x_mean: f64,
    pub y_mean: f64,
    pub x_stdev: f64,
    pub y_stdev: f64,
    pub correlation: f64,
    pub x_median: Option<f64>,
    pub y_median: Option<f64>,
}

impl SummaryStatistics {
    /// Computes all statistics over `points` in one pass (plus a sort per
    /// axis when `with_median` is set).
    pub fn of(points: &[DVec2], with_median: bool) -> Self {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        Self::of_columns(&xs, &ys, with_median)
    }

    pub fn of_columns(xs: &[f64], ys: &[f64], with_median: bool) -> Self {
        let n = xs.len() as f64;
        let x_mean = mean(xs);
        let y_mean = mean(ys);
        let x_var = xs.iter().map(|x| (x - x_mean).powi(2)).sum::<f64>() / n;
        let y_var = ys.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / n;
        let cov = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum::<f64>()
            / n;

        Self {
            x_mean,
            y_mean,
            x_stdev: sample_stdev(x_var, xs.len()),
            y_stdev: sample_stdev(y_var, ys.len()),
            correlation: correlation(cov, x_var, y_var),
            x_median: with_median.then(|| median(xs)),
            y_median: with_median.then(|| median(ys)),
        }
    }

    /// The statistics that are present, in a fixed order: means, standard
    /// deviations, correlation, then medians if tracked.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        [
            Some(self.x_mean),
            Some(self.y_mean),
            Some(self.x_stdev),
            Some(self.y_stdev),
            Some(self.correlation),
            self.x_median,
            self.y_median,
        ]
        .into_iter()
        .flatten()
    }

    /// Each present statistic multiplied by `10^decimals` and floored.
    pub fn floored(&self, decimals: u32) -> Vec<f64> {
        let factor = 10f64.powi(decimals as i32);
        self.values().map(|v| (v * factor).floor()).collect()
    }

    /// Returns `true` if both sets of statistics agree when floored to
    /// `decimals` decimal places.
    ///
    /// `NaN` compares equal to `NaN` so that a degenerate correlation does
    /// not block every move.
    pub fn matches(&self, other: &Self, decimals: u32) -> bool {
        let a = self.floored(decimals);
        let b = other.floored(decimals);
        a.len() == b.len() && a.iter().zip(&b).all(|(l, r)| same_value(*l, *r))
    }
}

#[inline]
pub(crate) fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Converts a population variance to a sample standard deviation.
#[inline]
pub fn sample_stdev(population_variance: f64, n: usize) -> f64 {
    if n < 2 {
        return f64::NAN;
    }
    (population_variance.max(0.0) * n as f64 / (n - 1) as f64).sqrt()
}

/// Pearson correlation from a covariance and the two variances (all with
/// the same denominator).
#[inline]
pub fn correlation(covariance: f64, x_variance: f64, y_variance: f64) -> f64 {
    covariance / (x_variance.max(0.0) * y_variance.max(0.0)).sqrt()
}

/// Median of `values` via a full sort.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Quantile with linear interpolation between the closest ranks.
///
/// `q` is clamped to `[0, 1]`; an empty slice yields `NaN`.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
