//! Incremental summary statistics for single-point moves.
//!
//! The annealing loop moves one point per iteration and must know whether
//! the statistics still match before accepting the move. Recomputing them
//! costs O(n) per iteration; [`StatisticsTracker`] answers the same question
//! in O(1) (O(log n) with medians) from cached moments:
//!
//! - means: `mean' = mean - old/n + new/n`,
//! - population variances: `var' = var + d/n * (new + old - mean - mean')`
//!   with `d = new - old`,
//! - correlation from the running mean of `x * y`,
//! - medians from two ordered halves per axis (see [`MedianTracker`]).
//!
//! [`StatisticsTracker::query`] is pure; [`StatisticsTracker::commit`]
//! applies the identical update.

use crate::stats::{self, SummaryStatistics};
use crate::types::PointId;
use glam::DVec2;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

/// Number of commits after which the cached moments are recomputed from the
/// owned arrays, bounding accumulated rounding error.
pub const RESYNC_INTERVAL: usize = 4096;

/// How many boundary values per half a pure median query looks at.
const MEDIAN_WINDOW: usize = 3;

/// `f64` ordered by [`f64::total_cmp`], usable as a map key.
#[derive(Clone, Copy, Debug)]
struct Key(f64);

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Sorted multiset of `f64` values.
#[derive(Clone, Debug, Default)]
struct SortedBag {
    counts: BTreeMap<Key, usize>,
    len: usize,
}

impl SortedBag {
    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn insert(&mut self, v: f64) {
        *self.counts.entry(Key(v)).or_insert(0) += 1;
        self.len += 1;
    }

    fn remove(&mut self, v: f64) -> bool {
        let key = Key(v);
        match self.counts.get_mut(&key) {
            Some(c) if *c > 1 => *c -= 1,
            Some(_) => {
                self.counts.remove(&key);
            }
            None => return false,
        }
        self.len -= 1;
        true
    }

    fn first(&self) -> Option<f64> {
        self.counts.keys().next().map(|k| k.0)
    }

    fn last(&self) -> Option<f64> {
        self.counts.keys().next_back().map(|k| k.0)
    }

    fn pop_first(&mut self) -> Option<f64> {
        let v = self.first()?;
        self.remove(v);
        Some(v)
    }

    fn pop_last(&mut self) -> Option<f64> {
        let v = self.last()?;
        self.remove(v);
        Some(v)
    }

    /// Up to `k` smallest values in ascending order, with multiplicity.
    fn smallest(&self, k: usize) -> Vec<f64> {
        self.counts
            .iter()
            .flat_map(|(key, &c)| std::iter::repeat_n(key.0, c))
            .take(k)
            .collect()
    }

    /// Up to `k` largest values in descending order, with multiplicity.
    fn largest(&self, k: usize) -> Vec<f64> {
        self.counts
            .iter()
            .rev()
            .flat_map(|(key, &c)| std::iter::repeat_n(key.0, c))
            .take(k)
            .collect()
    }
}

#[inline]
fn le(a: f64, b: f64) -> bool {
    a.total_cmp(&b) != Ordering::Greater
}

#[inline]
fn lt(a: f64, b: f64) -> bool {
    a.total_cmp(&b) == Ordering::Less
}

/// Running median of a fixed-size collection of values.
///
/// Values are split into a low half and a high half with every low value
/// `<=` every high value. The low half holds `ceil(n / 2)` values, so the
/// median is the largest low value (odd `n`) or the mean of the largest low
/// and smallest high value (even `n`).
#[derive(Clone, Debug)]
pub struct MedianTracker {
    low: SortedBag,
    high: SortedBag,
}

impl MedianTracker {
    pub fn new(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let split = sorted.len().div_ceil(2);

        let mut low = SortedBag::default();
        let mut high = SortedBag::default();
        for &v in &sorted[..split] {
            low.insert(v);
        }
        for &v in &sorted[split..] {
            high.insert(v);
        }
        Self { low, high }
    }

    pub fn len(&self) -> usize {
        self.low.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.high.is_empty()
    }

    pub fn median(&self) -> f64 {
        match (self.low.last(), self.high.first()) {
            (Some(lo), Some(hi)) if self.len() % 2 == 0 => (lo + hi) / 2.0,
            (Some(lo), _) => lo,
            _ => f64::NAN,
        }
    }

    /// Replaces one occurrence of `old` with `new`.
    ///
    /// The old value is removed from the half holding it and the new value
    /// inserted into the half its value belongs to. When the two halves
    /// differ, exactly one boundary value is moved across to restore the
    /// size invariant.
    pub fn replace(&mut self, old: f64, new: f64) {
        let from_low = self.low.last().is_some_and(|m| le(old, m));
        let removed = if from_low {
            self.low.remove(old)
        } else {
            self.high.remove(old)
        };
        debug_assert!(removed, "value {old} is not tracked");

        let to_low = match (self.low.last(), self.high.first()) {
            (Some(m), _) => le(new, m),
            (None, Some(h)) => le(new, h),
            (None, None) => true,
        };
        if to_low {
            self.low.insert(new);
        } else {
            self.high.insert(new);
        }

        match (from_low, to_low) {
            (true, true) | (false, false) => {}
            // The low half lost a value: borrow the smallest high value.
            (true, false) => {
                if let Some(v) = self.high.pop_first() {
                    self.low.insert(v);
                }
            }
            // The low half gained a value: hand its largest to the high half.
            (false, true) => {
                if let Some(v) = self.low.pop_last() {
                    self.high.insert(v);
                }
            }
        }
        debug_assert!(self.low.len() == self.high.len() || self.low.len() == self.high.len() + 1);
    }

    /// The median after replacing `old` with `new`, without mutating.
    ///
    /// Only the [`MEDIAN_WINDOW`] values on each side of the split can end
    /// up at the median positions after a single replacement, so the query
    /// works on that window and tracks where it sits in the full order.
    pub fn median_after(&self, old: f64, new: f64) -> f64 {
        let n = self.len();
        let mut window = self.low.largest(MEDIAN_WINDOW);
        window.reverse();
        let mut start = self.low.len() - window.len();
        window.extend(self.high.smallest(MEDIAN_WINDOW));

        let touches_bottom = start == 0;
        let touches_top = start + window.len() == n;

        match (window.first().copied(), window.last().copied()) {
            (Some(lo), _) if lt(old, lo) => start -= 1,
            (_, Some(hi)) if lt(hi, old) => {}
            _ => {
                if let Some(pos) = window.iter().position(|v| v.total_cmp(&old).is_eq()) {
                    window.remove(pos);
                }
            }
        }

        let below = !touches_bottom && window.first().is_some_and(|&lo| lt(new, lo));
        let above = !touches_top && window.last().is_some_and(|&hi| lt(hi, new));
        if below {
            start += 1;
        } else if !above {
            let pos = window.partition_point(|&v| le(v, new));
            window.insert(pos, new);
        }

        let at = |rank: usize| rank.checked_sub(start).and_then(|i| window.get(i)).copied();
        let (m1, m2) = ((n - 1) / 2, n / 2);
        match (at(m1), at(m2)) {
            (Some(a), Some(b)) => (a + b) / 2.0,
            _ => {
                let mut copy = self.clone();
                copy.replace(old, new);
                copy.median()
            }
        }
    }
}

/// Cached first and second moments of the two coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Moments {
    x_mean: f64,
    y_mean: f64,
    x_var: f64,
    y_var: f64,
    xy_mean: f64,
}

impl Moments {
    fn compute(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len() as f64;
        let x_mean = stats::mean(xs);
        let y_mean = stats::mean(ys);
        Self {
            x_mean,
            y_mean,
            x_var: xs.iter().map(|x| (x - x_mean).powi(2)).sum::<f64>() / n,
            y_var: ys.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / n,
            xy_mean: xs.iter().zip(ys).map(|(x, y)| x * y).sum::<f64>() / n,
        }
    }

    /// Moments after one value pair changes from `old` to `new`.
    fn shifted(&self, n: f64, old: DVec2, new: DVec2) -> Self {
        let x_mean = self.x_mean - old.x / n + new.x / n;
        let y_mean = self.y_mean - old.y / n + new.y / n;
        let dx = new.x - old.x;
        let dy = new.y - old.y;
        Self {
            x_mean,
            y_mean,
            x_var: self.x_var + dx / n * (new.x + old.x - self.x_mean - x_mean),
            y_var: self.y_var + dy / n * (new.y + old.y - self.y_mean - y_mean),
            xy_mean: self.xy_mean + (new.x * new.y - old.x * old.y) / n,
        }
    }

    fn covariance(&self) -> f64 {
        self.xy_mean - self.x_mean * self.y_mean
    }
}

/// Summary statistics of a point set that supports cheap single-point
/// "what if" queries.
///
/// The tracker owns a copy of the coordinates; its size is fixed at
/// construction. Only [`StatisticsTracker::commit`] mutates it.
#[derive(Clone, Debug)]
pub struct StatisticsTracker {
    xs: Vec<f64>,
    ys: Vec<f64>,
    moments: Moments,
    medians: Option<(MedianTracker, MedianTracker)>,
    commits_since_resync: usize,
}

impl StatisticsTracker {
    /// Seeds a tracker from `points`.
    ///
    /// With `with_median` set, the x and y medians are tracked as well and
    /// reported by every query.
    pub fn new(points: &[DVec2], with_median: bool) -> Self {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let moments = Moments::compute(&xs, &ys);
        let medians = with_median.then(|| (MedianTracker::new(&xs), MedianTracker::new(&ys)));
        Self {
            xs,
            ys,
            moments,
            medians,
            commits_since_resync: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn tracks_median(&self) -> bool {
        self.medians.is_some()
    }

    /// Current position of point `index`.
    pub fn point(&self, index: PointId) -> DVec2 {
        DVec2::new(self.xs[index], self.ys[index])
    }

    /// Statistics of the current values.
    pub fn current(&self) -> SummaryStatistics {
        self.summarize(
            &self.moments,
            self.medians.as_ref().map(|(mx, my)| (mx.median(), my.median())),
        )
    }

    /// Statistics the point set would have if point `index` moved by
    /// `(dx, dy)`. Does not mutate the tracker.
    ///
    /// ### Panics
    /// Panics if `index` is out of bounds.
    pub fn query(&self, index: PointId, dx: f64, dy: f64) -> SummaryStatistics {
        let old = self.point(index);
        let new = old + DVec2::new(dx, dy);
        let moments = self.moments.shifted(self.xs.len() as f64, old, new);
        let medians = self
            .medians
            .as_ref()
            .map(|(mx, my)| (mx.median_after(old.x, new.x), my.median_after(old.y, new.y)));
        self.summarize(&moments, medians)
    }

    /// Moves point `index` by `(dx, dy)`.
    ///
    /// Callers validate the move with [`StatisticsTracker::query`] first;
    /// the committed statistics equal what that query reported.
    ///
    /// ### Panics
    /// Panics if `index` is out of bounds.
    pub fn commit(&mut self, index: PointId, dx: f64, dy: f64) {
        let old = self.point(index);
        let new = old + DVec2::new(dx, dy);
        self.moments = self.moments.shifted(self.xs.len() as f64, old, new);
        if let Some((mx, my)) = self.medians.as_mut() {
            mx.replace(old.x, new.x);
            my.replace(old.y, new.y);
        }
        self.xs[index] = new.x;
        self.ys[index] = new.y;

        self.commits_since_resync += 1;
        if self.commits_since_resync >= RESYNC_INTERVAL {
            self.resync();
        }
    }

    /// Recomputes the cached moments exactly from the owned values.
    pub fn resync(&mut self) {
        let exact = Moments::compute(&self.xs, &self.ys);
        trace!(
            drift_x_mean = (exact.x_mean - self.moments.x_mean).abs(),
            drift_x_var = (exact.x_var - self.moments.x_var).abs(),
            drift_xy_mean = (exact.xy_mean - self.moments.xy_mean).abs(),
            "resynced statistics tracker"
        );
        self.moments = exact;
        self.commits_since_resync = 0;
    }

    fn summarize(&self, m: &Moments, medians: Option<(f64, f64)>) -> SummaryStatistics {
        let n = self.xs.len();
        SummaryStatistics {
            x_mean: m.x_mean,
            y_mean: m.y_mean,
            x_stdev: stats::sample_stdev(m.x_var, n),
            y_stdev: stats::sample_stdev(m.y_var, n),
            correlation: stats::correlation(m.covariance(), m.x_var, m.y_var),
            x_median: medians.map(|(x, _)| x),
            y_median: medians.map(|(_, y)| y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Floors agree, or both values sit within rounding error of the same
    /// floor boundary.
    fn assert_same_floor(label: &str, incremental: f64, exact: f64, decimals: u32) {
        let factor = 10f64.powi(decimals as i32);
        let (a, b) = (incremental * factor, exact * factor);
        if (a.is_nan() && b.is_nan()) || a.floor() == b.floor() {
            return;
        }
        assert!(
            (a - b).abs() < 1e-6 && (b - b.round()).abs() < 1e-6,
            "{label} floors differ at {decimals} decimals: {incremental} vs {exact}"
        );
    }

    fn assert_equivalent(incremental: &SummaryStatistics, exact: &SummaryStatistics) {
        let pairs = incremental.values().zip(exact.values());
        assert_eq!(incremental.values().count(), exact.values().count());
        for (i, (a, b)) in pairs.enumerate() {
            for d in 0..=5 {
                assert_same_floor(&format!("stat {i}"), a, b, d);
            }
        }
    }

    fn random_points(rng: &mut impl Rng, n: usize) -> Vec<DVec2> {
        (0..n)
            .map(|_| DVec2::new(rng.random_range(0.0..100.0), rng.random_range(-40.0..60.0)))
            .collect()
    }

    #[test]
    fn fresh_tracker_matches_full_computation() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = random_points(&mut rng, 50);
        let tracker = StatisticsTracker::new(&points, true);
        assert_equivalent(&tracker.current(), &SummaryStatistics::of(&points, true));
    }

    #[test]
    fn query_matches_recomputation_for_single_moves() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [2, 3, 4, 7, 30, 101] {
            let points = random_points(&mut rng, n);
            let tracker = StatisticsTracker::new(&points, true);
            for _ in 0..50 {
                let index = rng.random_range(0..n);
                let (dx, dy) = (rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));

                let mut moved = points.clone();
                moved[index] += DVec2::new(dx, dy);

                assert_equivalent(
                    &tracker.query(index, dx, dy),
                    &SummaryStatistics::of(&moved, true),
                );
            }
        }
    }

    #[test]
    fn query_does_not_mutate() {
        let points = vec![
            DVec2::new(10.0, 50.0),
            DVec2::new(20.0, 50.0),
            DVec2::new(30.0, 80.0),
        ];
        let tracker = StatisticsTracker::new(&points, true);
        let before = tracker.current();
        let _ = tracker.query(1, 3.0, -2.0);
        assert_eq!(tracker.current(), before);
        assert_eq!(tracker.point(1), DVec2::new(20.0, 50.0));
    }

    #[test]
    fn commits_track_recomputation_over_long_sequences() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut points = random_points(&mut rng, 40);
        let mut tracker = StatisticsTracker::new(&points, true);

        for step in 0..(RESYNC_INTERVAL + 500) {
            let index = rng.random_range(0..points.len());
            let (dx, dy) = (rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));

            let predicted = tracker.query(index, dx, dy);
            tracker.commit(index, dx, dy);
            points[index] += DVec2::new(dx, dy);

            assert_eq!(tracker.point(index), points[index]);
            if step % 97 == 0 {
                assert_equivalent(&predicted, &SummaryStatistics::of(&points, true));
            }
        }
        assert_equivalent(&tracker.current(), &SummaryStatistics::of(&points, true));
    }

    #[test]
    fn commit_reports_what_query_predicted() {
        let points = vec![
            DVec2::new(1.0, 4.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(7.0, 1.0),
            DVec2::new(3.0, 9.0),
        ];
        let mut tracker = StatisticsTracker::new(&points, true);
        let predicted = tracker.query(2, -4.5, 2.25);
        tracker.commit(2, -4.5, 2.25);
        assert_eq!(tracker.current(), predicted);
    }

    #[test]
    fn median_tracker_follows_full_sort() {
        let mut rng = StdRng::seed_from_u64(99);
        for n in [2, 3, 4, 5, 8, 9, 31, 64] {
            // Integer-valued data produces plenty of duplicates.
            let mut values: Vec<f64> = (0..n).map(|_| rng.random_range(0..10) as f64).collect();
            let mut tracker = MedianTracker::new(&values);
            assert_eq!(tracker.median(), stats::median(&values));

            for _ in 0..400 {
                let index = rng.random_range(0..n);
                let old = values[index];
                let new = rng.random_range(-3..13) as f64;

                let predicted = tracker.median_after(old, new);
                tracker.replace(old, new);
                values[index] = new;

                let expected = stats::median(&values);
                assert_eq!(predicted, expected, "query mismatch for n={n}");
                assert_eq!(tracker.median(), expected, "commit mismatch for n={n}");
                assert_eq!(tracker.len(), n);
            }
        }
    }

    #[test]
    fn median_tracker_handles_moves_across_the_split() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let mut tracker = MedianTracker::new(&values);
        assert_eq!(tracker.median(), 2.5);

        // low -> high
        assert_eq!(tracker.median_after(1.0, 10.0), 3.5);
        tracker.replace(1.0, 10.0);
        assert_eq!(tracker.median(), 3.5);

        // high -> low
        assert_eq!(tracker.median_after(10.0, 0.0), 2.5);
        tracker.replace(10.0, 0.0);
        assert_eq!(tracker.median(), 2.5);
    }

    #[test]
    fn resync_keeps_statistics() {
        let points = vec![
            DVec2::new(0.5, 1.0),
            DVec2::new(2.0, -3.0),
            DVec2::new(4.0, 4.5),
        ];
        let mut tracker = StatisticsTracker::new(&points, false);
        tracker.commit(0, 0.25, 0.5);
        let before = tracker.current();
        tracker.resync();
        let after = tracker.current();
        for (a, b) in before.values().zip(after.values()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(!tracker.tracks_median());
    }
}
