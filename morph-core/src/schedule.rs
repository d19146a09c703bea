//! Annealing and frame-capture schedules.
//!
//! - [`annealing_value`] — temperature and shake for an iteration.
//! - [`FrameSchedule`] — which iterations are captured as animation frames.

use crate::error::{MorphError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Quadratic ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
pub fn ease_in_sine(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}

#[inline]
pub fn ease_out_sine(t: f64) -> f64 {
    (t * PI / 2.0).sin()
}

#[inline]
pub fn ease_in_out_sine(t: f64) -> f64 {
    -((PI * t).cos() - 1.0) / 2.0
}

/// Value of an annealed parameter at iteration `iteration` of `iterations`.
///
/// Starts at `max` and eases down to just above `min` as the iterations
/// run out.
#[inline]
pub fn annealing_value(iteration: usize, iterations: usize, min: f64, max: f64) -> f64 {
    let progress = (iterations - iteration.min(iterations)) as f64 / iterations as f64;
    (max - min) * ease_in_out_quad(progress) + min
}

/// How frame capture is spread over the iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Frames evenly spaced.
    #[default]
    Linear,
    /// Frames dense at the start.
    In,
    /// Frames dense at the end.
    Out,
    /// Frames dense at both ends.
    InOut,
}

impl Easing {
    pub fn from_flags(ease_in: bool, ease_out: bool) -> Self {
        match (ease_in, ease_out) {
            (true, true) => Self::InOut,
            (true, false) => Self::In,
            (false, true) => Self::Out,
            (false, false) => Self::Linear,
        }
    }

    /// Maps progress in `[0, 1]` to the fraction of iterations done.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::In => ease_in_sine(t),
            Self::Out => ease_out_sine(t),
            Self::InOut => ease_in_out_sine(t),
        }
    }
}

/// The iteration numbers at which frames are captured, in order.
///
/// A value of `0` is the starting data; a value `k > 0` is the state
/// after `k` iterations. Repeated values hold a frame still.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSchedule {
    values: Vec<usize>,
}

impl FrameSchedule {
    /// Largest accepted frame count.
    pub const MAX_FRAMES: usize = 100;
    /// Largest accepted freeze length.
    pub const MAX_FREEZE: usize = 50;

    /// Selects the capture iterations.
    ///
    /// ### Parameters
    /// - `iterations` - Total number of iterations of the run.
    /// - `num_frames` - Frames in the animated part, `1..=100`.
    /// - `freeze_for` - Frames to hold still at the start and at the end,
    ///   `0..=50` and less than `num_frames`.
    /// - `easing` - How captures are spread over the iterations.
    ///
    /// ### Errors
    /// [`MorphError::InvalidConfig`] when a count is out of range.
    pub fn select(
        iterations: usize,
        num_frames: usize,
        freeze_for: usize,
        easing: Easing,
    ) -> Result<Self> {
        if !(1..=Self::MAX_FRAMES).contains(&num_frames) {
            return Err(MorphError::InvalidConfig(format!(
                "num_frames must be in 1..={}, got {num_frames}",
                Self::MAX_FRAMES
            )));
        }
        if freeze_for > Self::MAX_FREEZE || freeze_for >= num_frames {
            return Err(MorphError::InvalidConfig(format!(
                "freeze_for must be in 0..={} and less than num_frames ({num_frames}), \
                 got {freeze_for}",
                Self::MAX_FREEZE
            )));
        }

        let moving = num_frames - freeze_for / 2;
        let mut values = vec![0; freeze_for];
        values.extend((0..moving).map(|k| {
            let t = k as f64 / moving as f64;
            round_half_even(easing.apply(t) * iterations as f64) as usize
        }));
        values.extend(std::iter::repeat_n(iterations, freeze_for));
        Ok(Self { values })
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rounds halves to the nearest even integer.
fn round_half_even(v: f64) -> f64 {
    let r = v.round();
    if (v - v.trunc()).abs() == 0.5 && r % 2.0 != 0.0 {
        r - v.signum()
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn annealing_eases_from_max_to_min() {
        assert_relative_eq!(annealing_value(0, 100, 0.3, 1.0), 1.0);
        assert_relative_eq!(annealing_value(50, 100, 0.3, 1.0), 0.65, epsilon = 1e-12);
        assert_relative_eq!(annealing_value(100, 100, 0.3, 1.0), 0.3);

        let mut last = f64::INFINITY;
        for i in 0..100 {
            let v = annealing_value(i, 100, 0.0, 0.4);
            assert!(v <= last);
            last = v;
        }
    }

    #[test]
    fn ease_in_out_quad_is_symmetric() {
        for t in [0.1, 0.25, 0.4] {
            assert_relative_eq!(
                ease_in_out_quad(t) + ease_in_out_quad(1.0 - t),
                1.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn round_half_even_ties() {
        assert_eq!(round_half_even(0.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(2.6), 3.0);
    }

    fn schedule(easing: Easing) -> Vec<usize> {
        FrameSchedule::select(20, 10, 2, easing).unwrap().values().to_vec()
    }

    #[test]
    fn frame_selection_by_easing() {
        let tail = [20, 20];
        let head = [0, 0];
        let with_freeze = |middle: &[usize]| [&head[..], middle, &tail[..]].concat();

        assert_eq!(schedule(Easing::InOut), with_freeze(&[0, 1, 2, 5, 8, 12, 15, 18, 19]));
        assert_eq!(schedule(Easing::In), with_freeze(&[0, 0, 1, 3, 5, 7, 10, 13, 17]));
        assert_eq!(schedule(Easing::Out), with_freeze(&[0, 3, 7, 10, 13, 15, 17, 19, 20]));
        assert_eq!(schedule(Easing::Linear), with_freeze(&[0, 2, 4, 7, 9, 11, 13, 16, 18]));
    }

    #[test]
    fn frame_selection_validates_counts() {
        assert!(FrameSchedule::select(10, 0, 0, Easing::Linear).is_err());
        assert!(FrameSchedule::select(10, 101, 0, Easing::Linear).is_err());
        assert!(FrameSchedule::select(10, 10, 51, Easing::Linear).is_err());
        assert!(FrameSchedule::select(10, 5, 5, Easing::Linear).is_err());
        let s = FrameSchedule::select(10, 1, 0, Easing::Linear).unwrap();
        assert_eq!(s.values(), &[0]);
        assert_eq!(s.len(), 1);
    }
}
