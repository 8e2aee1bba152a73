// SPDX: CC0-1.0

//! Validating and sampling a function of one variable over an x range.

use crate::{Number, Point};
use core::{num::NonZeroU16, ops::Range};
use log::{debug, warn};

pub type PlotSeries = Vec<Point<Number>>;

/// Default number of extra attempts at an invalid point before skipping it.
pub const DEFAULT_RETRIES: u16 = 2;

/// Sampling parameters shared by validation and sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampling {
    pub x: Range<Number>,
    pub resolution: NonZeroU16,
    pub retries: u16,
}

impl Sampling {
    pub fn step(&self) -> Number {
        (self.x.end - self.x.start) / Number::from(self.resolution.get())
    }

    /// The `i`th grid position; `resolution` maps exactly to the right end.
    pub fn at(&self, i: u16) -> Number {
        if i >= self.resolution.get() {
            self.x.end
        } else {
            self.x.start + self.step() * Number::from(i)
        }
    }
}

/// Evaluates `f` at `x`, keeping the value only if it is a finite number.
pub fn valid_value<F, E>(f: &mut F, x: Number) -> Option<Number>
where
    F: FnMut(Number) -> Result<Number, E>,
{
    match f(x) {
        Ok(y) if y.is_finite() => Some(y),
        _ => None,
    }
}

pub fn is_valid_at<F, E>(f: &mut F, x: Number) -> bool
where
    F: FnMut(Number) -> Result<Number, E>,
{
    valid_value(f, x).is_some()
}

/// True if `f` is valid at any of the `resolution + 1` evenly spaced points
/// of the range, ends included.
pub fn is_valid<F, E>(mut f: F, sampling: &Sampling) -> bool
where
    F: FnMut(Number) -> Result<Number, E>,
{
    (0..=sampling.resolution.get()).any(|i| is_valid_at(&mut f, sampling.at(i)))
}

/// Samples `f` left to right, leaving out points where it is not valid.
///
/// An invalid point is retried up to `sampling.retries` more times before
/// its step is given up, so the number of calls to `f` is at most
/// `resolution * (retries + 1) + 1`. The right end of the range is always
/// tried last and kept when valid.
pub fn sample<F, E>(mut f: F, sampling: &Sampling) -> PlotSeries
where
    F: FnMut(Number) -> Result<Number, E>,
{
    let n = sampling.resolution.get();
    let mut series = PlotSeries::with_capacity(usize::from(n) + 1);
    let mut skipped = 0usize;

    let mut i = 0;
    let mut attempts = 0;
    while i < n {
        let x = sampling.at(i);
        if let Some(y) = valid_value(&mut f, x) {
            series.push(Point::new(x, y));
        } else if attempts < sampling.retries {
            attempts += 1;
            continue;
        } else {
            skipped += 1;
        }
        i += 1;
        attempts = 0;
    }

    let x = sampling.x.end;
    if let Some(y) = valid_value(&mut f, x) {
        series.push(Point::new(x, y));
    } else {
        skipped += 1;
    }

    if skipped > usize::from(n) {
        warn!("function is undefined everywhere in {:?}", sampling.x);
    }
    debug!(
        "sampled {} points over {:?} ({skipped} undefined)",
        series.len(),
        sampling.x
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sampling(x: Range<Number>, resolution: u16) -> Sampling {
        Sampling {
            x,
            resolution: NonZeroU16::new(resolution).unwrap(),
            retries: DEFAULT_RETRIES,
        }
    }

    fn ok(f: fn(Number) -> Number) -> impl FnMut(Number) -> Result<Number, ()> {
        move |x| Ok(f(x))
    }

    #[test]
    fn test_identity_covers_range() {
        let s = sampling(-10.0..10.0, 100);
        let series = sample(ok(|x| x), &s);
        assert_eq!(series.len(), 101);
        assert_eq!(series[0], Point::new(-10.0, -10.0));
        assert_eq!(series[100], Point::new(10.0, 10.0));
        assert!(series.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn test_reciprocal_omits_zero() {
        let s = sampling(-10.0..10.0, 100);
        let series = sample(ok(|x| 1.0 / x), &s);
        assert!(series.iter().all(|p| p.x != 0.0 && p.y.is_finite()));
        assert_eq!(series.len(), 100);
        assert_eq!(series.last().map(|p| p.x), Some(10.0));
        assert!(is_valid(ok(|x| 1.0 / x), &s));
    }

    #[test]
    fn test_sqrt_keeps_right_half() {
        let s = sampling(-10.0..10.0, 100);
        let series = sample(ok(Number::sqrt), &s);
        assert_eq!(series.first().map(|p| p.x), Some(0.0));
        assert_eq!(series.len(), 51);
    }

    #[test]
    fn test_invalid_everywhere_terminates() {
        let s = sampling(-10.0..10.0, 100);
        let mut calls = 0u32;
        let series = sample(
            |_| {
                calls += 1;
                Err::<Number, _>("undefined")
            },
            &s,
        );
        assert!(series.is_empty());
        assert_eq!(calls, 100 * (u32::from(DEFAULT_RETRIES) + 1) + 1);
    }

    #[test]
    fn test_retry_recovers_flaky_point() {
        let s = Sampling {
            retries: 1,
            ..sampling(0.0..2.0, 2)
        };
        let mut failed_once = false;
        let series = sample(
            |x| {
                if x == 1.0 && !failed_once {
                    failed_once = true;
                    Err(())
                } else {
                    Ok(x)
                }
            },
            &s,
        );
        assert_eq!(series.iter().map(|p| p.x).collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_valid_at_single_point_is_accepted() {
        let s = sampling(-10.0..10.0, 100);
        let f = |x: Number| if x == 10.0 { Ok(1.0) } else { Err(()) };
        assert!(is_valid(f, &s));
        assert!(!is_valid(ok(|_| Number::NAN), &s));
        assert!(!is_valid(ok(|_| Number::INFINITY), &s));
    }

    proptest! {
        #[test]
        fn prop_series_ascending_and_ends_at_right_bound(
            a in -1e3f64..1e3,
            w in 1e-3f64..1e3,
            n in 1u16..500,
            hole in -1e3f64..1e3,
        ) {
            let s = sampling(a..a + w, n);
            let series = sample(|x: Number| if x < hole { Err(()) } else { Ok(x * x) }, &s);
            prop_assert!(series.windows(2).all(|p| p[0].x <= p[1].x));
            if a + w >= hole {
                prop_assert_eq!(series.last().map(|p| p.x), Some(a + w));
            }
        }

        #[test]
        fn prop_is_valid_matches_grid(
            n in 1u16..200,
            lo in -20.0f64..20.0,
            width in 0.0f64..5.0,
        ) {
            // valid only on [lo, lo + width]
            let s = sampling(-10.0..10.0, n);
            let f = |x: Number| if x >= lo && x <= lo + width { Ok(1.0) } else { Err(()) };
            let expected = (0..=n).map(|i| s.at(i)).any(|x| x >= lo && x <= lo + width);
            prop_assert_eq!(is_valid(f, &s), expected);
        }
    }
}
