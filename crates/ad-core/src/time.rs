//! Simulation time grid (days).

use crate::error::{AdError, AdResult};
use crate::numeric::{Tolerances, nearly_equal};
use crate::units;

/// Strictly increasing day offsets starting at 0.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    days: Vec<f64>,
}

impl TimeGrid {
    pub fn new(days: Vec<f64>) -> AdResult<Self> {
        match days.first() {
            None => {
                return Err(AdError::TimeGrid {
                    what: "grid is empty",
                    index: 0,
                });
            }
            Some(&t0) if t0 != 0.0 => {
                return Err(AdError::TimeGrid {
                    what: "grid must start at day 0",
                    index: 0,
                });
            }
            Some(_) => {}
        }
        for (i, t) in days.iter().enumerate() {
            if !t.is_finite() {
                return Err(AdError::TimeGrid {
                    what: "non-finite time",
                    index: i,
                });
            }
            if i > 0 && *t <= days[i - 1] {
                return Err(AdError::TimeGrid {
                    what: "times must be strictly increasing",
                    index: i,
                });
            }
        }
        Ok(Self { days })
    }

    /// Uniform grid `0, step, 2*step, ...` up to `end_days`.
    ///
    /// Points are computed as `i * step` to avoid accumulated drift. If
    /// `end_days` is not a multiple of `step_days`, it is appended as a
    /// final shorter interval.
    pub fn uniform(end_days: f64, step_days: f64) -> AdResult<Self> {
        if step_days <= 0.0 || !step_days.is_finite() {
            return Err(AdError::InvalidArg {
                what: "step_days must be positive",
            });
        }
        if end_days < 0.0 || !end_days.is_finite() {
            return Err(AdError::InvalidArg {
                what: "end_days must be non-negative",
            });
        }
        let tol = Tolerances::default();
        let n_full = (end_days / step_days + tol.rel).floor() as usize;
        let mut days: Vec<f64> = (0..=n_full).map(|i| i as f64 * step_days).collect();
        if let Some(&last) = days.last()
            && !nearly_equal(last, end_days, tol)
            && last < end_days
        {
            days.push(end_days);
        }
        Self::new(days)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.days
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.days.get(index).copied()
    }

    pub fn end_days(&self) -> f64 {
        self.days.last().copied().unwrap_or(0.0)
    }

    /// Elapsed hours at grid point `index`.
    pub fn hours_at(&self, index: usize) -> Option<f64> {
        self.get(index).map(|d| units::in_hours(units::days(d)))
    }

    /// Consecutive `(index, t_start, t_end)` triples, index of the end point.
    pub fn intervals(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.days
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i + 1, w[0], w[1]))
    }

    /// Step in hours if the grid is uniform.
    pub fn uniform_step_hours(&self) -> Option<f64> {
        let first = self.days.get(1)? - self.days[0];
        let tol = Tolerances::default();
        let uniform = self
            .days
            .windows(2)
            .all(|w| nearly_equal(w[1] - w[0], first, tol));
        uniform.then(|| units::in_hours(units::days(first)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_daily_grid() {
        let grid = TimeGrid::uniform(9.0, 1.0).unwrap();
        assert_eq!(grid.len(), 10);
        assert_eq!(grid.as_slice()[0], 0.0);
        assert_eq!(grid.end_days(), 9.0);
        assert!((grid.uniform_step_hours().unwrap() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_appends_partial_tail() {
        let grid = TimeGrid::uniform(2.5, 1.0).unwrap();
        assert_eq!(grid.as_slice(), &[0.0, 1.0, 2.0, 2.5]);
        assert!(grid.uniform_step_hours().is_none());
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(TimeGrid::new(vec![]).is_err());
        assert!(matches!(
            TimeGrid::new(vec![1.0, 2.0]),
            Err(AdError::TimeGrid { index: 0, .. })
        ));
        assert!(matches!(
            TimeGrid::new(vec![0.0, 1.0, 1.0]),
            Err(AdError::TimeGrid { index: 2, .. })
        ));
        assert!(TimeGrid::new(vec![0.0, f64::NAN]).is_err());
        assert!(TimeGrid::uniform(10.0, 0.0).is_err());
    }

    #[test]
    fn intervals_pair_consecutive_points() {
        let grid = TimeGrid::new(vec![0.0, 0.5, 2.0]).unwrap();
        let iv: Vec<_> = grid.intervals().collect();
        assert_eq!(iv, vec![(1, 0.0, 0.5), (2, 0.5, 2.0)]);
        assert!((grid.hours_at(2).unwrap() - 48.0).abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn uniform_grid_covers_horizon(end in 0.0f64..400.0, step_idx in 0usize..4) {
            let step = [0.25, 0.5, 1.0, 2.0][step_idx];
            let grid = TimeGrid::uniform(end, step).unwrap();
            proptest::prop_assert_eq!(grid.get(0), Some(0.0));
            proptest::prop_assert!((grid.end_days() - end).abs() < 1e-8);
            proptest::prop_assert_eq!(grid.intervals().count(), grid.len() - 1);
            for (_, t0, t1) in grid.intervals() {
                proptest::prop_assert!(t1 > t0 && t1 - t0 <= step + 1e-12);
            }
        }
    }
}
