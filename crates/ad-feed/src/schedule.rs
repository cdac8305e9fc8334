//! Feeding windows.
//!
//! The feeding system may only change its dosing at multiples of the
//! feeding interval. Between boundaries the plan is held (zero-order hold).

use ad_core::numeric::snapped_floor_div;
use ad_core::units::{self, Time};

use crate::error::{FeedError, FeedResult};
use crate::plan::{FeedPlan, FeedSlot};

/// Relative tolerance used to snap elapsed time onto a window boundary.
const BOUNDARY_REL_TOL: f64 = 1e-9;

/// Period at which feed composition may change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedingInterval {
    period: Time,
}

impl FeedingInterval {
    pub fn from_hours(hours: f64) -> FeedResult<Self> {
        if !(hours.is_finite() && hours > 0.0) {
            return Err(FeedError::InvalidInterval { hours });
        }
        Ok(Self {
            period: units::hours(hours),
        })
    }

    pub fn hours(&self) -> f64 {
        units::in_hours(self.period)
    }

    pub fn days(&self) -> f64 {
        units::in_days(self.period)
    }

    /// Window containing `elapsed_hours`. Boundaries belong to the later
    /// window, so hour 48 with a 48 h interval is window 1.
    pub fn window_at_hours(&self, elapsed_hours: f64) -> usize {
        let w = snapped_floor_div(elapsed_hours.max(0.0), self.hours(), BOUNDARY_REL_TOL);
        w as usize
    }

    /// Window of grid step `step_index` on a uniform grid of `step_hours`.
    pub fn window_at_step(&self, step_index: usize, step_hours: f64) -> usize {
        self.window_at_hours(step_index as f64 * step_hours)
    }

    /// Elapsed hours at which `window` starts.
    pub fn window_start_hours(&self, window: usize) -> f64 {
        window as f64 * self.hours()
    }
}

/// One plan per feeding window; the last plan stays in force afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSchedule {
    slots: Vec<FeedSlot>,
    plans: Vec<FeedPlan>,
}

impl FeedSchedule {
    pub fn new(slots: Vec<FeedSlot>, plans: Vec<FeedPlan>) -> FeedResult<Self> {
        if plans.is_empty() {
            return Err(FeedError::EmptySchedule);
        }
        if let Some(bad) = plans.iter().find(|p| p.len() != slots.len()) {
            return Err(FeedError::SlotCount {
                expected: slots.len(),
                actual: bad.len(),
            });
        }
        Ok(Self { slots, plans })
    }

    /// Build from raw per-window rate lists, validating each against `slots`.
    pub fn from_rates(slots: Vec<FeedSlot>, windows: Vec<Vec<f64>>) -> FeedResult<Self> {
        let plans = windows
            .into_iter()
            .map(|rates| FeedPlan::new(&slots, rates))
            .collect::<FeedResult<Vec<_>>>()?;
        Self::new(slots, plans)
    }

    /// Same plan in every window.
    pub fn constant(slots: Vec<FeedSlot>, plan: FeedPlan) -> FeedResult<Self> {
        Self::new(slots, vec![plan])
    }

    pub fn slots(&self) -> &[FeedSlot] {
        &self.slots
    }

    pub fn plans(&self) -> &[FeedPlan] {
        &self.plans
    }

    pub fn plan_for_window(&self, window: usize) -> &FeedPlan {
        let last = self.plans.len() - 1;
        &self.plans[window.min(last)]
    }

    /// First window from which the plan no longer changes.
    pub fn settled_window(&self) -> usize {
        self.plans.len() - 1
    }
}
