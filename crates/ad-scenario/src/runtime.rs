//! Turns a validated scenario into the values the simulator consumes.

use std::path::Path;

use ad_core::{ReactorParams, TimeGrid, units};
use ad_feed::{FeedSchedule, FeedSlot, FeedingInterval};

use crate::ScenarioResult;
use crate::schema::Scenario;

impl Scenario {
    pub fn reactor_params(&self) -> ReactorParams {
        let r = &self.reactor;
        ReactorParams {
            v_liq_m3: units::in_m3(units::m3(r.v_liq_m3)),
            v_gas_m3: units::in_m3(units::m3(r.v_gas_m3)),
            t_op_k: r.temperature_k,
            k_la_per_d: r.k_la_per_d,
            p_atm_bar: r.p_atm_bar,
        }
    }

    pub fn feeding_interval(&self) -> ScenarioResult<FeedingInterval> {
        Ok(FeedingInterval::from_hours(self.feed.interval_hours)?)
    }

    /// Feeding interval expressed in days.
    pub fn interval_days(&self) -> f64 {
        units::in_days(units::hours(self.feed.interval_hours))
    }

    pub fn feed_slots(&self) -> &[FeedSlot] {
        &self.feed.slots
    }

    pub fn feed_schedule(&self) -> ScenarioResult<FeedSchedule> {
        Ok(FeedSchedule::from_rates(
            self.feed.slots.clone(),
            self.feed.windows.clone(),
        )?)
    }

    pub fn time_grid(&self) -> ScenarioResult<TimeGrid> {
        Ok(TimeGrid::uniform(self.time.end_days, self.time.step_days)?)
    }

    /// Make relative file references absolute with respect to `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if self.substrates.is_relative() {
            self.substrates = base_dir.join(&self.substrates);
        }
        if let Some(initial) = self.initial_state.as_mut()
            && initial.is_relative()
        {
            *initial = base_dir.join(&*initial);
        }
    }
}
