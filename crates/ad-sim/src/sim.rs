//! Simulation runner and result recording.

use ad_core::units;
use ad_core::{ReactorState, TimeGrid};
use ad_feed::{FeedSchedule, Influent, InfluentBuilder};
use tracing::{debug, info, warn};

use crate::error::{Divergence, SimError, SimResult};
use crate::integrator::SubstepIntegrator;
use crate::kinetics::{FedReactor, Kinetics};
use crate::trace::{SimulationTrace, TraceSink};

/// Options for simulation runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimOptions {
    /// Sub-division policy applied to every grid interval.
    pub integrator: SubstepIntegrator,
    /// Emit a progress event every N completed steps (0 disables).
    pub progress_every: usize,
    /// Entries below `-negative_tol` are out of domain.
    pub negative_tol: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            integrator: SubstepIntegrator::default(),
            progress_every: 100,
            negative_tol: 1e-10,
        }
    }
}

/// Advisory progress signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    /// Completed steps.
    pub step: usize,
    pub total: usize,
    pub time_days: f64,
}

/// Driver lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    Ready,
    /// Interval ending at grid index `i` is being integrated.
    Stepping(usize),
    /// State `i` has been recorded.
    Advanced(usize),
    Diverged(usize),
    Complete,
}

/// Marches a time grid, feeding the kinetics piecewise-constant influent.
pub struct Simulator<K: Kinetics> {
    kinetics: K,
    builder: InfluentBuilder,
    options: SimOptions,
    phase: RunPhase,
}

fn emit_progress(progress: &mut Option<&mut dyn FnMut(SimProgress)>, event: SimProgress) {
    if let Some(cb) = progress.as_deref_mut() {
        cb(event);
    }
}

impl<K: Kinetics> Simulator<K> {
    pub fn new(kinetics: K, builder: InfluentBuilder, options: SimOptions) -> Self {
        Self {
            kinetics,
            builder,
            options,
            phase: RunPhase::Ready,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    pub fn kinetics(&self) -> &K {
        &self.kinetics
    }

    pub fn builder(&self) -> &InfluentBuilder {
        &self.builder
    }

    /// Advance `state` over `(t0, t1)` (days) with the influent in force at `t0`.
    pub fn step(
        &self,
        state: &ReactorState,
        interval: (f64, f64),
        schedule: &FeedSchedule,
    ) -> SimResult<ReactorState> {
        let (t0, t1) = interval;
        let influent = self
            .builder
            .influent_at_hours(schedule, units::in_hours(units::days(t0)))?;
        self.advance(state, t0, t1, &influent)
    }

    fn advance(
        &self,
        state: &ReactorState,
        t0: f64,
        t1: f64,
        influent: &Influent,
    ) -> SimResult<ReactorState> {
        let mut model = FedReactor::new(&self.kinetics, influent);
        self.options.integrator.advance(&mut model, t0, t1, state)
    }

    /// Run the whole grid and keep every state in memory.
    ///
    /// On divergence the recorded prefix travels in [`Divergence::partial`].
    pub fn run(
        &mut self,
        grid: &TimeGrid,
        initial: &ReactorState,
        schedule: &FeedSchedule,
    ) -> SimResult<SimulationTrace> {
        let mut trace = SimulationTrace::with_capacity(grid.len());
        match self.run_into(grid, initial, schedule, &mut trace, None) {
            Ok(()) => Ok(trace),
            Err(SimError::Divergence(mut d)) => {
                d.partial = Some(trace);
                Err(SimError::Divergence(d))
            }
            Err(e) => Err(e),
        }
    }

    /// Run the grid, handing each recorded state to `sink` in grid order.
    pub fn run_into<S: TraceSink>(
        &mut self,
        grid: &TimeGrid,
        initial: &ReactorState,
        schedule: &FeedSchedule,
        sink: &mut S,
        mut progress: Option<&mut dyn FnMut(SimProgress)>,
    ) -> SimResult<()> {
        self.phase = RunPhase::Ready;
        if schedule.slots().len() != self.builder.slot_count() {
            return Err(SimError::InvalidArg {
                what: "schedule slots do not match the influent builder",
            });
        }
        let total = grid.len().saturating_sub(1);
        let t_start = grid.get(0).unwrap_or(0.0);
        info!(
            steps = total,
            end_days = grid.end_days(),
            interval_h = self.builder.interval().hours(),
            "starting simulation"
        );

        if let Some(reason) = self.out_of_domain(initial) {
            return Err(self.diverge(0, t_start, reason, None));
        }
        sink.record(0, t_start, initial)?;
        self.phase = RunPhase::Advanced(0);

        let mut state = initial.clone();
        let mut current_window: Option<usize> = None;
        let mut influent = Influent::idle();
        for (i, t0, t1) in grid.intervals() {
            self.phase = RunPhase::Stepping(i);

            let window = self
                .builder
                .interval()
                .window_at_hours(units::in_hours(units::days(t0)));
            if current_window != Some(window) {
                influent = self.builder.influent_for_window(schedule, window)?;
                debug!(window, flow = influent.flow(), t_days = t0, "feeding window");
                current_window = Some(window);
            }

            let next = match self.advance(&state, t0, t1, &influent) {
                Ok(next) => next,
                Err(e) => return Err(self.diverge(i, t1, e.to_string(), Some(state))),
            };
            if let Some(reason) = self.out_of_domain(&next) {
                return Err(self.diverge(i, t1, reason, Some(state)));
            }

            sink.record(i, t1, &next)?;
            state = next;
            self.phase = RunPhase::Advanced(i);

            let every = self.options.progress_every;
            if every > 0 && (i % every == 0 || i == total) {
                info!(step = i, total, t_days = t1, "simulation progress");
                emit_progress(
                    &mut progress,
                    SimProgress {
                        step: i,
                        total,
                        time_days: t1,
                    },
                );
            }
        }

        sink.finish()?;
        self.phase = RunPhase::Complete;
        info!(steps = total, "simulation complete");
        Ok(())
    }

    fn out_of_domain(&self, state: &ReactorState) -> Option<String> {
        state
            .first_out_of_domain(self.options.negative_tol)
            .map(|(c, v)| format!("{} = {v} is out of domain", c.name()))
    }

    fn diverge(
        &mut self,
        index: usize,
        time_days: f64,
        reason: String,
        last_valid: Option<ReactorState>,
    ) -> SimError {
        self.phase = RunPhase::Diverged(index);
        warn!(index, time_days, %reason, "simulation diverged");
        SimError::Divergence(Box::new(Divergence {
            index,
            time_days,
            reason,
            last_valid,
            partial: None,
        }))
    }
}
