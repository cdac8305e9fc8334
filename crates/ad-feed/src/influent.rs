//! Model-ready influent for a feeding window.

use ad_core::chemistry::Chemistry;
use ad_core::layout::{INFLUENT_DIM, LIQUID_DIM, Q_INDEX};
use ad_substrates::{ParamGroup, SubstrateDatabase, Symbol};
use tracing::debug;

use crate::conversion::{SubstrateStream, substrate_stream};
use crate::error::{FeedError, FeedResult};
use crate::plan::{FeedPlan, FeedSlot};
use crate::schedule::{FeedSchedule, FeedingInterval};

/// First-order and uptake rate constants (1/d) in force for a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticParams {
    pub kdis: f64,
    pub khyd_ch: f64,
    pub khyd_pr: f64,
    pub khyd_li: f64,
    pub km_c4: f64,
    pub km_pro: f64,
    pub km_ac: f64,
    pub km_h2: f64,
}

impl Default for KineticParams {
    fn default() -> Self {
        Self {
            kdis: 0.5,
            khyd_ch: 10.0,
            khyd_pr: 10.0,
            khyd_li: 10.0,
            km_c4: 20.0,
            km_pro: 13.0,
            km_ac: 8.0,
            km_h2: 35.0,
        }
    }
}

impl KineticParams {
    fn slot(&mut self, symbol: Symbol) -> Option<&mut f64> {
        match symbol {
            Symbol::Kdis => Some(&mut self.kdis),
            Symbol::KhydCh => Some(&mut self.khyd_ch),
            Symbol::KhydPr => Some(&mut self.khyd_pr),
            Symbol::KhydLi => Some(&mut self.khyd_li),
            Symbol::KmC4 => Some(&mut self.km_c4),
            Symbol::KmPro => Some(&mut self.km_pro),
            Symbol::KmAc => Some(&mut self.km_ac),
            Symbol::KmH2 => Some(&mut self.km_h2),
            _ => None,
        }
    }

    pub fn get(&self, symbol: Symbol) -> Option<f64> {
        let v = match symbol {
            Symbol::Kdis => self.kdis,
            Symbol::KhydCh => self.khyd_ch,
            Symbol::KhydPr => self.khyd_pr,
            Symbol::KhydLi => self.khyd_li,
            Symbol::KmC4 => self.km_c4,
            Symbol::KmPro => self.km_pro,
            Symbol::KmAc => self.km_ac,
            Symbol::KmH2 => self.km_h2,
            _ => return None,
        };
        Some(v)
    }
}

/// Influent vector plus the kinetic constants of the mixed feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Influent {
    /// Liquid concentrations followed by total flow (m³/d) at [`Q_INDEX`].
    pub values: Vec<f64>,
    pub kinetics: KineticParams,
}

impl Influent {
    /// No feed: zero flow and zero concentrations.
    pub fn idle() -> Self {
        Self {
            values: vec![0.0; INFLUENT_DIM],
            kinetics: KineticParams::default(),
        }
    }

    pub fn flow(&self) -> f64 {
        self.values[Q_INDEX]
    }

    pub fn concentrations(&self) -> &[f64] {
        &self.values[..LIQUID_DIM]
    }
}

/// Turns feed plans into influent.
///
/// The substrate database is read once, at construction; afterwards the
/// builder only mixes precomputed per-slot streams, so influent for a given
/// plan is a pure function of that plan.
#[derive(Debug, Clone)]
pub struct InfluentBuilder {
    interval: FeedingInterval,
    streams: Vec<SubstrateStream>,
}

impl InfluentBuilder {
    pub fn new(
        db: &SubstrateDatabase,
        slots: &[FeedSlot],
        interval: FeedingInterval,
        chem: &Chemistry,
    ) -> FeedResult<Self> {
        let streams = slots
            .iter()
            .map(|slot| Ok(substrate_stream(db.get(&slot.substrate_id)?, chem)))
            .collect::<FeedResult<Vec<_>>>()?;
        Ok(Self { interval, streams })
    }

    pub fn interval(&self) -> FeedingInterval {
        self.interval
    }

    pub fn slot_count(&self) -> usize {
        self.streams.len()
    }

    /// Flow-weighted mix of the slot streams.
    pub fn mix(&self, plan: &FeedPlan) -> FeedResult<Influent> {
        if plan.len() != self.streams.len() {
            return Err(FeedError::SlotCount {
                expected: self.streams.len(),
                actual: plan.len(),
            });
        }
        let q_total = plan.total();
        if q_total <= 0.0 {
            return Ok(Influent::idle());
        }

        let mut values = vec![0.0; INFLUENT_DIM];
        for (stream, &q) in self.streams.iter().zip(plan.rates()) {
            if q == 0.0 {
                continue;
            }
            let w = q / q_total;
            for (v, c) in values.iter_mut().zip(&stream.concentrations) {
                *v += w * c;
            }
        }
        values[Q_INDEX] = q_total;

        Ok(Influent {
            values,
            kinetics: self.mix_kinetics(plan),
        })
    }

    fn mix_kinetics(&self, plan: &FeedPlan) -> KineticParams {
        let mut params = KineticParams::default();
        for symbol in Symbol::in_group(ParamGroup::Kinetic) {
            let (weighted, flow) = self
                .streams
                .iter()
                .zip(plan.rates())
                .filter(|(_, q)| **q > 0.0)
                .filter_map(|(s, &q)| {
                    s.kinetics
                        .iter()
                        .find(|(sym, _)| *sym == symbol)
                        .map(|&(_, v)| (q * v, q))
                })
                .fold((0.0, 0.0), |(a, b), (x, y)| (a + x, b + y));
            if let Some(slot) = params.slot(symbol) {
                if flow > 0.0 {
                    *slot = weighted / flow;
                } else {
                    debug!(%symbol, value = *slot, "no fed substrate declares rate, using default");
                }
            }
        }
        params
    }

    /// Influent in force during feeding window `window`.
    pub fn influent_for_window(
        &self,
        schedule: &FeedSchedule,
        window: usize,
    ) -> FeedResult<Influent> {
        self.mix(schedule.plan_for_window(window))
    }

    /// Influent for grid step `step_index` on a uniform grid of `step_hours`.
    ///
    /// Steps whose elapsed time falls in the same feeding window receive
    /// identical influent.
    pub fn build_influent(
        &self,
        schedule: &FeedSchedule,
        step_index: usize,
        step_hours: f64,
    ) -> FeedResult<Influent> {
        self.influent_for_window(schedule, self.interval.window_at_step(step_index, step_hours))
    }

    /// Influent at an arbitrary elapsed time.
    pub fn influent_at_hours(
        &self,
        schedule: &FeedSchedule,
        elapsed_hours: f64,
    ) -> FeedResult<Influent> {
        self.influent_for_window(schedule, self.interval.window_at_hours(elapsed_hours))
    }
}
