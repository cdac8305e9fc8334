//! Fixed-step time integrators.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }
}

/// Forward Euler (explicit, 1st order). One rhs call per step.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

/// Integrator selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

/// Covers a grid interval with equal sub-steps no longer than
/// `max_substep_days`.
///
/// The sub-step count depends only on the interval length, so two runs over
/// the same grid perform the same arithmetic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubstepIntegrator {
    pub method: IntegratorType,
    pub max_substep_days: f64,
}

impl Default for SubstepIntegrator {
    fn default() -> Self {
        Self {
            method: IntegratorType::RK4,
            max_substep_days: 5e-4,
        }
    }
}

impl SubstepIntegrator {
    pub fn substeps(&self, span_days: f64) -> usize {
        ((span_days / self.max_substep_days) - 1e-9).ceil().max(1.0) as usize
    }

    /// Integrate from `t0` to `t1` starting at `x`.
    pub fn advance<M: TransientModel>(
        &self,
        model: &mut M,
        t0: f64,
        t1: f64,
        x: &M::State,
    ) -> SimResult<M::State> {
        if !(self.max_substep_days.is_finite() && self.max_substep_days > 0.0) {
            return Err(SimError::InvalidArg {
                what: "max_substep_days must be positive",
            });
        }
        let span = t1 - t0;
        if !(span.is_finite() && span > 0.0) {
            return Err(SimError::InvalidArg {
                what: "interval must have positive length",
            });
        }
        let n = self.substeps(span);
        let h = span / n as f64;
        let mut state = x.clone();
        for k in 0..n {
            let t = t0 + k as f64 * h;
            state = match self.method {
                IntegratorType::RK4 => RK4.step(model, t, &state, h)?,
                IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &state, h)?,
            };
        }
        Ok(state)
    }
}
