//! TransientModel trait for pluggable dynamic systems.

use crate::error::SimResult;

/// Right-hand side of `dx/dt = f(t, x)` plus the vector-space operations an
/// explicit integrator needs.
pub trait TransientModel {
    type State: Clone;

    /// State derivative at `(t, x)`.
    ///
    /// Takes `&mut self` so models may cache between evaluations.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Element-wise `a + b`.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
