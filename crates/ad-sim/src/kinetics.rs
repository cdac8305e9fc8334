//! Kinetics seam and the fed-reactor model that binds it to an influent.

use ad_core::ReactorState;
use ad_feed::Influent;

use crate::error::SimResult;
use crate::model::TransientModel;

/// Biochemical right-hand side of a continuously fed digester.
///
/// Implementations must be pure: the same `(t, state, influent)` always
/// yields the same derivative.
pub trait Kinetics {
    fn derivatives(&self, t: f64, state: &ReactorState, influent: &Influent)
    -> SimResult<ReactorState>;
}

/// Reactor fed with a fixed influent over one grid interval.
pub struct FedReactor<'a, K: Kinetics> {
    kinetics: &'a K,
    influent: &'a Influent,
}

impl<'a, K: Kinetics> FedReactor<'a, K> {
    pub fn new(kinetics: &'a K, influent: &'a Influent) -> Self {
        Self { kinetics, influent }
    }
}

impl<K: Kinetics> TransientModel for FedReactor<'_, K> {
    type State = ReactorState;

    fn rhs(&mut self, t: f64, x: &ReactorState) -> SimResult<ReactorState> {
        self.kinetics.derivatives(t, x, self.influent)
    }

    fn add(&self, a: &ReactorState, b: &ReactorState) -> ReactorState {
        a.zip_map(b, |x, y| x + y)
    }

    fn scale(&self, a: &ReactorState, scale: f64) -> ReactorState {
        a.map(|x| x * scale)
    }
}
