//! Recorded simulation states.

use ad_core::ReactorState;

use crate::error::SimResult;

/// Receives recorded states in grid order.
pub trait TraceSink {
    fn record(&mut self, index: usize, time_days: f64, state: &ReactorState) -> SimResult<()>;

    /// Called once after the last record of a successful run.
    fn finish(&mut self) -> SimResult<()> {
        Ok(())
    }
}

/// Full in-memory trace; `states[i]` belongs to `times[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationTrace {
    pub times: Vec<f64>,
    pub states: Vec<ReactorState>,
}

impl SimulationTrace {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            states: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&ReactorState> {
        self.states.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &ReactorState)> {
        self.times.iter().copied().zip(self.states.iter())
    }

    /// Bitwise equality of times and states.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .times
                .iter()
                .zip(&other.times)
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self
                .states
                .iter()
                .zip(&other.states)
                .all(|(a, b)| a.bit_eq(b))
    }
}

impl TraceSink for SimulationTrace {
    fn record(&mut self, _index: usize, time_days: f64, state: &ReactorState) -> SimResult<()> {
        self.times.push(time_days);
        self.states.push(state.clone());
        Ok(())
    }
}

/// Holds up to `capacity` states and forwards them to `inner` in order.
///
/// Keeps the most recent state after flushing so a run's tail can always be
/// checkpointed.
pub struct BufferedTrace<S: TraceSink> {
    inner: S,
    capacity: usize,
    pending: Vec<(usize, f64, ReactorState)>,
    last: Option<(f64, ReactorState)>,
    recorded: usize,
    flushes: usize,
}

impl<S: TraceSink> BufferedTrace<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            capacity,
            pending: Vec::with_capacity(capacity),
            last: None,
            recorded: 0,
            flushes: 0,
        }
    }

    pub fn flush(&mut self) -> SimResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        for (index, t, state) in self.pending.drain(..) {
            self.inner.record(index, t, &state)?;
        }
        self.flushes += 1;
        Ok(())
    }

    pub fn last_state(&self) -> Option<&ReactorState> {
        self.last.as_ref().map(|(_, s)| s)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.last.as_ref().map(|(t, _)| *t)
    }

    /// States recorded so far, flushed or not.
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Flush and hand back the inner sink.
    pub fn into_inner(mut self) -> SimResult<S> {
        self.flush()?;
        Ok(self.inner)
    }
}

impl<S: TraceSink> TraceSink for BufferedTrace<S> {
    fn record(&mut self, index: usize, time_days: f64, state: &ReactorState) -> SimResult<()> {
        self.pending.push((index, time_days, state.clone()));
        self.last = Some((time_days, state.clone()));
        self.recorded += 1;
        if self.pending.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> SimResult<()> {
        self.flush()?;
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::Compartment;

    fn state(v: f64) -> ReactorState {
        ReactorState::zeros().with(Compartment::SAc, v)
    }

    #[test]
    fn buffered_trace_flushes_in_order() {
        let mut buf = BufferedTrace::new(SimulationTrace::default(), 3);
        for i in 0..7 {
            buf.record(i, i as f64, &state(i as f64)).unwrap();
        }
        assert_eq!(buf.inner().len(), 6);
        assert_eq!(buf.pending(), 1);
        assert_eq!(buf.flushes(), 2);
        assert_eq!(buf.last_state().unwrap()[Compartment::SAc], 6.0);

        buf.finish().unwrap();
        let trace = buf.into_inner().unwrap();
        assert_eq!(trace.times, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(trace.last().unwrap()[Compartment::SAc], 6.0);
    }

    #[test]
    fn bit_eq_distinguishes_signed_zero() {
        let mut a = SimulationTrace::default();
        let mut b = SimulationTrace::default();
        a.record(0, 0.0, &state(0.0)).unwrap();
        b.record(0, 0.0, &state(-0.0)).unwrap();
        assert_eq!(a, b);
        assert!(!a.bit_eq(&b));
    }
}
