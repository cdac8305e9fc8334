//! Fixed-dimension reactor state.

use core::ops::Index;

use crate::error::{AdError, AdResult};
use crate::layout::{Compartment, STATE_DIM};

/// Snapshot of every tracked compartment.
///
/// The length is checked once at construction and can never change
/// afterwards; arithmetic helpers always return a state of the same shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactorState {
    values: Vec<f64>,
}

impl ReactorState {
    pub fn from_vec(values: Vec<f64>) -> AdResult<Self> {
        if values.len() != STATE_DIM {
            return Err(AdError::ShapeMismatch {
                what: "reactor state",
                expected: STATE_DIM,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn from_slice(values: &[f64]) -> AdResult<Self> {
        Self::from_vec(values.to_vec())
    }

    pub fn zeros() -> Self {
        Self {
            values: vec![0.0; STATE_DIM],
        }
    }

    /// Copy with one compartment replaced.
    pub fn with(mut self, compartment: Compartment, value: f64) -> Self {
        self.values[compartment.index()] = value;
        self
    }

    #[inline]
    pub fn get(&self, compartment: Compartment) -> f64 {
        self.values[compartment.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn zip_map(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// First compartment that is non-finite or below `-negative_tol`.
    pub fn first_out_of_domain(&self, negative_tol: f64) -> Option<(Compartment, f64)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < -negative_tol)
            .and_then(|(i, v)| Compartment::from_index(i).map(|c| (c, *v)))
    }

    /// Bitwise equality, distinguishing `-0.0` from `0.0`.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.values
            .iter()
            .zip(&other.values)
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Index<Compartment> for ReactorState {
    type Output = f64;

    fn index(&self, compartment: Compartment) -> &f64 {
        &self.values[compartment.index()]
    }
}
