//! Per-slot feed rates.

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, FeedResult};

/// One configured substrate slot of the feeding system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSlot {
    pub substrate_id: String,
    /// Whether the feeding system can dose this substrate at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FeedSlot {
    pub fn new(substrate_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            substrate_id: substrate_id.into(),
            enabled,
        }
    }
}

/// Volumetric flow (m³/d) per slot, validated against the slot list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPlan {
    rates: Vec<f64>,
}

impl FeedPlan {
    pub fn new(slots: &[FeedSlot], rates: Vec<f64>) -> FeedResult<Self> {
        if rates.len() != slots.len() {
            return Err(FeedError::SlotCount {
                expected: slots.len(),
                actual: rates.len(),
            });
        }
        for (slot, (&value, def)) in rates.iter().zip(slots).enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(FeedError::InvalidRate { slot, value });
            }
            if !def.enabled && value != 0.0 {
                return Err(FeedError::DisabledSlot {
                    slot,
                    substrate_id: def.substrate_id.clone(),
                    value,
                });
            }
        }
        Ok(Self { rates })
    }

    /// All-zero plan for `slots`.
    pub fn idle(slots: &[FeedSlot]) -> Self {
        Self {
            rates: vec![0.0; slots.len()],
        }
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Total flow (m³/d).
    pub fn total(&self) -> f64 {
        self.rates.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Vec<FeedSlot> {
        vec![
            FeedSlot::new("maize", true),
            FeedSlot::new("manure", true),
            FeedSlot::new("grain", false),
        ]
    }

    #[test]
    fn accepts_enabled_flows() {
        let plan = FeedPlan::new(&slots(), vec![15.0, 10.0, 0.0]).unwrap();
        assert_eq!(plan.total(), 25.0);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            FeedPlan::new(&slots(), vec![1.0]),
            Err(FeedError::SlotCount {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(matches!(
            FeedPlan::new(&slots(), vec![-1.0, 0.0, 0.0]),
            Err(FeedError::InvalidRate { slot: 0, .. })
        ));
        assert!(FeedPlan::new(&slots(), vec![0.0, f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn rejects_flow_on_disabled_slot() {
        let err = FeedPlan::new(&slots(), vec![0.0, 0.0, 2.0]).unwrap_err();
        match err {
            FeedError::DisabledSlot {
                slot, substrate_id, ..
            } => {
                assert_eq!(slot, 2);
                assert_eq!(substrate_id, "grain");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
