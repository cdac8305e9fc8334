//! Scenario schema definitions.

use std::path::PathBuf;

use ad_core::ReactorParams;
use ad_feed::FeedSlot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    /// Substrate definition document.
    pub substrates: PathBuf,
    #[serde(default)]
    pub reactor: ReactorDef,
    pub feed: FeedDef,
    pub time: TimeDef,
    /// Checkpoint to start from; the run needs one from somewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<PathBuf>,
    #[serde(default)]
    pub integrator: IntegratorDef,
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

fn default_progress_every() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReactorDef {
    pub v_liq_m3: f64,
    pub v_gas_m3: f64,
    pub temperature_k: f64,
    pub k_la_per_d: f64,
    pub p_atm_bar: f64,
}

impl Default for ReactorDef {
    fn default() -> Self {
        let p = ReactorParams::default();
        Self {
            v_liq_m3: p.v_liq_m3,
            v_gas_m3: p.v_gas_m3,
            temperature_k: p.t_op_k,
            k_la_per_d: p.k_la_per_d,
            p_atm_bar: p.p_atm_bar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedDef {
    pub interval_hours: f64,
    pub slots: Vec<FeedSlot>,
    /// Rates (m³/d) per feeding window; the last list is held afterwards.
    #[serde(default)]
    pub windows: Vec<Vec<f64>>,
    /// Version 1 single rate list, folded into `windows` on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeDef {
    pub end_days: f64,
    pub step_days: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntegratorMethod {
    #[default]
    RK4,
    ForwardEuler,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntegratorDef {
    pub method: IntegratorMethod,
    pub max_substep_days: f64,
}

impl Default for IntegratorDef {
    fn default() -> Self {
        Self {
            method: IntegratorMethod::RK4,
            max_substep_days: 5e-4,
        }
    }
}
