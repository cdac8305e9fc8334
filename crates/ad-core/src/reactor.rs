//! Digester vessel parameters and liquid-gas exchange.

use crate::chemistry::{COD_PER_MOL_CH4, COD_PER_MOL_H2, Chemistry};
use crate::error::{AdError, AdResult};
use crate::layout::Compartment;

/// Vessel geometry and gas-side operating conditions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactorParams {
    /// Liquid volume (m³)
    pub v_liq_m3: f64,
    /// Headspace volume (m³)
    pub v_gas_m3: f64,
    /// Operating temperature (K)
    pub t_op_k: f64,
    /// Liquid-gas mass transfer coefficient (1/d)
    pub k_la_per_d: f64,
    /// Atmospheric pressure (bar)
    pub p_atm_bar: f64,
}

impl Default for ReactorParams {
    fn default() -> Self {
        Self {
            v_liq_m3: 3_000.0,
            v_gas_m3: 300.0,
            t_op_k: 308.15,
            k_la_per_d: 200.0,
            p_atm_bar: 1.013,
        }
    }
}

/// Transfer rates and resulting gas production for one state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasExchange {
    /// kgCOD/(m³·d)
    pub rho_t_h2: f64,
    /// kgCOD/(m³·d)
    pub rho_t_ch4: f64,
    /// kmolC/(m³·d)
    pub rho_t_co2: f64,
    /// Partial pressures (bar)
    pub p_h2: f64,
    pub p_ch4: f64,
    pub p_co2: f64,
    /// Normalised gas outflow (m³/d)
    pub q_gas: f64,
}

impl ReactorParams {
    pub fn validate(&self) -> AdResult<()> {
        if !(self.v_liq_m3 > 0.0 && self.v_liq_m3.is_finite()) {
            return Err(AdError::InvalidArg {
                what: "liquid volume must be positive",
            });
        }
        if !(self.v_gas_m3 > 0.0 && self.v_gas_m3.is_finite()) {
            return Err(AdError::InvalidArg {
                what: "gas volume must be positive",
            });
        }
        if !(self.t_op_k > 273.15 && self.t_op_k < 373.15) {
            return Err(AdError::InvalidArg {
                what: "operating temperature must be between 0 and 100 °C",
            });
        }
        if !(self.k_la_per_d > 0.0 && self.p_atm_bar > 0.0) {
            return Err(AdError::InvalidArg {
                what: "kLa and atmospheric pressure must be positive",
            });
        }
        Ok(())
    }

    pub fn chemistry(&self) -> Chemistry {
        Chemistry::at_temperature(self.t_op_k)
    }

    /// Normalised gas outflow (m³/d) for the given transfer rates.
    ///
    /// Gas leaves the headspace at the rate it is produced, so no outlet
    /// valve constant enters the balance and the headspace settles at
    /// atmospheric pressure.
    pub fn gas_flow(&self, chem: &Chemistry, rho_t_h2: f64, rho_t_ch4: f64, rho_t_co2: f64) -> f64 {
        let molar_rate = rho_t_h2 / COD_PER_MOL_H2 + rho_t_ch4 / COD_PER_MOL_CH4 + rho_t_co2;
        (chem.rt() / (self.p_atm_bar - chem.p_gas_h2o) * self.v_liq_m3 * molar_rate).max(0.0)
    }

    /// Liquid-gas transfer and gas outflow for a state-ordered slice.
    ///
    /// `s_co2` is the undissociated inorganic carbon (kmol/m³) at the
    /// current pH.
    pub fn gas_exchange(&self, chem: &Chemistry, x: &[f64], s_co2: f64) -> GasExchange {
        let at = |c: Compartment| x.get(c.index()).copied().unwrap_or(0.0);
        let [p_h2, p_ch4, p_co2] = chem.partial_pressures(
            at(Compartment::SGasH2),
            at(Compartment::SGasCh4),
            at(Compartment::SGasCo2),
        );

        let rho_t_h2 =
            self.k_la_per_d * (at(Compartment::SH2) - COD_PER_MOL_H2 * chem.k_h_h2 * p_h2);
        let rho_t_ch4 =
            self.k_la_per_d * (at(Compartment::SCh4) - COD_PER_MOL_CH4 * chem.k_h_ch4 * p_ch4);
        let rho_t_co2 = self.k_la_per_d * (s_co2 - chem.k_h_co2 * p_co2);

        GasExchange {
            rho_t_h2,
            rho_t_ch4,
            rho_t_co2,
            p_h2,
            p_ch4,
            p_co2,
            q_gas: self.gas_flow(chem, rho_t_h2, rho_t_ch4, rho_t_co2),
        }
    }
}
