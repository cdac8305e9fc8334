//! Acid-base and gas-phase equilibria at the operating temperature.
//!
//! Constants follow the ADM1 benchmark (BSM2) parameter set with van't Hoff
//! temperature correction from 25 °C.

use crate::layout::Compartment;

/// Universal gas constant, bar·m³/(kmol·K).
pub const R_GAS: f64 = 0.083145;

/// Reference temperature for equilibrium constants, K.
pub const T_BASE_K: f64 = 298.15;

/// COD-to-mole factors for the volatile fatty acids, kgCOD/kmol.
pub const COD_PER_MOL_AC: f64 = 64.0;
pub const COD_PER_MOL_PRO: f64 = 112.0;
pub const COD_PER_MOL_BU: f64 = 160.0;
pub const COD_PER_MOL_VA: f64 = 208.0;
pub const COD_PER_MOL_H2: f64 = 16.0;
pub const COD_PER_MOL_CH4: f64 = 64.0;

const LOG_SH_MIN: f64 = -14.0;
const LOG_SH_MAX: f64 = 0.0;
const BISECTION_STEPS: usize = 80;

/// Temperature-corrected equilibrium constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chemistry {
    pub t_op_k: f64,
    pub k_w: f64,
    pub k_a_va: f64,
    pub k_a_bu: f64,
    pub k_a_pro: f64,
    pub k_a_ac: f64,
    pub k_a_co2: f64,
    pub k_a_in: f64,
    pub k_h_h2: f64,
    pub k_h_ch4: f64,
    pub k_h_co2: f64,
    pub p_gas_h2o: f64,
}

/// Totals that enter the charge balance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AcidBaseTotals {
    /// kgCOD/m³
    pub s_va: f64,
    pub s_bu: f64,
    pub s_pro: f64,
    pub s_ac: f64,
    /// kmol/m³
    pub s_ic: f64,
    pub s_in: f64,
    pub s_cation: f64,
    pub s_anion: f64,
}

impl AcidBaseTotals {
    /// Read totals from a state-ordered slice (reactor state or influent).
    pub fn from_slice(values: &[f64]) -> Self {
        let at = |c: Compartment| values.get(c.index()).copied().unwrap_or(0.0);
        Self {
            s_va: at(Compartment::SVa),
            s_bu: at(Compartment::SBu),
            s_pro: at(Compartment::SPro),
            s_ac: at(Compartment::SAc),
            s_ic: at(Compartment::SIc),
            s_in: at(Compartment::SIn),
            s_cation: at(Compartment::SCation),
            s_anion: at(Compartment::SAnion),
        }
    }
}

/// Dissociated species at a given proton concentration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speciation {
    /// kmol H+/m³
    pub s_h: f64,
    /// kgCOD/m³
    pub va_ion: f64,
    pub bu_ion: f64,
    pub pro_ion: f64,
    pub ac_ion: f64,
    /// kmol/m³
    pub hco3: f64,
    pub nh3: f64,
}

impl Speciation {
    pub fn ph(&self) -> f64 {
        -self.s_h.log10()
    }
}

fn vant_hoff(k_base: f64, delta_h: f64, t_op_k: f64) -> f64 {
    k_base * (delta_h / (100.0 * R_GAS) * (1.0 / T_BASE_K - 1.0 / t_op_k)).exp()
}

impl Chemistry {
    pub fn at_temperature(t_op_k: f64) -> Self {
        Self {
            t_op_k,
            k_w: vant_hoff(1.0e-14, 55_900.0, t_op_k),
            k_a_va: 10f64.powf(-4.86),
            k_a_bu: 10f64.powf(-4.82),
            k_a_pro: 10f64.powf(-4.88),
            k_a_ac: 10f64.powf(-4.76),
            k_a_co2: vant_hoff(10f64.powf(-6.35), 7_646.0, t_op_k),
            k_a_in: vant_hoff(10f64.powf(-9.25), 51_965.0, t_op_k),
            k_h_h2: vant_hoff(7.8e-4, -4_180.0, t_op_k),
            k_h_ch4: vant_hoff(0.0014, -14_240.0, t_op_k),
            k_h_co2: vant_hoff(0.035, -19_410.0, t_op_k),
            p_gas_h2o: 0.0313 * (5_290.0 * (1.0 / T_BASE_K - 1.0 / t_op_k)).exp(),
        }
    }

    /// R·T at the operating temperature, bar·m³/kmol.
    #[inline]
    pub fn rt(&self) -> f64 {
        R_GAS * self.t_op_k
    }

    pub fn speciate(&self, totals: &AcidBaseTotals, s_h: f64) -> Speciation {
        let dissociated = |k_a: f64, total: f64| k_a * total / (k_a + s_h);
        Speciation {
            s_h,
            va_ion: dissociated(self.k_a_va, totals.s_va),
            bu_ion: dissociated(self.k_a_bu, totals.s_bu),
            pro_ion: dissociated(self.k_a_pro, totals.s_pro),
            ac_ion: dissociated(self.k_a_ac, totals.s_ac),
            hco3: dissociated(self.k_a_co2, totals.s_ic),
            nh3: dissociated(self.k_a_in, totals.s_in),
        }
    }

    /// Net charge (kmol/m³) at `s_h`; strictly increasing in `s_h`.
    pub fn charge_balance(&self, totals: &AcidBaseTotals, s_h: f64) -> f64 {
        let sp = self.speciate(totals, s_h);
        let nh4 = totals.s_in - sp.nh3;
        totals.s_cation + nh4 + s_h
            - sp.hco3
            - sp.ac_ion / COD_PER_MOL_AC
            - sp.pro_ion / COD_PER_MOL_PRO
            - sp.bu_ion / COD_PER_MOL_BU
            - sp.va_ion / COD_PER_MOL_VA
            - self.k_w / s_h
            - totals.s_anion
    }

    /// Equilibrium speciation from the charge balance.
    ///
    /// Bisection on log10(S_H+) over [1e-14, 1] with a fixed iteration
    /// count, so the result is a deterministic function of the totals.
    pub fn equilibrium(&self, totals: &AcidBaseTotals) -> Speciation {
        let mut lo = LOG_SH_MIN;
        let mut hi = LOG_SH_MAX;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.charge_balance(totals, 10f64.powf(mid)) > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        self.speciate(totals, 10f64.powf(0.5 * (lo + hi)))
    }

    pub fn ph(&self, totals: &AcidBaseTotals) -> f64 {
        self.equilibrium(totals).ph()
    }

    /// Net charge the totals would carry at `ph` with no strong ions.
    ///
    /// Positive result means the stream needs that much strong anion to sit
    /// at `ph`; negative means strong cation.
    pub fn strong_ion_deficit(&self, totals: &AcidBaseTotals, ph: f64) -> f64 {
        let neutral = AcidBaseTotals {
            s_cation: 0.0,
            s_anion: 0.0,
            ..*totals
        };
        self.charge_balance(&neutral, 10f64.powf(-ph))
    }

    /// Partial pressures (bar) of H2, CH4, CO2 from headspace concentrations.
    pub fn partial_pressures(&self, s_gas_h2: f64, s_gas_ch4: f64, s_gas_co2: f64) -> [f64; 3] {
        let rt = self.rt();
        [
            s_gas_h2 * rt / COD_PER_MOL_H2,
            s_gas_ch4 * rt / COD_PER_MOL_CH4,
            s_gas_co2 * rt,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesophilic() -> Chemistry {
        Chemistry::at_temperature(308.15)
    }

    #[test]
    fn constants_match_benchmark_at_35c() {
        let chem = mesophilic();
        assert!((chem.k_w - 2.08e-14).abs() / 2.08e-14 < 0.01);
        assert!((chem.k_a_co2 - 4.94e-7).abs() / 4.94e-7 < 0.01);
        assert!((chem.k_a_in - 1.11e-9).abs() / 1.11e-9 < 0.01);
        assert!((chem.p_gas_h2o - 0.0557).abs() < 1e-3);
    }

    #[test]
    fn pure_water_is_neutral() {
        let chem = mesophilic();
        let ph = chem.ph(&AcidBaseTotals::default());
        let neutral = -(chem.k_w.sqrt()).log10();
        assert!((ph - neutral).abs() < 1e-6);
    }

    #[test]
    fn charge_balance_is_monotone() {
        let chem = mesophilic();
        let totals = AcidBaseTotals {
            s_ac: 0.2,
            s_ic: 0.15,
            s_in: 0.13,
            s_cation: 0.04,
            s_anion: 0.025,
            ..Default::default()
        };
        let mut prev = f64::NEG_INFINITY;
        for e in 1..14 {
            let f = chem.charge_balance(&totals, 10f64.powi(-15 + e));
            assert!(f > prev);
            prev = f;
        }
    }

    #[test]
    fn buffered_digester_sits_near_neutral() {
        let chem = mesophilic();
        let totals = AcidBaseTotals {
            s_va: 0.0116,
            s_bu: 0.0132,
            s_pro: 0.0158,
            s_ac: 0.197,
            s_ic: 0.1527,
            s_in: 0.13,
            s_cation: 0.04,
            s_anion: 0.0252,
        };
        let ph = chem.ph(&totals);
        assert!(ph > 7.0 && ph < 7.6, "pH {ph}");
    }

    #[test]
    fn strong_ion_deficit_reproduces_target_ph() {
        let chem = mesophilic();
        let mut totals = AcidBaseTotals {
            s_ac: 1.0,
            s_ic: 0.08,
            s_in: 0.2,
            ..Default::default()
        };
        let deficit = chem.strong_ion_deficit(&totals, 7.2);
        if deficit > 0.0 {
            totals.s_anion = deficit;
        } else {
            totals.s_cation = -deficit;
        }
        assert!((chem.ph(&totals) - 7.2).abs() < 1e-6);
    }
}
