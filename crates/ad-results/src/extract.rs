//! Derived process indicators.

use ad_core::chemistry::{
    AcidBaseTotals, COD_PER_MOL_AC, COD_PER_MOL_BU, COD_PER_MOL_PRO, COD_PER_MOL_VA, Chemistry,
};
use ad_core::{Compartment as C, ReactorParams, ReactorState, STATE_DIM};
use ad_sim::SimulationTrace;
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// g/mol acetic acid.
const M_ACETIC: f64 = 60.0;
/// g CaCO3 equivalent per mol bicarbonate.
const CACO3_PER_HCO3: f64 = 50.0;
/// kg VS per kg COD of particulate organics.
const COD_PER_VS: f64 = 1.42;
/// kgCOD per kg acid.
const COD_PER_AC: f64 = 1.067;
const COD_PER_PRO: f64 = 1.514;

/// Scalars derived from one reactor state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitoredVariables {
    pub q_gas_m3_d: f64,
    pub q_ch4_m3_d: f64,
    pub p_gas_bar: f64,
    pub ph: f64,
    /// Volatile acids over alkalinity.
    pub fos_tac: f64,
    /// Acetic over propionic acid, both in g/l.
    pub ac_pro: f64,
    /// Volatile fatty acids, g/l acetic acid equivalent.
    pub vfa_g_l: f64,
    /// Total inorganic alkalinity, g/l CaCO3 equivalent.
    pub tac_g_l: f64,
    /// Soluble organic COD.
    pub ss_kgcod_m3: f64,
    /// Volatile solids of the particulate organics.
    pub vs_kg_m3: f64,
    pub biomass_kgcod_m3: f64,
}

impl MonitoredVariables {
    pub const NAMES: [&'static str; 11] = [
        "q_gas_m3_d",
        "q_ch4_m3_d",
        "p_gas_bar",
        "ph",
        "fos_tac",
        "ac_pro",
        "vfa_g_l",
        "tac_g_l",
        "ss_kgcod_m3",
        "vs_kg_m3",
        "biomass_kgcod_m3",
    ];

    /// Values in [`Self::NAMES`] order.
    pub fn values(&self) -> [f64; 11] {
        [
            self.q_gas_m3_d,
            self.q_ch4_m3_d,
            self.p_gas_bar,
            self.ph,
            self.fos_tac,
            self.ac_pro,
            self.vfa_g_l,
            self.tac_g_l,
            self.ss_kgcod_m3,
            self.vs_kg_m3,
            self.biomass_kgcod_m3,
        ]
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

fn sum(values: &[f64], from: C, to: C) -> f64 {
    values[from.index()..=to.index()].iter().sum()
}

/// Maps reactor states to [`MonitoredVariables`] for a given vessel.
#[derive(Debug, Clone)]
pub struct Extractor {
    reactor: ReactorParams,
    chem: Chemistry,
}

impl Extractor {
    pub fn new(reactor: ReactorParams) -> Self {
        Self {
            chem: reactor.chemistry(),
            reactor,
        }
    }

    /// Fails on anything but a full state vector.
    pub fn extract(&self, values: &[f64]) -> ResultsResult<MonitoredVariables> {
        if values.len() != STATE_DIM {
            return Err(ResultsError::ShapeMismatch {
                expected: STATE_DIM,
                actual: values.len(),
            });
        }
        Ok(self.compute(values))
    }

    pub fn extract_state(&self, state: &ReactorState) -> MonitoredVariables {
        self.compute(state.as_slice())
    }

    pub fn extract_trace(&self, trace: &SimulationTrace) -> Vec<(f64, MonitoredVariables)> {
        trace
            .iter()
            .map(|(t, state)| (t, self.extract_state(state)))
            .collect()
    }

    fn compute(&self, x: &[f64]) -> MonitoredVariables {
        let at = |c: C| x[c.index()];
        let totals = AcidBaseTotals::from_slice(x);
        let sp = self.chem.equilibrium(&totals);
        let gas = self
            .reactor
            .gas_exchange(&self.chem, x, totals.s_ic - sp.hco3);
        let p_gas = at(C::PGas);

        let vfa = M_ACETIC
            * (at(C::SAc) / COD_PER_MOL_AC
                + at(C::SPro) / COD_PER_MOL_PRO
                + at(C::SBu) / COD_PER_MOL_BU
                + at(C::SVa) / COD_PER_MOL_VA);
        let tac = CACO3_PER_HCO3 * at(C::SHco3Ion);

        MonitoredVariables {
            q_gas_m3_d: gas.q_gas,
            q_ch4_m3_d: ratio(gas.q_gas * gas.p_ch4, p_gas),
            p_gas_bar: p_gas,
            ph: sp.ph(),
            fos_tac: ratio(vfa, tac),
            ac_pro: ratio(at(C::SAc) / COD_PER_AC, at(C::SPro) / COD_PER_PRO),
            vfa_g_l: vfa,
            tac_g_l: tac,
            ss_kgcod_m3: sum(x, C::SSu, C::SAc) + at(C::SI),
            vs_kg_m3: sum(x, C::XXc, C::XP) / COD_PER_VS,
            biomass_kgcod_m3: sum(x, C::XSu, C::XH2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGESTER: [f64; STATE_DIM] = [
        0.012, 0.0053, 0.099, 0.0116, 0.0132, 0.0158, 0.197, 2.36e-7, 0.055, 0.14738, 0.13, 0.33,
        0.308, 0.028, 0.1027, 0.0295, 0.42, 1.18, 0.243, 0.432, 0.137, 0.76, 0.317, 25.6, 0.5,
        0.04, 0.0252, 0.0115, 0.0131, 0.0157, 0.1964, 0.1375, 0.0028, 1.02e-5, 1.63, 0.0141,
        1.0696,
    ];

    fn extractor() -> Extractor {
        Extractor::new(ReactorParams::default())
    }

    #[test]
    fn wrong_length_is_shape_mismatch() {
        let e = extractor();
        for len in [0, STATE_DIM - 1, STATE_DIM + 1] {
            let v = vec![0.1; len];
            assert!(matches!(
                e.extract(&v),
                Err(ResultsError::ShapeMismatch { expected: STATE_DIM, actual }) if actual == len
            ));
        }
    }

    #[test]
    fn reference_state_indicators() {
        let m = extractor().extract(&DIGESTER).unwrap();
        assert!(m.ph > 6.8 && m.ph < 7.8, "pH {}", m.ph);
        assert!((m.tac_g_l - 50.0 * 0.1375).abs() < 1e-12);
        assert!(m.fos_tac > 0.0 && m.fos_tac < 1.0);
        assert!(m.q_gas_m3_d > 0.0);
        assert!(m.q_ch4_m3_d > 0.0 && m.q_ch4_m3_d < m.q_gas_m3_d);
        assert!((m.biomass_kgcod_m3 - 3.489).abs() < 1e-9);
        assert_eq!(m.p_gas_bar, 1.0696);
    }

    #[test]
    fn reference_state_gas_flow_is_near_steady() {
        let m = extractor().extract(&DIGESTER).unwrap();
        assert!(
            m.q_gas_m3_d > 1_000.0 && m.q_gas_m3_d < 6_000.0,
            "q_gas {}",
            m.q_gas_m3_d
        );
    }

    #[test]
    fn zero_denominators_report_zero() {
        let m = extractor().extract(&[0.0; STATE_DIM]).unwrap();
        assert_eq!(m.fos_tac, 0.0);
        assert_eq!(m.ac_pro, 0.0);
        assert_eq!(m.q_ch4_m3_d, 0.0);
        assert_eq!(m.vfa_g_l, 0.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let e = extractor();
        let a = e.extract(&DIGESTER).unwrap();
        let b = e.extract(&DIGESTER).unwrap();
        assert!(
            a.values()
                .iter()
                .zip(b.values())
                .all(|(x, y)| x.to_bits() == y.to_bits())
        );
    }
}
