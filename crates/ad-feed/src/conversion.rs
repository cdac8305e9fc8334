//! Substrate lab values to ADM1 influent concentrations.
//!
//! Each substrate becomes a liquid-phase concentration vector per m³ of fresh
//! matter. Flow-weighted mixing of these vectors gives the influent.

use ad_core::chemistry::{AcidBaseTotals, Chemistry};
use ad_core::layout::{Compartment, LIQUID_DIM};
use ad_substrates::{ParamGroup, Substrate, Symbol};
use tracing::{debug, warn};

/// Fresh-matter density, kg/m³.
pub const RHO_FM: f64 = 1000.0;

/// COD per kg of organic fraction, kgCOD/kg.
pub const COD_CARBOHYDRATE: f64 = 1.185;
pub const COD_PROTEIN: f64 = 1.42;
pub const COD_LIPID: f64 = 2.875;
pub const COD_INERT: f64 = 1.19;

/// COD per kg of acid, kgCOD/kg.
pub const COD_ACETATE: f64 = 1.067;
pub const COD_PROPIONATE: f64 = 1.514;
pub const COD_BUTYRATE: f64 = 1.818;
pub const COD_VALERATE: f64 = 2.039;

const N_MOLAR_MASS: f64 = 14.0;
const CACO3_EQ_MASS: f64 = 50.0;
const DEFAULT_PH: f64 = 7.0;

/// Influent contribution of one substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstrateStream {
    pub substrate_id: String,
    /// Liquid-phase concentrations in state order.
    pub concentrations: Vec<f64>,
    /// Rate constants declared by the substrate.
    pub kinetics: Vec<(Symbol, f64)>,
}

/// Concentration vector of `substrate` as fed.
///
/// `chem` is used when the substrate does not declare its own temperature.
/// Missing lab values degrade to zero contributions with a warning; they
/// never fail the conversion.
pub fn substrate_stream(substrate: &Substrate, chem: &Chemistry) -> SubstrateStream {
    let id = substrate.id.as_str();
    let mut c = vec![0.0; LIQUID_DIM];
    let mut set = |comp: Compartment, v: f64| c[comp.index()] = v.max(0.0);

    let phys = |s: Symbol| substrate.value(s);
    let comp = |s: Symbol| substrate.value(s).unwrap_or(0.0);

    // particulate organics
    match phys(Symbol::Ts) {
        Some(ts) => {
            let ts_mass = RHO_FM * ts / 100.0;
            let vs_mass = match phys(Symbol::Vs) {
                Some(vs) => ts_mass * vs / 100.0,
                None => {
                    warn!(substrate = id, "no VS value, treating all solids as organic");
                    ts_mass
                }
            };
            if substrate.group(ParamGroup::Composition).is_none() && vs_mass > 0.0 {
                warn!(substrate = id, "no composition analysis, organics fed as carbohydrate");
            }
            let protein = ts_mass * comp(Symbol::Rp) / 100.0;
            let lipid = ts_mass * comp(Symbol::Rl) / 100.0;
            let fibre = ts_mass * substrate.value(Symbol::Ndf).unwrap_or(comp(Symbol::Rf)) / 100.0;
            let lignin = (ts_mass * comp(Symbol::Adl) / 100.0).min(fibre);
            let fibre_deg = fibre - lignin;
            let nfc = (vs_mass - protein - lipid - fibre).max(0.0);

            let degradable = match phys(Symbol::DVs) {
                Some(d) => (d / 100.0).clamp(0.0, 1.0),
                None => {
                    debug!(substrate = id, "no D_VS value, organics fully degradable");
                    1.0
                }
            };
            let inert_share = 1.0 - degradable;

            set(Compartment::XCh, degradable * nfc * COD_CARBOHYDRATE);
            set(Compartment::XXc, degradable * fibre_deg * COD_CARBOHYDRATE);
            set(Compartment::XPr, degradable * protein * COD_PROTEIN);
            set(Compartment::XLi, degradable * lipid * COD_LIPID);
            set(
                Compartment::XI,
                (lignin + inert_share * (nfc + fibre_deg + protein + lipid)) * COD_INERT,
            );
        }
        None => warn!(substrate = id, "no TS value, substrate contributes no solids"),
    }

    // dissolved species
    let s_ac = phys(Symbol::Sac).unwrap_or(0.0) * COD_ACETATE;
    let s_pro = phys(Symbol::Spro).unwrap_or(0.0) * COD_PROPIONATE;
    let s_bu = phys(Symbol::Sbu).unwrap_or(0.0) * COD_BUTYRATE;
    let s_va = phys(Symbol::Sva).unwrap_or(0.0) * COD_VALERATE;
    set(Compartment::SAc, s_ac);
    set(Compartment::SPro, s_pro);
    set(Compartment::SBu, s_bu);
    set(Compartment::SVa, s_va);
    if let Some(cod_s) = phys(Symbol::CodS) {
        set(Compartment::SSu, cod_s - (s_ac + s_pro + s_bu + s_va));
    }
    let nitrogen = phys(Symbol::SiIn).or(phys(Symbol::Snh4)).unwrap_or(0.0);
    set(Compartment::SIn, nitrogen / N_MOLAR_MASS);
    set(Compartment::SIc, phys(Symbol::Tac).unwrap_or(0.0) / CACO3_EQ_MASS);

    // strong ions and speciation at the substrate's own pH
    let ph = phys(Symbol::Ph).unwrap_or_else(|| {
        debug!(substrate = id, "no pH value, assuming {DEFAULT_PH}");
        DEFAULT_PH
    });
    let local = match phys(Symbol::T) {
        Some(t_c) => Chemistry::at_temperature(t_c + 273.15),
        None => *chem,
    };
    let mut totals = AcidBaseTotals::from_slice(&c);
    let deficit = local.strong_ion_deficit(&totals, ph);
    if deficit > 0.0 {
        totals.s_anion = deficit;
    } else {
        totals.s_cation = -deficit;
    }
    let sp = local.speciate(&totals, 10f64.powf(-ph));
    c[Compartment::SCation.index()] = totals.s_cation;
    c[Compartment::SAnion.index()] = totals.s_anion;
    c[Compartment::SVaIon.index()] = sp.va_ion;
    c[Compartment::SBuIon.index()] = sp.bu_ion;
    c[Compartment::SProIon.index()] = sp.pro_ion;
    c[Compartment::SAcIon.index()] = sp.ac_ion;
    c[Compartment::SHco3Ion.index()] = sp.hco3;
    c[Compartment::SNh3.index()] = sp.nh3;

    let kinetics = substrate
        .group(ParamGroup::Kinetic)
        .map(|set| set.entries.iter().map(|p| (p.symbol, p.value)).collect())
        .unwrap_or_default();

    SubstrateStream {
        substrate_id: substrate.id.clone(),
        concentrations: c,
        kinetics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_substrates::SubstrateDatabase;

    const DOC: &str = r#"
substrates:
  - id: silage
    name: Silage
    class: Crops
    composition:
      - { symbol: RP, value: 10.0, unit: "% TS" }
      - { symbol: RL, value: 4.0, unit: "% TS" }
      - { symbol: NDF, value: 40.0, unit: "% TS" }
      - { symbol: ADL, value: 5.0, unit: "% TS" }
    phys:
      - { symbol: TS, value: 30.0, unit: "% FM" }
      - { symbol: VS, value: 90.0, unit: "% TS" }
      - { symbol: D_VS, value: 80.0, unit: "%" }
      - { symbol: pH, value: 4.0, unit: "-" }
      - { symbol: Sac, value: 3.0, unit: "g/l" }
      - { symbol: COD_S, value: 10.0, unit: "gCOD/l" }
      - { symbol: Snh4, value: 0.7, unit: "gN/l" }
      - { symbol: TAC, value: 1.0, unit: "gCaCO3eq/l" }
    kinetic:
      - { symbol: kdis, value: 0.3, unit: "1/d" }
  - id: water
    name: Water
    class: Other
"#;

    fn stream(id: &str) -> SubstrateStream {
        let db = SubstrateDatabase::from_yaml_str(DOC).unwrap();
        let chem = Chemistry::at_temperature(308.15);
        substrate_stream(db.get(id).unwrap(), &chem)
    }

    fn at(s: &SubstrateStream, c: Compartment) -> f64 {
        s.concentrations[c.index()]
    }

    #[test]
    fn weender_fractions_map_to_particulates() {
        let s = stream("silage");
        // TS 300 kg/m3, VS 270, protein 30, lipid 12, fibre 120 (lignin 15)
        assert!((at(&s, Compartment::XPr) - 0.8 * 30.0 * COD_PROTEIN).abs() < 1e-9);
        assert!((at(&s, Compartment::XLi) - 0.8 * 12.0 * COD_LIPID).abs() < 1e-9);
        assert!((at(&s, Compartment::XXc) - 0.8 * 105.0 * COD_CARBOHYDRATE).abs() < 1e-9);
        assert!((at(&s, Compartment::XCh) - 0.8 * 108.0 * COD_CARBOHYDRATE).abs() < 1e-9);
        let inert = (15.0 + 0.2 * (108.0 + 105.0 + 30.0 + 12.0)) * COD_INERT;
        assert!((at(&s, Compartment::XI) - inert).abs() < 1e-9);
    }

    #[test]
    fn dissolved_species_convert_to_cod_and_moles() {
        let s = stream("silage");
        assert!((at(&s, Compartment::SAc) - 3.0 * COD_ACETATE).abs() < 1e-12);
        assert!((at(&s, Compartment::SSu) - (10.0 - 3.0 * COD_ACETATE)).abs() < 1e-12);
        assert!((at(&s, Compartment::SIn) - 0.05).abs() < 1e-12);
        assert!((at(&s, Compartment::SIc) - 0.02).abs() < 1e-12);
        assert_eq!(s.kinetics, vec![(Symbol::Kdis, 0.3)]);
    }

    #[test]
    fn strong_ions_reproduce_substrate_ph() {
        let s = stream("silage");
        let chem = Chemistry::at_temperature(308.15);
        let totals = AcidBaseTotals::from_slice(&s.concentrations);
        assert!((chem.ph(&totals) - 4.0).abs() < 1e-6);
        assert!(s.concentrations.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn empty_substrate_is_near_zero() {
        let s = stream("water");
        assert_eq!(at(&s, Compartment::XCh), 0.0);
        assert_eq!(at(&s, Compartment::SAc), 0.0);
        assert!(s.kinetics.is_empty());
    }
}
