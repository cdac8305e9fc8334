//! ADM1 state vector layout.
//!
//! The first [`LIQUID_DIM`] compartments are carried by the influent stream;
//! the remaining four describe the headspace. The influent vector appends the
//! total volumetric flow at [`Q_INDEX`].

use core::fmt;

/// Number of compartments in a reactor state.
pub const STATE_DIM: usize = 37;

/// Number of liquid-phase compartments (also carried by the influent).
pub const LIQUID_DIM: usize = 33;

/// Influent length: liquid compartments plus total flow.
pub const INFLUENT_DIM: usize = LIQUID_DIM + 1;

/// Position of the total flow (m³/d) inside an influent vector.
pub const Q_INDEX: usize = LIQUID_DIM;

/// One tracked compartment of the reactor state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Compartment {
    SSu,
    SAa,
    SFa,
    SVa,
    SBu,
    SPro,
    SAc,
    SH2,
    SCh4,
    SIc,
    SIn,
    SI,
    XXc,
    XCh,
    XPr,
    XLi,
    XSu,
    XAa,
    XFa,
    XC4,
    XPro,
    XAc,
    XH2,
    XI,
    XP,
    SCation,
    SAnion,
    SVaIon,
    SBuIon,
    SProIon,
    SAcIon,
    SHco3Ion,
    SNh3,
    SGasH2,
    SGasCh4,
    SGasCo2,
    PGas,
}

struct CompartmentInfo {
    compartment: Compartment,
    name: &'static str,
    unit: &'static str,
}

const LAYOUT: [CompartmentInfo; STATE_DIM] = [
    CompartmentInfo { compartment: Compartment::SSu, name: "S_su", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SAa, name: "S_aa", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SFa, name: "S_fa", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SVa, name: "S_va", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SBu, name: "S_bu", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SPro, name: "S_pro", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SAc, name: "S_ac", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SH2, name: "S_h2", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SCh4, name: "S_ch4", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SIc, name: "S_IC", unit: "kmolC/m3" },
    CompartmentInfo { compartment: Compartment::SIn, name: "S_IN", unit: "kmolN/m3" },
    CompartmentInfo { compartment: Compartment::SI, name: "S_I", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XXc, name: "X_xc", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XCh, name: "X_ch", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XPr, name: "X_pr", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XLi, name: "X_li", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XSu, name: "X_su", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XAa, name: "X_aa", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XFa, name: "X_fa", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XC4, name: "X_c4", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XPro, name: "X_pro", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XAc, name: "X_ac", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XH2, name: "X_h2", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XI, name: "X_I", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::XP, name: "X_p", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SCation, name: "S_cation", unit: "kmol/m3" },
    CompartmentInfo { compartment: Compartment::SAnion, name: "S_anion", unit: "kmol/m3" },
    CompartmentInfo { compartment: Compartment::SVaIon, name: "S_va_ion", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SBuIon, name: "S_bu_ion", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SProIon, name: "S_pro_ion", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SAcIon, name: "S_ac_ion", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SHco3Ion, name: "S_hco3_ion", unit: "kmolC/m3" },
    CompartmentInfo { compartment: Compartment::SNh3, name: "S_nh3", unit: "kmolN/m3" },
    CompartmentInfo { compartment: Compartment::SGasH2, name: "S_gas_h2", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SGasCh4, name: "S_gas_ch4", unit: "kgCOD/m3" },
    CompartmentInfo { compartment: Compartment::SGasCo2, name: "S_gas_co2", unit: "kmolC/m3" },
    CompartmentInfo { compartment: Compartment::PGas, name: "P_gas", unit: "bar" },
];

impl Compartment {
    /// All compartments in state-vector order.
    pub fn all() -> impl Iterator<Item = Compartment> {
        LAYOUT.iter().map(|info| info.compartment)
    }

    /// Position inside a reactor state (and influent, for liquid compartments).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        LAYOUT.get(index).map(|info| info.compartment)
    }

    /// Canonical column name used by checkpoints and exports.
    pub fn name(self) -> &'static str {
        LAYOUT[self.index()].name
    }

    pub fn unit(self) -> &'static str {
        LAYOUT[self.index()].unit
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        LAYOUT
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.compartment)
    }

    /// Carried by the influent stream.
    pub fn is_liquid(self) -> bool {
        self.index() < LIQUID_DIM
    }

    /// Active microbial guild (X_su through X_h2).
    pub fn is_biomass(self) -> bool {
        (Compartment::XSu.index()..=Compartment::XH2.index()).contains(&self.index())
    }

    pub fn is_particulate(self) -> bool {
        (Compartment::XXc.index()..=Compartment::XP.index()).contains(&self.index())
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn layout_order_matches_discriminants() {
        for (i, info) in LAYOUT.iter().enumerate() {
            assert_eq!(info.compartment.index(), i, "{} out of order", info.name);
        }
    }

    #[test]
    fn names_are_unique_and_resolvable() {
        let mut seen = HashSet::new();
        for c in Compartment::all() {
            assert!(seen.insert(c.name()), "duplicate name {}", c.name());
            assert_eq!(Compartment::from_name(c.name()), Some(c));
        }
        assert_eq!(seen.len(), STATE_DIM);
    }

    #[test]
    fn liquid_block_ends_before_gas_phase() {
        assert!(Compartment::SNh3.is_liquid());
        assert!(!Compartment::SGasH2.is_liquid());
        assert_eq!(Compartment::SGasH2.index(), LIQUID_DIM);
    }

    #[test]
    fn biomass_guilds() {
        let guilds: Vec<_> = Compartment::all().filter(|c| c.is_biomass()).collect();
        assert_eq!(guilds.len(), 7);
        assert!(!Compartment::XI.is_biomass());
        assert!(Compartment::XI.is_particulate());
    }
}
