//! Recognised parameter symbols, their group and canonical unit.

use core::fmt;

/// Parameter group a symbol belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamGroup {
    /// Weender / van Soest fractionation.
    Composition,
    /// Solids, pH, acids, alkalinity and related lab values.
    PhysChem,
    /// First-order and uptake rate constants.
    Kinetic,
}

impl ParamGroup {
    /// Key of the group inside a substrate document.
    pub fn key(self) -> &'static str {
        match self {
            ParamGroup::Composition => "composition",
            ParamGroup::PhysChem => "phys",
            ParamGroup::Kinetic => "kinetic",
        }
    }
}

impl fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    // composition
    Rf,
    Rp,
    Rl,
    Ndf,
    Adf,
    Adl,
    // physical / chemical
    Ts,
    Vs,
    Ph,
    Sac,
    Spro,
    Sbu,
    Sva,
    Snh4,
    Tac,
    T,
    DVs,
    CodS,
    SiIn,
    // kinetic
    Kdis,
    KhydCh,
    KhydPr,
    KhydLi,
    KmC4,
    KmPro,
    KmAc,
    KmH2,
}

struct SymbolInfo {
    symbol: Symbol,
    key: &'static str,
    unit: &'static str,
    group: ParamGroup,
    description: &'static str,
}

const fn info(
    symbol: Symbol,
    key: &'static str,
    unit: &'static str,
    group: ParamGroup,
    description: &'static str,
) -> SymbolInfo {
    SymbolInfo {
        symbol,
        key,
        unit,
        group,
        description,
    }
}

use ParamGroup::{Composition as C, Kinetic as K, PhysChem as P};

const SYMBOLS: [SymbolInfo; 27] = [
    info(Symbol::Rf, "RF", "% TS", C, "crude fibre"),
    info(Symbol::Rp, "RP", "% TS", C, "crude protein"),
    info(Symbol::Rl, "RL", "% TS", C, "crude fat"),
    info(Symbol::Ndf, "NDF", "% TS", C, "neutral detergent fibre"),
    info(Symbol::Adf, "ADF", "% TS", C, "acid detergent fibre"),
    info(Symbol::Adl, "ADL", "% TS", C, "acid detergent lignin"),
    info(Symbol::Ts, "TS", "% FM", P, "total solids"),
    info(Symbol::Vs, "VS", "% TS", P, "volatile solids"),
    info(Symbol::Ph, "pH", "-", P, "pH value"),
    info(Symbol::Sac, "Sac", "g/l", P, "acetic acid"),
    info(Symbol::Spro, "Spro", "g/l", P, "propionic acid"),
    info(Symbol::Sbu, "Sbu", "g/l", P, "butyric acid"),
    info(Symbol::Sva, "Sva", "g/l", P, "valeric acid"),
    info(Symbol::Snh4, "Snh4", "gN/l", P, "ammonium nitrogen"),
    info(Symbol::Tac, "TAC", "gCaCO3eq/l", P, "total alkalinity"),
    info(Symbol::T, "T", "°C", P, "temperature"),
    info(Symbol::DVs, "D_VS", "%", P, "degradation rate of volatile solids"),
    info(Symbol::CodS, "COD_S", "gCOD/l", P, "soluble COD"),
    info(Symbol::SiIn, "SIin", "gN/l", P, "soluble inorganic nitrogen"),
    info(Symbol::Kdis, "kdis", "1/d", K, "disintegration rate"),
    info(Symbol::KhydCh, "khyd_ch", "1/d", K, "carbohydrate hydrolysis rate"),
    info(Symbol::KhydPr, "khyd_pr", "1/d", K, "protein hydrolysis rate"),
    info(Symbol::KhydLi, "khyd_li", "1/d", K, "lipid hydrolysis rate"),
    info(Symbol::KmC4, "km_c4", "1/d", K, "valerate and butyrate uptake rate"),
    info(Symbol::KmPro, "km_pro", "1/d", K, "propionate uptake rate"),
    info(Symbol::KmAc, "km_ac", "1/d", K, "acetate uptake rate"),
    info(Symbol::KmH2, "km_h2", "1/d", K, "hydrogen uptake rate"),
];

impl Symbol {
    pub fn all() -> impl Iterator<Item = Symbol> {
        SYMBOLS.iter().map(|s| s.symbol)
    }

    fn info(self) -> &'static SymbolInfo {
        &SYMBOLS[self as usize]
    }

    /// Symbol as written in substrate documents.
    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn unit(self) -> &'static str {
        self.info().unit
    }

    pub fn group(self) -> ParamGroup {
        self.info().group
    }

    pub fn description(self) -> &'static str {
        self.info().description
    }

    /// Exact (case-sensitive) lookup by document key; `pH` and `PH` differ.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        SYMBOLS.iter().find(|s| s.key == key).map(|s| s.symbol)
    }

    pub fn in_group(group: ParamGroup) -> impl Iterator<Item = Symbol> {
        Self::all().filter(move |s| s.group() == group)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
