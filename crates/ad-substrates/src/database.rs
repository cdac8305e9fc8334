//! Validated, indexed substrate collection.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{SubstrateError, SubstrateResult};
use crate::schema::{ParameterDef, SubstrateDef, SubstrateDocument};
use crate::symbols::{ParamGroup, Symbol};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub symbol: Symbol,
    pub value: f64,
    pub unit: String,
    pub label: String,
    pub reference: Option<String>,
}

/// Parameters of one group, in document order. Symbols are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub group: ParamGroup,
    pub entries: Vec<Parameter>,
}

impl ParameterSet {
    pub fn get(&self, symbol: Symbol) -> Option<&Parameter> {
        self.entries.iter().find(|p| p.symbol == symbol)
    }

    pub fn value(&self, symbol: Symbol) -> Option<f64> {
        self.get(symbol).map(|p| p.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cost {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Substrate {
    pub id: String,
    pub name: String,
    pub class: String,
    pub cost: Option<Cost>,
    pub composition: Option<ParameterSet>,
    pub phys: Option<ParameterSet>,
    pub kinetic: Option<ParameterSet>,
}

impl Substrate {
    pub fn group(&self, group: ParamGroup) -> Option<&ParameterSet> {
        match group {
            ParamGroup::Composition => self.composition.as_ref(),
            ParamGroup::PhysChem => self.phys.as_ref(),
            ParamGroup::Kinetic => self.kinetic.as_ref(),
        }
    }

    /// Parameter lookup; `None` when the group or the entry is absent.
    pub fn parameter(&self, symbol: Symbol) -> Option<&Parameter> {
        self.group(symbol.group())?.get(symbol)
    }

    pub fn value(&self, symbol: Symbol) -> Option<f64> {
        self.parameter(symbol).map(|p| p.value)
    }

    /// Case-insensitive substring match on id, name and class.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
            || self.class.to_lowercase().contains(&query)
    }
}

/// Substrates in document order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct SubstrateDatabase {
    substrates: Vec<Substrate>,
    index: HashMap<String, usize>,
}

impl SubstrateDatabase {
    pub fn from_document(doc: SubstrateDocument) -> SubstrateResult<Self> {
        let mut substrates = Vec::with_capacity(doc.substrates.len());
        let mut index = HashMap::with_capacity(doc.substrates.len());
        for (pos, def) in doc.substrates.into_iter().enumerate() {
            let substrate = convert_substrate(pos, def)?;
            if index.contains_key(&substrate.id) {
                return Err(SubstrateError::parse(
                    format!("substrate '{}'", substrate.id),
                    "duplicate substrate id",
                ));
            }
            index.insert(substrate.id.clone(), substrates.len());
            substrates.push(substrate);
        }
        Ok(Self { substrates, index })
    }

    pub fn from_yaml_str(content: &str) -> SubstrateResult<Self> {
        let doc: SubstrateDocument = serde_yaml::from_str(content)?;
        Self::from_document(doc)
    }

    pub fn from_json_str(content: &str) -> SubstrateResult<Self> {
        let doc: SubstrateDocument = serde_json::from_str(content)?;
        Self::from_document(doc)
    }

    pub fn load_yaml(path: &Path) -> SubstrateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn load_json(path: &Path) -> SubstrateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load by file extension; anything other than `.json` is read as YAML.
    pub fn load(path: &Path) -> SubstrateResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::load_json(path),
            _ => Self::load_yaml(path),
        }
    }

    pub fn get(&self, id: &str) -> SubstrateResult<&Substrate> {
        self.index
            .get(id)
            .map(|&i| &self.substrates[i])
            .ok_or_else(|| SubstrateError::NotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Optional parameter of an existing substrate.
    ///
    /// An absent group or entry is `Ok(None)`; only an unknown substrate id
    /// is an error.
    pub fn parameter(&self, id: &str, symbol: Symbol) -> SubstrateResult<Option<&Parameter>> {
        Ok(self.get(id)?.parameter(symbol))
    }

    pub fn require_parameter(&self, id: &str, symbol: Symbol) -> SubstrateResult<&Parameter> {
        self.parameter(id, symbol)?
            .ok_or_else(|| SubstrateError::MissingParameter {
                id: id.to_string(),
                symbol,
            })
    }

    pub fn search(&self, query: &str) -> Vec<&Substrate> {
        self.substrates
            .iter()
            .filter(|s| s.matches_query(query))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substrate> {
        self.substrates.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.substrates.iter().map(|s| s.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.substrates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substrates.is_empty()
    }
}

fn required(value: Option<String>, field: &str, location: &str) -> SubstrateResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(SubstrateError::parse(location, format!("empty {field}"))),
        None => Err(SubstrateError::parse(location, format!("missing {field}"))),
    }
}

fn convert_substrate(pos: usize, def: SubstrateDef) -> SubstrateResult<Substrate> {
    let id = required(def.id, "id", &format!("substrates[{pos}]"))?;
    let location = format!("substrate '{id}'");
    let name = required(def.name, "name", &location)?;
    let class = required(def.class, "class", &location)?;

    let cost = match def.cost {
        Some(c) if !c.value.is_finite() => {
            return Err(SubstrateError::parse(location, "non-finite cost"));
        }
        Some(c) => Some(Cost {
            value: c.value,
            unit: c.unit,
        }),
        None => None,
    };

    Ok(Substrate {
        composition: convert_group(&id, ParamGroup::Composition, def.composition)?,
        phys: convert_group(&id, ParamGroup::PhysChem, def.phys)?,
        kinetic: convert_group(&id, ParamGroup::Kinetic, def.kinetic)?,
        id,
        name,
        class,
        cost,
    })
}

fn convert_group(
    id: &str,
    group: ParamGroup,
    defs: Option<Vec<ParameterDef>>,
) -> SubstrateResult<Option<ParameterSet>> {
    let Some(defs) = defs else {
        return Ok(None);
    };
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(defs.len());
    for def in defs {
        let location = format!("substrate '{id}' {group}.{}", def.symbol.trim());
        let symbol = Symbol::from_key(&def.symbol)
            .ok_or_else(|| SubstrateError::parse(&location, "unknown symbol"))?;
        if symbol.group() != group {
            return Err(SubstrateError::parse(
                &location,
                format!("symbol belongs to the {} group", symbol.group()),
            ));
        }
        if !seen.insert(symbol) {
            return Err(SubstrateError::parse(&location, "duplicate symbol"));
        }
        if !def.value.is_finite() {
            return Err(SubstrateError::parse(&location, "non-finite value"));
        }
        if def.unit.trim() != symbol.unit() {
            return Err(SubstrateError::parse(
                &location,
                format!("unit '{}' (expected '{}')", def.unit.trim(), symbol.unit()),
            ));
        }
        entries.push(Parameter {
            symbol,
            value: def.value,
            unit: symbol.unit().to_string(),
            label: def.label,
            reference: def.reference.filter(|r| !r.trim().is_empty()),
        });
    }
    Ok(Some(ParameterSet { group, entries }))
}
