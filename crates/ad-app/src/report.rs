//! Markdown rendering of the substrate database.
//!
//! Display text goes through a [`LabelTable`]; nothing here feeds the
//! numeric path.

use std::collections::HashMap;
use std::path::Path;

use ad_substrates::{ParamGroup, ParameterSet, Substrate, SubstrateDatabase};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Deserialize)]
struct LabelDocument {
    #[serde(default)]
    labels: HashMap<String, String>,
}

/// Immutable display-label translations.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let doc: LabelDocument = serde_yaml::from_str(content)
            .map_err(|e| AppError::InvalidInput(format!("label table: {e}")))?;
        Ok(Self { labels: doc.labels })
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Translation of `text`, or `text` itself.
    pub fn translate<'a>(&'a self, text: &'a str) -> &'a str {
        self.labels.get(text).map(String::as_str).unwrap_or(text)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn group_title(group: ParamGroup) -> &'static str {
    match group {
        ParamGroup::Composition => "Composition",
        ParamGroup::PhysChem => "Physical / chemical",
        ParamGroup::Kinetic => "Kinetic",
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub struct SubstrateReport {
    labels: LabelTable,
}

impl SubstrateReport {
    pub fn new(labels: LabelTable) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Render `ids` (all substrates when `None`) in the order given.
    pub fn render(&self, db: &SubstrateDatabase, ids: Option<&[String]>) -> AppResult<String> {
        let substrates: Vec<&Substrate> = match ids {
            Some(ids) => ids
                .iter()
                .map(|id| db.get(id))
                .collect::<Result<_, _>>()?,
            None => db.iter().collect(),
        };

        let mut out = String::from("# Substrate database\n");
        for substrate in substrates {
            out.push('\n');
            self.render_substrate(substrate, &mut out);
        }
        Ok(out)
    }

    fn render_substrate(&self, substrate: &Substrate, out: &mut String) {
        let t = &self.labels;
        out.push_str(&format!(
            "## {} (`{}`)\n\n",
            t.translate(&substrate.name),
            substrate.id
        ));
        out.push_str(&format!("- Class: {}\n", t.translate(&substrate.class)));
        if let Some(cost) = &substrate.cost {
            out.push_str(&format!("- Cost: {} {}\n", cost.value, cost.unit));
        }

        for group in [
            ParamGroup::Composition,
            ParamGroup::PhysChem,
            ParamGroup::Kinetic,
        ] {
            if let Some(set) = substrate.group(group) {
                self.render_group(group, set, out);
            }
        }
    }

    fn render_group(&self, group: ParamGroup, set: &ParameterSet, out: &mut String) {
        out.push_str(&format!("\n### {}\n\n", group_title(group)));
        out.push_str("| Parameter | Symbol | Value | Unit | Reference |\n");
        out.push_str("|---|---|---:|---|---|\n");
        for p in &set.entries {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(self.labels.translate(&p.label)),
                p.symbol,
                p.value,
                escape_cell(&p.unit),
                escape_cell(p.reference.as_deref().unwrap_or("")),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBSTRATES: &str = r#"
substrates:
  - id: maize
    name: Silomais
    class: "Mais (GPS) (EK I)"
    cost: { value: 35.0, unit: "EUR/t FM" }
    phys:
      - { symbol: TS, value: 32.0, unit: "% FM", label: "total solids" }
  - id: lime
    name: Futterkalk
    class: Miscellaneous
    cost: { value: 100.0, unit: "EUR/t FM" }
"#;

    const LABELS: &str = r#"
labels:
  "Silomais": "Maize silage"
  "total solids": "Total solids (TS)"
"#;

    fn db() -> SubstrateDatabase {
        SubstrateDatabase::from_yaml_str(SUBSTRATES).unwrap()
    }

    #[test]
    fn translates_known_labels_only() {
        let labels = LabelTable::from_yaml_str(LABELS).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.translate("Silomais"), "Maize silage");
        assert_eq!(labels.translate("Gülle"), "Gülle");
    }

    #[test]
    fn renders_present_groups_only() {
        let report = SubstrateReport::new(LabelTable::from_yaml_str(LABELS).unwrap());
        let md = report.render(&db(), None).unwrap();
        assert!(md.contains("## Maize silage (`maize`)"));
        assert!(md.contains("| Total solids (TS) | TS | 32 | % FM |  |"));
        assert_eq!(md.matches("### Physical / chemical").count(), 1);
        assert!(!md.contains("### Composition"));
        assert!(!md.contains("### Kinetic"));
        assert!(md.contains("## Futterkalk (`lime`)"));
    }

    #[test]
    fn selection_keeps_order_and_rejects_unknown_ids() {
        let report = SubstrateReport::new(LabelTable::empty());
        let ids = vec!["lime".to_string(), "maize".to_string()];
        let md = report.render(&db(), Some(&ids)).unwrap();
        let lime = md.find("`lime`").unwrap();
        let maize = md.find("`maize`").unwrap();
        assert!(lime < maize);

        let missing = vec!["onions".to_string()];
        assert!(matches!(
            report.render(&db(), Some(&missing)),
            Err(AppError::Substrate(_))
        ));
    }
}
