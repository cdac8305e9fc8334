//! Loads the shipped substrate document and checks catalog behaviour.

use std::path::PathBuf;

use ad_substrates::{ParamGroup, SubstrateDatabase, SubstrateError, Symbol};

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(file)
}

fn reference_db() -> SubstrateDatabase {
    SubstrateDatabase::load(&data_path("substrates.yaml")).expect("reference substrates load")
}

#[test]
fn every_declared_id_resolves_to_its_entry() {
    let content = std::fs::read_to_string(data_path("substrates.yaml")).unwrap();
    let doc: ad_substrates::SubstrateDocument = serde_yaml::from_str(&content).unwrap();
    let db = reference_db();

    assert_eq!(db.len(), doc.substrates.len());
    for def in &doc.substrates {
        let id = def.id.as_deref().unwrap();
        let substrate = db.get(id).unwrap();
        assert_eq!(Some(substrate.name.as_str()), def.name.as_deref());
        assert_eq!(Some(substrate.class.as_str()), def.class.as_deref());
    }
}

#[test]
fn reference_set_has_ten_substrates() {
    let db = reference_db();
    assert_eq!(db.len(), 10);
    assert_eq!(db.ids().next(), Some("maize"));
    assert_eq!(db.get("manure").unwrap().name, "Gülle");
}

#[test]
fn sparse_groups_are_not_applicable() {
    let db = reference_db();
    let lime = db.get("feed_lime").unwrap();
    assert!(lime.group(ParamGroup::Composition).is_none());
    assert!(db.parameter("feed_lime", Symbol::Rp).unwrap().is_none());
    assert!(db.parameter("grain", Symbol::Kdis).unwrap().is_none());
    assert!(matches!(
        db.require_parameter("grain", Symbol::Kdis),
        Err(SubstrateError::MissingParameter { .. })
    ));
}

#[test]
fn parameters_carry_canonical_units_and_references() {
    let db = reference_db();
    let ts = db.require_parameter("maize", Symbol::Ts).unwrap();
    assert_eq!(ts.unit, "% FM");
    let rp = db.require_parameter("maize", Symbol::Rp).unwrap();
    assert!(rp.reference.is_some());
    assert!(db.require_parameter("maize", Symbol::Ndf).unwrap().reference.is_none());
}

#[test]
fn unknown_id_is_not_found() {
    let db = reference_db();
    assert!(matches!(
        db.get("sugar_beet"),
        Err(SubstrateError::NotFound { id }) if id == "sugar_beet"
    ));
}

#[test]
fn search_matches_classes() {
    let db = reference_db();
    let hits: Vec<_> = db.search("ek ii").iter().map(|s| s.id.clone()).collect();
    assert_eq!(hits, vec!["manure", "cattle_solid_manure"]);
}
