//! Scenario loading and the files it references.

use std::path::{Path, PathBuf};

use ad_core::ReactorState;
use ad_scenario::Scenario;
use ad_substrates::{SubstrateDatabase, SubstrateError};

use crate::error::{AppError, AppResult};

/// Summary printed by `validate`.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub name: String,
    pub substrate_count: usize,
    pub slot_count: usize,
    pub enabled_slots: Vec<String>,
    pub window_count: usize,
    pub interval_hours: f64,
    pub grid_points: usize,
    pub end_days: f64,
    pub initial_state: Option<PathBuf>,
}

/// Parsed database plus the document text it came from.
#[derive(Debug, Clone)]
pub struct LoadedSubstrates {
    pub db: SubstrateDatabase,
    pub source: String,
}

pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(ad_scenario::load(path)?)
}

pub fn load_substrates(path: &Path) -> AppResult<LoadedSubstrates> {
    let source = std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let db = if is_json {
        SubstrateDatabase::from_json_str(&source)?
    } else {
        SubstrateDatabase::from_yaml_str(&source)?
    };
    Ok(LoadedSubstrates { db, source })
}

/// Every feed slot must name a substrate in `db`.
pub fn check_slots(scenario: &Scenario, db: &SubstrateDatabase) -> AppResult<()> {
    for slot in scenario.feed_slots() {
        if !db.contains(&slot.substrate_id) {
            return Err(SubstrateError::NotFound {
                id: slot.substrate_id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// `override_path` wins over the scenario's own `initial_state`.
pub fn load_initial_state(
    scenario: &Scenario,
    override_path: Option<&Path>,
) -> AppResult<ReactorState> {
    let path = override_path
        .or(scenario.initial_state.as_deref())
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "scenario '{}' has no initial_state and none was given",
                scenario.name
            ))
        })?;
    Ok(ad_results::load_initial_state(path)?)
}

/// Load the scenario and everything it references without running it.
pub fn validate_scenario_files(path: &Path) -> AppResult<ScenarioSummary> {
    let scenario = load_scenario(path)?;
    let substrates = load_substrates(&scenario.substrates)?;
    check_slots(&scenario, &substrates.db)?;
    if scenario.initial_state.is_some() {
        load_initial_state(&scenario, None)?;
    }
    scenario.feed_schedule()?;
    let grid = scenario.time_grid()?;

    Ok(ScenarioSummary {
        name: scenario.name.clone(),
        substrate_count: substrates.db.len(),
        slot_count: scenario.feed.slots.len(),
        enabled_slots: scenario
            .feed
            .slots
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.substrate_id.clone())
            .collect(),
        window_count: scenario.feed.windows.len(),
        interval_hours: scenario.feed.interval_hours,
        grid_points: grid.len(),
        end_days: grid.end_days(),
        initial_state: scenario.initial_state.clone(),
    })
}
