//! Schema migration framework.

use crate::ScenarioError;
use crate::schema::Scenario;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ScenarioError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ScenarioError> {
    match scenario.version {
        1 => migrate_v1_to_v2(scenario),
        v => Err(ScenarioError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 1 had a single `rates` list in force for the whole run.
fn migrate_v1_to_v2(mut scenario: Scenario) -> Result<Scenario, ScenarioError> {
    if let Some(rates) = scenario.feed.rates.take() {
        if !scenario.feed.windows.is_empty() {
            return Err(ScenarioError::Migration {
                what: "feed declares both `rates` and `windows`".to_string(),
            });
        }
        scenario.feed.windows = vec![rates];
    }
    scenario.version = 2;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = r#"
version: 1
name: legacy
substrates: substrates.yaml
feed:
  interval_hours: 24
  slots:
    - { substrate_id: maize }
  rates: [12.5]
time: { end_days: 2, step_days: 1 }
"#;

    #[test]
    fn v1_rates_become_single_window() {
        let scenario: Scenario = serde_yaml::from_str(V1).unwrap();
        let migrated = migrate_to_latest(scenario).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.feed.windows, vec![vec![12.5]]);
        assert!(migrated.feed.rates.is_none());
    }

    #[test]
    fn version_zero_has_no_path() {
        let mut scenario: Scenario = serde_yaml::from_str(V1).unwrap();
        scenario.version = 0;
        assert!(matches!(
            migrate_to_latest(scenario),
            Err(ScenarioError::Migration { .. })
        ));
    }
}
