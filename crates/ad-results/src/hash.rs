//! Content-based hashing for run IDs.

use ad_core::ReactorState;
use ad_scenario::Scenario;
use sha2::{Digest, Sha256};

/// Hash of everything that determines a run's output.
///
/// `substrates` is the raw substrate document, so edits to the database
/// invalidate cached runs even when the scenario file is unchanged.
pub fn compute_run_id(
    scenario: &Scenario,
    initial: &ReactorState,
    substrates: &str,
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());

    for v in initial.as_slice() {
        hasher.update(v.to_bits().to_le_bytes());
    }

    hasher.update(substrates.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::Compartment;

    fn scenario() -> Scenario {
        serde_json::from_value(serde_json::json!({
            "version": 2,
            "name": "hash",
            "substrates": "substrates.yaml",
            "feed": {
                "interval_hours": 48.0,
                "slots": [{ "substrate_id": "maize" }],
                "windows": [[15.0]]
            },
            "time": { "end_days": 2.0, "step_days": 1.0 }
        }))
        .unwrap()
    }

    #[test]
    fn hash_stability() {
        let s = ReactorState::zeros();
        let a = compute_run_id(&scenario(), &s, "subs", "v1");
        let b = compute_run_id(&scenario(), &s, "subs", "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let s = ReactorState::zeros();
        let base = compute_run_id(&scenario(), &s, "subs", "v1");

        let mut other = scenario();
        other.feed.windows[0][0] = 16.0;
        assert_ne!(base, compute_run_id(&other, &s, "subs", "v1"));

        let s2 = s.clone().with(Compartment::SAc, 0.1);
        assert_ne!(base, compute_run_id(&scenario(), &s2, "subs", "v1"));
        assert_ne!(base, compute_run_id(&scenario(), &s, "subs2", "v1"));
        assert_ne!(base, compute_run_id(&scenario(), &s, "subs", "v2"));
    }
}
