//! Scenario validation logic.

use std::collections::HashSet;

use crate::schema::{FeedDef, ReactorDef, Scenario};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Window {window} has {actual} rates, expected {expected}")]
    WindowLength {
        window: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }

    validate_reactor(&scenario.reactor)?;
    validate_feed(&scenario.feed)?;

    positive("time.step_days", scenario.time.step_days)?;
    let end = scenario.time.end_days;
    if !(end.is_finite() && end >= 0.0) {
        return Err(invalid("time.end_days", end, "must be non-negative"));
    }
    positive(
        "integrator.max_substep_days",
        scenario.integrator.max_substep_days,
    )?;
    Ok(())
}

fn validate_reactor(reactor: &ReactorDef) -> Result<(), ValidationError> {
    positive("reactor.v_liq_m3", reactor.v_liq_m3)?;
    positive("reactor.v_gas_m3", reactor.v_gas_m3)?;
    positive("reactor.temperature_k", reactor.temperature_k)?;
    positive("reactor.p_atm_bar", reactor.p_atm_bar)?;
    if !(reactor.k_la_per_d.is_finite() && reactor.k_la_per_d >= 0.0) {
        return Err(invalid(
            "reactor.k_la_per_d",
            reactor.k_la_per_d,
            "must be non-negative",
        ));
    }
    Ok(())
}

fn validate_feed(feed: &FeedDef) -> Result<(), ValidationError> {
    positive("feed.interval_hours", feed.interval_hours)?;

    let mut ids = HashSet::new();
    for slot in &feed.slots {
        if !ids.insert(slot.substrate_id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: slot.substrate_id.clone(),
                context: "feed slots".to_string(),
            });
        }
    }

    if feed.windows.is_empty() {
        return Err(invalid("feed.windows", "[]", "at least one window required"));
    }
    for (window, rates) in feed.windows.iter().enumerate() {
        if rates.len() != feed.slots.len() {
            return Err(ValidationError::WindowLength {
                window,
                expected: feed.slots.len(),
                actual: rates.len(),
            });
        }
        for (slot, (&rate, def)) in rates.iter().zip(&feed.slots).enumerate() {
            let field = format!("feed.windows[{window}][{slot}]");
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(invalid(field, rate, "rate must be non-negative"));
            }
            if !def.enabled && rate != 0.0 {
                return Err(invalid(
                    field,
                    rate,
                    "slot is not enabled for dosing",
                ));
            }
        }
    }
    Ok(())
}
