//! Scenario validation logic.

use std::collections::HashSet;

use crate::schema::{FluxLawDef, Scenario};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Check a scenario before it is compiled.
///
/// Stricter than the model API: a repeated flux pair is an error here rather
/// than a replacement.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    let mut keys = HashSet::from([0_u32]);
    for reservoir in &scenario.reservoirs {
        if reservoir.key == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("reservoir '{}' key", reservoir.name),
                value: "0".to_string(),
                reason: "key 0 is the external reservoir".to_string(),
            });
        }
        if !keys.insert(reservoir.key) {
            return Err(ValidationError::DuplicateId {
                id: reservoir.key.to_string(),
                context: "reservoirs".to_string(),
            });
        }
        if !reservoir.m0.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("reservoir {} m0", reservoir.key),
                value: reservoir.m0.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    let mut pairs = HashSet::new();
    for flux in &scenario.fluxes {
        let id = format!("{:02}_{:02}", flux.from, flux.to);
        if flux.from == flux.to {
            return Err(ValidationError::InvalidValue {
                field: "flux".to_string(),
                value: id,
                reason: "source and destination must differ".to_string(),
            });
        }
        for endpoint in [flux.from, flux.to] {
            if !keys.contains(&endpoint) {
                return Err(ValidationError::MissingReference {
                    id: endpoint.to_string(),
                    context: format!("flux {id}"),
                });
            }
        }
        if !pairs.insert((flux.from, flux.to)) {
            return Err(ValidationError::DuplicateId {
                id,
                context: "fluxes".to_string(),
            });
        }
        validate_law(&id, &flux.law)?;
    }

    let run = &scenario.run;
    for (field, value) in [("run.t_start", run.t_start), ("run.t_end", run.t_end)] {
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    if !(run.t_step.is_finite() && run.t_step > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "run.t_step".to_string(),
            value: run.t_step.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if run.t_end <= run.t_start {
        return Err(ValidationError::InvalidValue {
            field: "run.t_end".to_string(),
            value: run.t_end.to_string(),
            reason: format!("must be greater than t_start ({})", run.t_start),
        });
    }

    Ok(())
}

fn validate_law(id: &str, law: &FluxLawDef) -> Result<(), ValidationError> {
    let params = match *law {
        FluxLawDef::Constant { rate } => vec![("rate", rate)],
        FluxLawDef::Proportional { k } => vec![("k", k)],
        FluxLawDef::Linear { rate, slope } => vec![("rate", rate), ("slope", slope)],
    };
    for (name, value) in params {
        if !value.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("flux {id} law.{name}"),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}
