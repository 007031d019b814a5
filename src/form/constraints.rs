use std::fmt;

use serde::Serialize;

use crate::dom::{Container, DomError, Document, Input, InputType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ValueMissing,
    BadInput,
    StepMismatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub id: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

const STEP_TOLERANCE: f64 = 1e-9;

/// First failing constraint of a single input, if any.
pub fn check_input(input: &Input) -> Option<Violation> {
    let value = input.value().trim();
    if value.is_empty() {
        if input.required {
            return Some(Violation {
                id: input.id.clone(),
                kind: ViolationKind::ValueMissing,
                message: "please fill out this field".to_string(),
            });
        }
        return None;
    }

    if input.input_type != InputType::Number {
        return None;
    }

    let number = match crate::utils::parse_decimal(value) {
        Ok(n) => n,
        Err(e) => {
            return Some(Violation {
                id: input.id.clone(),
                kind: ViolationKind::BadInput,
                message: format!("'{value}' is not a number ({e})"),
            })
        }
    };

    let step = input
        .step
        .as_deref()
        .and_then(|s| crate::utils::parse_decimal(s).ok())
        .filter(|s| *s > 0.0)?;
    if is_step_mismatch(number, step) {
        return Some(Violation {
            id: input.id.clone(),
            kind: ViolationKind::StepMismatch,
            message: format!("{value} is not a multiple of {step}"),
        });
    }
    None
}

fn is_step_mismatch(value: f64, step: f64) -> bool {
    let steps = value / step;
    (steps - steps.round()).abs() > STEP_TOLERANCE * steps.abs().max(1.0)
}

pub fn validate_container(container: &Container) -> Vec<Violation> {
    container.inputs().filter_map(check_input).collect()
}

pub fn validate(doc: &Document, container_id: &str) -> Result<Vec<Violation>, DomError> {
    Ok(validate_container(doc.container(container_id)?))
}
