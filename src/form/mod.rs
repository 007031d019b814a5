pub mod constraints;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{DomError, Document, Input, InputType, Node};

pub const COUNT_FIELD_ID: &str = "records_count";
pub const CONTAINER_ID: &str = "records";
pub const NUMERIC_STEP: &str = "0.01";
pub const DEFAULT_MAX_RECORDS: usize = 500;

/// One of the four inputs every record group carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Sn,
    Description,
    Rate,
    Quantity,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Sn, Field::Description, Field::Rate, Field::Quantity];

    pub fn key(self) -> &'static str {
        match self {
            Self::Sn => "sn",
            Self::Description => "description",
            Self::Rate => "rate",
            Self::Quantity => "quantity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sn => "S.no:",
            Self::Description => "Description:",
            Self::Rate => "Rate:",
            Self::Quantity => "Quantity:",
        }
    }

    pub fn input_type(self) -> InputType {
        match self {
            Self::Sn | Self::Description => InputType::Text,
            Self::Rate | Self::Quantity => InputType::Number,
        }
    }

    pub fn step(self) -> Option<&'static str> {
        match self.input_type() {
            InputType::Number => Some(NUMERIC_STEP),
            InputType::Text => None,
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn id(self, index: usize) -> String {
        FieldId { field: self, index }.to_string()
    }
}

/// The `<field>_<index>` id shared by an input and its label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub field: Field,
    pub index: usize,
}

impl FieldId {
    pub fn parse(value: &str) -> Option<Self> {
        crate::utils::parse_field_id(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field.key(), self.index)
    }
}

/// How the raw text of the count field turns into a number of records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountPolicy {
    /// Loop semantics of `for (i = 0; i < value; i++)` over the raw text:
    /// anything non-numeric or non-positive gives no records.
    #[default]
    Lenient,
    /// Only a non-negative integer literal is accepted.
    Strict,
}

impl CountPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lenient" | "loose" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountError {
    #[error("invalid record count '{raw}', expected a non-negative integer")]
    Invalid { raw: String },

    #[error("record count '{raw}' exceeds the maximum of {max}")]
    TooLarge { raw: String, max: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Count(#[from] CountError),
}

pub fn resolve_count(raw: &str, policy: CountPolicy, max: usize) -> Result<usize, CountError> {
    let count = match policy {
        CountPolicy::Lenient => coerce_lenient(raw),
        CountPolicy::Strict => parse_strict(raw)?,
    };
    if count > max {
        return Err(CountError::TooLarge {
            raw: raw.trim().to_string(),
            max,
        });
    }
    Ok(count)
}

fn coerce_lenient(raw: &str) -> usize {
    let trimmed = raw.trim();
    if !crate::utils::is_decimal(trimmed) {
        return 0;
    }
    // well-formed literals past f64 range parse to an infinity
    let value: f64 = trimmed.parse().unwrap_or(0.0);
    if value <= 0.0 {
        return 0;
    }
    // `i < 2.5` still admits i = 2; float to int casts saturate
    value.ceil() as usize
}

fn parse_strict(raw: &str) -> Result<usize, CountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CountError::Invalid {
            raw: raw.to_string(),
        });
    }
    // all digits, so the only parse failure is overflow
    Ok(trimmed.parse::<usize>().unwrap_or(usize::MAX))
}

/// The heading, labels and inputs for the record at `index`.
pub fn record_group(index: usize) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(1 + Field::ALL.len() * 4);
    nodes.push(Node::Heading {
        level: 3,
        text: format!("Record {}", index + 1),
    });
    for field in Field::ALL {
        let id = field.id(index);
        nodes.push(Node::Label {
            for_id: id.clone(),
            text: field.label().to_string(),
        });
        let mut input = Input::new(id, field.input_type()).required();
        if let Some(step) = field.step() {
            input = input.with_step(step);
        }
        nodes.push(Node::Input(input));
        nodes.push(Node::LineBreak);
        nodes.push(Node::LineBreak);
    }
    nodes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormGenerator {
    pub policy: CountPolicy,
    pub max_records: usize,
}

impl Default for FormGenerator {
    fn default() -> Self {
        Self {
            policy: CountPolicy::Lenient,
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

impl FormGenerator {
    pub fn new(policy: CountPolicy, max_records: usize) -> Self {
        Self {
            policy,
            max_records,
        }
    }

    /// Reads `records_count`, clears `records` and refills it with one
    /// record group per index. Returns the number of groups written.
    ///
    /// The container is left untouched when the count is rejected or a
    /// generated id is already used outside it.
    pub fn add_record_inputs(&self, doc: &mut Document) -> Result<usize, FormError> {
        let raw = doc.value(COUNT_FIELD_ID)?.to_string();
        doc.container(CONTAINER_ID)?;
        let count = resolve_count(&raw, self.policy, self.max_records)?;
        check_free_ids(doc, count)?;

        let container = doc.container_mut(CONTAINER_ID)?;
        container.clear();
        for index in 0..count {
            for node in record_group(index) {
                container.push(node);
            }
        }

        tracing::debug!(
            count,
            raw = raw.as_str(),
            policy = self.policy.as_str(),
            "rebuilt record inputs"
        );
        Ok(count)
    }
}

/// Ids elsewhere in the document must not collide with the ones the
/// generator is about to write.
fn check_free_ids(doc: &Document, count: usize) -> Result<(), DomError> {
    let taken: HashSet<&str> = doc.ids_outside(CONTAINER_ID).into_iter().collect();
    for index in 0..count {
        for field in Field::ALL {
            let id = field.id(index);
            if taken.contains(id.as_str()) {
                return Err(DomError::DuplicateId { id });
            }
        }
    }
    Ok(())
}

/// Runs the generator with the lenient policy and default limit.
pub fn add_record_inputs(doc: &mut Document) -> Result<usize, FormError> {
    FormGenerator::default().add_record_inputs(doc)
}
