use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::dom::{DomError, Document};
use crate::form::constraints::{self, Violation};
use crate::form::{CountPolicy, FormError, FormGenerator, CONTAINER_ID, COUNT_FIELD_ID};
use crate::records::{collect_records, OfferDetails, Record, RecordError};

#[derive(Clone, Debug)]
pub enum ValuesSource {
    FilePath(String),
    Inline(Vec<(String, String)>),
}

#[derive(Clone, Debug)]
pub struct Options {
    /// Raw text placed in the `records_count` field.
    pub count: String,
    pub policy: CountPolicy,
    pub max_records: usize,
    pub values: Option<ValuesSource>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            count: "0".to_string(),
            policy: CountPolicy::Lenient,
            max_records: crate::form::DEFAULT_MAX_RECORDS,
            values: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid max_records {value}, expected positive integer")]
    InvalidMaxRecords { value: usize },

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("failed to read values file: {path}: {source}")]
    ValuesRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse values file: {path}: {source}")]
    ValuesParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("values file {path}: field '{name}' must be a scalar")]
    NonScalarValue { path: String, name: String },
}

#[derive(Clone, Debug)]
pub struct RunResult {
    pub elapsed: Duration,
    pub count: usize,
    pub document: Document,
    /// Empty unless values were supplied.
    pub violations: Vec<Violation>,
    /// Present only when values were supplied and every constraint held.
    pub records: Option<Vec<Record>>,
    pub offer: OfferDetails,
    /// Value names that were not applied, `records_count` included.
    pub unknown_fields: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.max_records == 0 {
            return Err(RunnerError::InvalidMaxRecords {
                value: options.max_records,
            });
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub async fn run(&self) -> Result<RunResult, RunnerError> {
        let started_at = Instant::now();

        let mut document = Document::records_form();
        document.set_value(COUNT_FIELD_ID, self.options.count.clone())?;
        let generator = FormGenerator::new(self.options.policy, self.options.max_records);
        let count = generator.add_record_inputs(&mut document)?;
        tracing::info!(count, "generated record inputs");

        let mut offer = OfferDetails::default();
        let mut unknown_fields = Vec::new();
        let mut violations = Vec::new();
        let mut records = None;

        if let Some(source) = self.options.values.as_ref() {
            let values = load_values(source).await?;
            for (name, value) in values {
                if offer.set(&name, &value) {
                    continue;
                }
                if name == COUNT_FIELD_ID {
                    tracing::debug!("ignoring {COUNT_FIELD_ID} in values, the count comes from options");
                    unknown_fields.push(name);
                    continue;
                }
                match document.input_mut(&name) {
                    Ok(input) => input.value = Some(value),
                    Err(_) => {
                        tracing::debug!(field = name.as_str(), "no generated input with this name");
                        unknown_fields.push(name);
                    }
                }
            }

            violations = constraints::validate(&document, CONTAINER_ID)?;
            if violations.is_empty() {
                records = Some(collect_records(&document.form_data(), count)?);
            } else {
                tracing::info!(violations = violations.len(), "form has constraint violations");
            }
        }

        Ok(RunResult {
            elapsed: started_at.elapsed(),
            count,
            document,
            violations,
            records,
            offer,
            unknown_fields,
        })
    }
}

async fn load_values(source: &ValuesSource) -> Result<Vec<(String, String)>, RunnerError> {
    let path = match source {
        ValuesSource::Inline(values) => return Ok(values.clone()),
        ValuesSource::FilePath(path) => path,
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunnerError::ValuesRead {
            path: path.to_string(),
            source: e,
        })?;
    parse_values(path, &raw)
}

/// Reads a YAML (or JSON) mapping of field name to scalar value, keeping
/// file order.
fn parse_values(path: &str, raw: &str) -> Result<Vec<(String, String)>, RunnerError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mapping: serde_yaml::Mapping =
        serde_yaml::from_str(raw).map_err(|e| RunnerError::ValuesParse {
            path: path.to_string(),
            source: e,
        })?;

    let mut out = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = match scalar_to_string(&key) {
            Some(name) => name,
            None => {
                return Err(RunnerError::NonScalarValue {
                    path: path.to_string(),
                    name: format!("{key:?}"),
                })
            }
        };
        let value = scalar_to_string(&value).ok_or_else(|| RunnerError::NonScalarValue {
            path: path.to_string(),
            name: name.clone(),
        })?;
        out.push((name, value));
    }
    Ok(out)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}
