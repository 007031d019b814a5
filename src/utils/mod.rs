use std::sync::OnceLock;

use regex::Regex;

use crate::form::{Field, FieldId};

static FIELD_ID_RE: OnceLock<Regex> = OnceLock::new();
static DECIMAL_RE: OnceLock<Regex> = OnceLock::new();

fn field_id_regex() -> &'static Regex {
    FIELD_ID_RE.get_or_init(|| {
        Regex::new(r"^(sn|description|rate|quantity)_(0|[1-9][0-9]*)$").expect("static regex")
    })
}

fn decimal_regex() -> &'static Regex {
    // the HTML "valid floating-point number" grammar
    DECIMAL_RE.get_or_init(|| {
        Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
            .expect("static regex")
    })
}

/// Splits `rate_3` into its field and record index.
pub fn parse_field_id(value: &str) -> Option<FieldId> {
    let caps = field_id_regex().captures(value)?;
    let field = Field::parse(caps.get(1)?.as_str())?;
    let index = caps.get(2)?.as_str().parse().ok()?;
    Some(FieldId { field, index })
}

/// Whether `value` is written in the HTML number grammar, whatever its
/// magnitude.
pub fn is_decimal(value: &str) -> bool {
    decimal_regex().is_match(value)
}

pub fn parse_decimal(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value is empty".to_string());
    }
    if !is_decimal(trimmed) {
        return Err("expected a decimal number".to_string());
    }
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| "expected a decimal number".to_string())?;
    if !parsed.is_finite() {
        return Err("number is out of range".to_string());
    }
    Ok(parsed)
}

pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}
