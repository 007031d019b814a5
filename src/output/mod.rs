pub mod page;

use serde::Serialize;

use crate::dom::{escape_html, Container, InputType};
use crate::form::FieldId;
use crate::records::table::{RecordTable, HEADERS, HEADER_SHADING};
use crate::records::{OfferDetails, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldDescriptor {
    pub record: usize,
    pub id: String,
    pub name: String,
    pub label: String,
    pub input_type: InputType,
    pub required: bool,
    pub step: Option<String>,
}

pub fn describe_fields(container: &Container) -> Vec<FieldDescriptor> {
    container
        .inputs()
        .map(|input| {
            let parsed = FieldId::parse(&input.id);
            FieldDescriptor {
                record: parsed.map(|p| p.index + 1).unwrap_or_default(),
                id: input.id.clone(),
                name: input.name.clone(),
                label: parsed
                    .map(|p| p.field.label().trim_end_matches(':').to_string())
                    .unwrap_or_default(),
                input_type: input.input_type,
                required: input.required,
                step: input.step.clone(),
            }
        })
        .collect()
}

pub fn render_fragment(format: OutputFormat, container: &Container) -> Vec<u8> {
    match format {
        OutputFormat::Html => {
            let mut out = container.inner_html();
            out.push('\n');
            out.into_bytes()
        }
        OutputFormat::Json => render_json(&describe_fields(container)),
        OutputFormat::Text => {
            let mut out = String::new();
            for input in container.inputs() {
                out.push_str(&input.id);
                out.push('\n');
            }
            out.into_bytes()
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordOutput {
    pub sn: String,
    pub description: String,
    pub rate: f64,
    pub quantity: f64,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordsReport<'a> {
    #[serde(skip_serializing_if = "offer_is_empty")]
    pub offer: &'a OfferDetails,
    pub records: Vec<RecordOutput>,
}

fn offer_is_empty(offer: &&OfferDetails) -> bool {
    offer.is_empty()
}

pub fn build_report<'a>(records: &[Record], offer: &'a OfferDetails) -> RecordsReport<'a> {
    RecordsReport {
        offer,
        records: records
            .iter()
            .map(|r| RecordOutput {
                sn: r.sn.clone(),
                description: r.description.clone(),
                rate: r.rate,
                quantity: r.quantity,
                amount: r.amount(),
            })
            .collect(),
    }
}

pub fn render_records(format: OutputFormat, records: &[Record], offer: &OfferDetails) -> Vec<u8> {
    match format {
        OutputFormat::Html => render_records_html(records),
        OutputFormat::Json => render_json(&build_report(records, offer)),
        OutputFormat::Text => render_records_text(records, offer),
    }
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"[]".to_vec());
    out.push(b'\n');
    out
}

pub fn render_records_html(records: &[Record]) -> Vec<u8> {
    let table = RecordTable::from_records(records);
    let mut out = String::new();
    out.push_str("<table class=\"records-table\">\n  <thead>\n    <tr>");
    for header in HEADERS {
        out.push_str(&format!(
            "<th style=\"background-color:#{HEADER_SHADING};color:#FFFFFF;font-weight:bold;text-align:center\">{}</th>",
            escape_html(header)
        ));
    }
    out.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in &table.rows {
        out.push_str("    <tr>");
        for cell in &row.cells {
            out.push_str(&format!(
                "<td style=\"background-color:#{};color:#000000;text-align:center\">{}</td>",
                row.shading,
                escape_html(cell)
            ));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n");
    out.into_bytes()
}

pub fn render_records_text(records: &[Record], offer: &OfferDetails) -> Vec<u8> {
    let table = RecordTable::from_records(records);
    let widths = table.column_widths();
    let mut out = String::new();

    for (name, label) in OfferDetails::FIELDS {
        if let Some(value) = offer.get(name) {
            out.push_str(&format!("{label:<17}{value}\n"));
        }
    }
    if !offer.is_empty() {
        out.push('\n');
    }

    let line = |cells: &[&str]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{c:<w$}", w = *w))
            .collect();
        format!("{}\n", parts.join("  ").trim_end())
    };
    out.push_str(&line(&HEADERS));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in &table.rows {
        let cells: Vec<&str> = row.cells.iter().map(String::as_str).collect();
        out.push_str(&line(&cells));
    }
    out.into_bytes()
}
