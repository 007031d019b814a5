//! Reading filled-in record groups back into typed records.

pub mod table;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::Field;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub sn: String,
    pub description: String,
    pub rate: f64,
    pub quantity: f64,
}

impl Record {
    pub fn amount(&self) -> f64 {
        self.rate * self.quantity
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing form field '{id}'")]
    MissingField { id: String },

    #[error("form field '{id}' has a non-numeric value '{value}'")]
    InvalidNumber { id: String, value: String },
}

/// Builds `count` records from submitted name/value pairs. Later pairs
/// win when a name repeats.
pub fn collect_records(
    form_data: &[(String, String)],
    count: usize,
) -> Result<Vec<Record>, RecordError> {
    let fields: HashMap<&str, &str> = form_data
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let text = |field: Field, index: usize| -> Result<String, RecordError> {
        let id = field.id(index);
        fields
            .get(id.as_str())
            .map(|v| v.to_string())
            .ok_or(RecordError::MissingField { id })
    };
    let number = |field: Field, index: usize| -> Result<f64, RecordError> {
        let raw = text(field, index)?;
        crate::utils::parse_decimal(&raw).map_err(|_| RecordError::InvalidNumber {
            id: field.id(index),
            value: raw,
        })
    };

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        records.push(Record {
            sn: text(Field::Sn, index)?,
            description: text(Field::Description, index)?,
            rate: number(Field::Rate, index)?,
            quantity: number(Field::Quantity, index)?,
        });
    }
    Ok(records)
}

/// The offer fields surrounding the record groups on the cover letter form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDetails {
    pub offer_name: Option<String>,
    pub offer_no: Option<String>,
    pub company_name: Option<String>,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub manager_name: Option<String>,
    pub enquiry_sub: Option<String>,
    pub delivery_dates: Option<String>,
    pub your_name: Option<String>,
    pub contact_no: Option<String>,
}

impl OfferDetails {
    /// Form names paired with their label text, in form order.
    pub const FIELDS: [(&'static str, &'static str); 10] = [
        ("offer_name", "Offer Name:"),
        ("offer_no", "Offer No:"),
        ("company_name", "Company Name:"),
        ("city_name", "City:"),
        ("state_name", "State:"),
        ("manager_name", "Manager Name:"),
        ("enquiry_sub", "Enquiry Subject:"),
        ("delivery_dates", "Delivery Dates:"),
        ("your_name", "Your Name:"),
        ("contact_no", "Contact No:"),
    ];

    pub fn is_field(name: &str) -> bool {
        Self::FIELDS.iter().any(|(n, _)| *n == name)
    }

    pub fn from_form_data(form_data: &[(String, String)]) -> Self {
        let mut out = Self::default();
        for (name, value) in form_data {
            out.set(name, value);
        }
        out
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "offer_name" => Some(&mut self.offer_name),
            "offer_no" => Some(&mut self.offer_no),
            "company_name" => Some(&mut self.company_name),
            "city_name" => Some(&mut self.city_name),
            "state_name" => Some(&mut self.state_name),
            "manager_name" => Some(&mut self.manager_name),
            "enquiry_sub" => Some(&mut self.enquiry_sub),
            "delivery_dates" => Some(&mut self.delivery_dates),
            "your_name" => Some(&mut self.your_name),
            "contact_no" => Some(&mut self.contact_no),
            _ => None,
        }
    }

    /// Stores `value` under `name`; false when `name` is not an offer field.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match self.slot(name) {
            Some(slot) => {
                *slot = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "offer_name" => &self.offer_name,
            "offer_no" => &self.offer_no,
            "company_name" => &self.company_name,
            "city_name" => &self.city_name,
            "state_name" => &self.state_name,
            "manager_name" => &self.manager_name,
            "enquiry_sub" => &self.enquiry_sub,
            "delivery_dates" => &self.delivery_dates,
            "your_name" => &self.your_name,
            "contact_no" => &self.contact_no,
            _ => return None,
        };
        value.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        Self::FIELDS.iter().all(|(n, _)| self.get(n).is_none())
    }
}
