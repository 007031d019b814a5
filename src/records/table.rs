use serde::Serialize;

use super::Record;
use crate::utils::format_decimal;

pub const HEADERS: [&str; 5] = ["S.no", "Description", "Rate", "Quantity", "Amount"];
pub const HEADER_SHADING: &str = "808080";
const EVEN_ROW_SHADING: &str = "D3D3D3";
const ODD_ROW_SHADING: &str = "FFFFFF";

/// Background colour for a body row; rows are numbered from 1.
pub fn row_shading(row_number: usize) -> &'static str {
    if row_number % 2 == 0 {
        EVEN_ROW_SHADING
    } else {
        ODD_ROW_SHADING
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: [String; 5],
    pub shading: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordTable {
    pub rows: Vec<TableRow>,
}

impl RecordTable {
    pub fn from_records(records: &[Record]) -> Self {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, r)| TableRow {
                cells: [
                    r.sn.clone(),
                    r.description.clone(),
                    format_decimal(r.rate),
                    format_decimal(r.quantity),
                    format_decimal(r.amount()),
                ],
                shading: row_shading(i + 1),
            })
            .collect();
        Self { rows }
    }

    /// Widest cell per column, headers included.
    pub fn column_widths(&self) -> [usize; 5] {
        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row.cells.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }
}
