// SPDX-License-Identifier: Apache-2.0

use crate::IngestError;
use calamine::{Data, Reader};
use coursemap_model::RawRow;
use std::io::Cursor;

/// Upload formats the ingestion pipeline accepts. Spreadsheets decode to raw
/// header->cell rows; JSON carries already-normalized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
    Json,
}

/// Sniffs the payload from its leading bytes: zip container -> XLSX, OLE2
/// container -> legacy XLS, JSON array/object start -> JSON, anything else is
/// treated as CSV.
#[must_use]
pub fn detect_format(bytes: &[u8]) -> SourceFormat {
    if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return SourceFormat::Workbook;
    }
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') | Some(b'{') => SourceFormat::Json,
        _ => SourceFormat::Csv,
    }
}

/// Decodes the first sheet of an XLSX/XLS workbook: the first row is the
/// header set, every following row maps header -> rendered cell. Blank rows
/// are skipped; empty cells are omitted from the row map.
pub fn decode_workbook_rows(bytes: &[u8]) -> Result<Vec<RawRow>, IngestError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestError(format!("unreadable workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError("workbook has no sheets".to_string()))?
        .map_err(|e| IngestError(format!("unreadable sheet: {e}")))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(render_cell).collect();

    let mut out = Vec::new();
    for cells in rows {
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(cells) {
            if header.is_empty() {
                continue;
            }
            let value = render_cell(cell);
            if !value.is_empty() {
                row.insert(header.clone(), value);
            }
        }
        if !row.is_empty() {
            out.push(row);
        }
    }
    Ok(out)
}

/// Decodes CSV bytes with the same header->cell row shape as the workbook
/// path.
pub fn decode_csv_rows(bytes: &[u8]) -> Result<Vec<RawRow>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError(format!("unreadable CSV header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError(format!("unreadable CSV row: {e}")))?;
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if !header.is_empty() && !value.is_empty() {
                row.insert(header.clone(), value.to_string());
            }
        }
        if !row.is_empty() {
            out.push(row);
        }
    }
    Ok(out)
}

// Integral floats render without a fractional tail so a spreadsheet cell
// holding 3 becomes the credit string "3", matching the string-typed schema.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        other => other.to_string(),
    }
}
