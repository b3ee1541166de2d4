//! Excel (`.xlsx` / `.xls`) ingestion implementation.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{self, CellKind, TypeCandidate};

/// Ingest an in-memory Excel workbook into a `DataSet`.
///
/// Behavior:
/// - Uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Infers a type per column from the remaining rows, then converts cells into typed `Value`s
pub fn ingest_excel_from_bytes(bytes: Vec<u8>) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::Malformed {
            message: "workbook has no sheets".to_string(),
        })?;

    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&sheet, &range)
}

fn ingest_sheet_range(sheet: &str, range: &Range<Data>) -> IngestionResult<DataSet> {
    let (header_row_idx, header_cells) = find_header_row(range).ok_or_else(|| {
        IngestionError::Malformed {
            message: format!("sheet '{sheet}' has no non-empty rows (no header row found)"),
        }
    })?;
    let headers = infer::normalize_headers(header_cells);
    let width = headers.len();

    let body: Vec<&[Data]> = range.rows().skip(header_row_idx + 1).collect();

    let mut candidates = vec![TypeCandidate::default(); width];
    for row in &body {
        for (idx, cell) in row.iter().take(width).enumerate() {
            if let Some(kind) = classify_cell(cell) {
                candidates[idx].update(kind);
            }
        }
    }

    let schema = Schema::new(
        headers
            .into_iter()
            .zip(candidates.iter())
            .map(|(name, candidate)| Field::new(name, candidate.decide()))
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(body.len());
    for (offset, row) in body.iter().enumerate() {
        // Report 1-based row number (Excel-like).
        let user_row = header_row_idx + offset + 2;

        let mut out_row: Vec<Value> = Vec::with_capacity(width);
        for (idx, field) in schema.fields.iter().enumerate() {
            let cell = row.get(idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            out_row.push(convert_cell(user_row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema, rows))
}

fn find_header_row(range: &Range<Data>) -> Option<(usize, Vec<String>)> {
    range.rows().enumerate().find_map(|(idx0, row)| {
        let non_empty = row.iter().any(|c| !matches!(c, Data::Empty));
        non_empty.then(|| (idx0, row.iter().map(cell_to_header_string).collect()))
    })
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

/// `None` for cells that load as null.
fn classify_cell(c: &Data) -> Option<CellKind> {
    match c {
        Data::Empty | Data::Error(_) => None,
        Data::Int(_) => Some(CellKind::Int),
        Data::Float(f) if is_integral(*f) => Some(CellKind::Int),
        Data::Float(_) => Some(CellKind::Float),
        Data::Bool(_) => Some(CellKind::Bool),
        Data::DateTime(_) => Some(CellKind::DateTime),
        Data::DateTimeIso(s) if infer::parse_datetime(s).is_some() => Some(CellKind::DateTime),
        Data::String(s) if infer::is_na(s) => None,
        Data::String(s) => Some(infer::classify_str(s)),
        Data::DateTimeIso(_) | Data::DurationIso(_) => Some(CellKind::Text),
    }
}

fn is_integral(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if classify_cell(c).is_none() {
        return Ok(Value::Null);
    }

    let converted = match (data_type, c) {
        (DataType::Utf8, Data::String(s)) => Some(Value::Utf8(s.clone())),
        (DataType::Utf8, other) => Some(Value::Utf8(cell_to_header_string(other))),
        (DataType::Int64, Data::Int(i)) => Some(Value::Int64(*i)),
        (DataType::Int64, Data::Float(f)) if is_integral(*f) => Some(Value::Int64(*f as i64)),
        (DataType::Int64, Data::String(s)) => s.trim().parse::<i64>().ok().map(Value::Int64),
        (DataType::Float64, Data::Float(f)) => Some(Value::Float64(*f)),
        (DataType::Float64, Data::Int(i)) => Some(Value::Float64(*i as f64)),
        (DataType::Float64, Data::String(s)) => infer::parse_float(s.trim()).map(Value::Float64),
        (DataType::Bool, Data::Bool(b)) => Some(Value::Bool(*b)),
        (DataType::Bool, Data::String(s)) => infer::parse_bool(s.trim()).map(Value::Bool),
        (DataType::DateTime, Data::DateTime(dt)) => dt.as_datetime().map(Value::DateTime),
        (DataType::DateTime, Data::DateTimeIso(s) | Data::String(s)) => {
            infer::parse_datetime(s.trim()).map(Value::DateTime)
        }
        _ => None,
    };

    converted.ok_or_else(|| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: c.to_string(),
        message: format!("expected {data_type:?}"),
    })
}
