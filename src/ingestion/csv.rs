//! CSV ingestion implementation.

use std::io::Read;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{self, TypeCandidate};

/// Ingest CSV bytes into an in-memory [`DataSet`].
///
/// Rules:
///
/// - The first record is the header row (names normalized by [`infer::normalize_headers`]).
/// - Rows shorter than the header are padded with nulls; longer rows are rejected.
/// - Column types are inferred from every non-null cell before any value is converted.
pub fn ingest_csv_from_reader<R: Read>(reader: R) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    ingest_csv_records(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_records<R: Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let raw_headers = rdr.headers()?.clone();
    if raw_headers.is_empty() {
        return Err(IngestionError::Malformed {
            message: "no columns to parse from file".to_string(),
        });
    }
    let headers = infer::normalize_headers(raw_headers.iter());
    let width = headers.len();

    let mut records: Vec<csv::StringRecord> = Vec::new();
    let mut candidates = vec![TypeCandidate::default(); width];
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > width {
            // Report 1-based row number for users; +1 again because header is row 1.
            return Err(IngestionError::Malformed {
                message: format!(
                    "expected {width} fields in line {}, saw {}",
                    row_idx0 + 2,
                    record.len()
                ),
            });
        }
        for (idx, raw) in record.iter().enumerate() {
            if !infer::is_na(raw) {
                candidates[idx].update(infer::classify_str(raw));
            }
        }
        records.push(record);
    }

    let schema = Schema::new(
        headers
            .into_iter()
            .zip(candidates.iter())
            .map(|(name, candidate)| Field::new(name, candidate.decide()))
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let mut row: Vec<Value> = Vec::with_capacity(width);
        for (idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    if infer::is_na(raw) {
        return Ok(Value::Null);
    }
    let trimmed = raw.trim();

    let parse_error = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => infer::parse_float(trimmed)
            .map(Value::Float64)
            .ok_or_else(|| parse_error("expected number".to_string())),
        DataType::Bool => infer::parse_bool(trimmed)
            .map(Value::Bool)
            .ok_or_else(|| parse_error("expected bool (true/false)".to_string())),
        DataType::DateTime => infer::parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| parse_error("expected date (YYYY-MM-DD[ HH:MM:SS])".to_string())),
    }
}
