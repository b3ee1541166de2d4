//! Column type inference and header normalization shared by the CSV and Excel loaders.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::DataType;

/// Cell contents treated as missing, matching the NA set spreadsheet users expect.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Shape of a single non-null cell, as seen by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

/// Running type decision for one column.
///
/// Starts with every type possible and narrows as cells are observed.
#[derive(Debug, Clone, Copy)]
pub struct TypeCandidate {
    observed: bool,
    int: bool,
    float: bool,
    boolean: bool,
    datetime: bool,
}

impl Default for TypeCandidate {
    fn default() -> Self {
        Self {
            observed: false,
            int: true,
            float: true,
            boolean: true,
            datetime: true,
        }
    }
}

impl TypeCandidate {
    pub fn update(&mut self, kind: CellKind) {
        self.observed = true;
        match kind {
            CellKind::Int => {
                self.boolean = false;
                self.datetime = false;
            }
            CellKind::Float => {
                self.int = false;
                self.boolean = false;
                self.datetime = false;
            }
            CellKind::Bool => {
                self.int = false;
                self.float = false;
                self.datetime = false;
            }
            CellKind::DateTime => {
                self.int = false;
                self.float = false;
                self.boolean = false;
            }
            CellKind::Text => {
                self.int = false;
                self.float = false;
                self.boolean = false;
                self.datetime = false;
            }
        }
    }

    /// A column without any non-null cell is numeric (all null).
    pub fn decide(&self) -> DataType {
        if !self.observed {
            DataType::Float64
        } else if self.int {
            DataType::Int64
        } else if self.float {
            DataType::Float64
        } else if self.boolean {
            DataType::Bool
        } else if self.datetime {
            DataType::DateTime
        } else {
            DataType::Utf8
        }
    }
}

/// `true` if `raw` denotes a missing value.
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw.trim())
}

/// Classify a non-null text cell.
pub fn classify_str(raw: &str) -> CellKind {
    let trimmed = raw.trim();
    if trimmed.parse::<i64>().is_ok() {
        CellKind::Int
    } else if parse_float(trimmed).is_some() {
        CellKind::Float
    } else if parse_bool(trimmed).is_some() {
        CellKind::Bool
    } else if parse_datetime(trimmed).is_some() {
        CellKind::DateTime
    } else {
        CellKind::Text
    }
}

/// Decimal or scientific notation. At least one digit is required, so words like `inf` stay text.
pub fn parse_float(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Only `true`/`false` (any case) count as booleans, so `0`/`1` columns stay numeric.
pub fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Accepts `YYYY-MM-DD` (midnight) and the common date-time layouts.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Make header names unique and non-empty.
///
/// Empty names become `Unnamed: <index>`; repeats of `name` become `name.1`, `name.2`, ...
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();
    for (idx, name) in raw.into_iter().enumerate() {
        let name = name.as_ref().trim();
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        if let Some(&taken) = seen.get(&base) {
            let mut n = taken;
            loop {
                n += 1;
                candidate = format!("{base}.{n}");
                if !seen.contains_key(&candidate) {
                    break;
                }
            }
            seen.insert(base, n);
        }
        seen.entry(candidate.clone()).or_insert(0);
        out.push(candidate);
    }
    out
}
