//! Unified ingestion entrypoint.
//!
//! Most callers should use [`load`] or [`ingest_from_reader`], which pick a parser from the
//! upload's filename and produce a [`crate::types::DataSet`] with an inferred schema.
//!
//! - The reader is rewound to its start before parsing, so a stream that was already inspected
//!   (or loaded once) still yields every row.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, excel};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet workbooks (`.xlsx`, `.xls`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Parse an ingestion format from a filename's suffix (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load a named upload with default options.
///
/// ```
/// use std::io::Cursor;
///
/// use data_analyst_api::ingestion::load;
///
/// # fn main() -> Result<(), data_analyst_api::IngestionError> {
/// let ds = load("people.csv", Cursor::new(b"a,b\n1,2\n3,4\n".to_vec()))?;
/// assert_eq!(ds.row_count(), 2);
/// # Ok(())
/// # }
/// ```
pub fn load<R: Read + Seek>(filename: &str, reader: R) -> IngestionResult<DataSet> {
    ingest_from_reader(filename, reader, &IngestionOptions::default())
}

/// Unified ingestion entry point for uploaded streams.
///
/// - The format comes from the suffix of `filename`; unknown suffixes fail with
///   [`IngestionError::UnsupportedFormat`] before the reader is touched.
/// - The reader is rewound to offset 0, then parsed in full. No partial table is ever returned.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn ingest_from_reader<R: Read + Seek>(
    filename: &str,
    reader: R,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let format = IngestionFormat::from_filename(filename);
    let ctx = IngestionContext {
        filename: filename.to_string(),
        format,
    };

    let result = match format {
        Some(fmt) => ingest_with_format(fmt, reader),
        None => Err(IngestionError::UnsupportedFormat {
            filename: filename.to_string(),
        }),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.schema.fields.len(),
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn ingest_with_format<R: Read + Seek>(format: IngestionFormat, mut reader: R) -> IngestionResult<DataSet> {
    reader.seek(SeekFrom::Start(0))?;

    match format {
        IngestionFormat::Csv => csv::ingest_csv_from_reader(reader),
        IngestionFormat::Excel => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            excel::ingest_excel_from_bytes(bytes)
        }
    }
}
