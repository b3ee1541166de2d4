use thiserror::Error;

use crate::chart::{Axis, ChartKind};

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for chart rendering.
pub type ChartResult<T> = Result<T, ChartError>;

/// Error type returned by ingestion functions.
///
/// Every variant except [`IngestionError::UnsupportedFormat`] means the upload could not be parsed
/// (a "malformed file"); see [`IngestionError::is_malformed`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The filename suffix is not one of `.csv`, `.xlsx`, `.xls`. The stream is never read.
    #[error("unsupported file format: '{filename}'")]
    UnsupportedFormat { filename: String },

    /// Underlying I/O error while rewinding or reading the upload.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Excel ingestion error.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The file parsed, but its shape is unusable (no header, ragged rows, empty workbook).
    #[error("malformed file: {message}")]
    Malformed { message: String },

    /// A value could not be converted into the inferred [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

impl IngestionError {
    /// `true` for every parse failure, `false` only for [`IngestionError::UnsupportedFormat`].
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnsupportedFormat { .. })
    }
}

/// Error type returned by [`crate::chart::render`].
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Unsupported chart type")]
    UnsupportedChartKind(String),

    #[error("Invalid {0} column")]
    InvalidColumn(Axis),

    /// A referenced column has the wrong type for the requested kind.
    #[error("{message}")]
    TypeMismatch { kind: ChartKind, message: String },

    /// Validation passed but there are no non-null values to draw.
    #[error("No numeric data to plot for {0} chart")]
    NothingToPlot(ChartKind),

    /// Values (or their sums and spans) overflow `f64`, so no axis can be laid out.
    #[error("Values are too large to plot as a {0} chart")]
    NonFiniteData(ChartKind),

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("png encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}

impl ChartError {
    /// `true` when the request itself was wrong, as opposed to a rendering failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Drawing(_) | Self::Encoding(_))
    }
}
