//! Chart rendering over a loaded [`DataSet`].
//!
//! [`render`] runs in three steps, and nothing is drawn until the first two succeed:
//!
//! 1. validation: referenced columns exist and have the types the [`ChartKind`] needs
//! 2. aggregation: rows are grouped/binned into a [`plot::PlotData`]
//! 3. drawing: a fresh [`canvas::Canvas`] owned by this call is drawn and PNG-encoded
//!
//! The canvas is dropped on every exit path, so no drawing state survives a call.

mod canvas;
mod plot;

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{ChartError, ChartResult};
use crate::types::{DataSet, DataType};

use canvas::Canvas;
use plot::PlotData;

/// Pixel size of every rendered chart.
pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 500;

/// Number of equal-width bins used by [`ChartKind::Histogram`].
pub const HISTOGRAM_BINS: usize = 20;

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Sum of `y` per distinct `x`.
    Bar,
    /// `y` against `x` in row order.
    Line,
    /// Counts of `x` in equal-width bins.
    Histogram,
    /// Share of rows per distinct `x`.
    Pie,
    /// One point per row.
    Scatter,
}

impl ChartKind {
    /// Lowercase wire name, as accepted by `chart_type` and echoed in responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Histogram => "histogram",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
        }
    }

    /// `"<Kind> Chart"`, e.g. `"Histogram Chart"`.
    pub fn title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Chart", first.to_ascii_uppercase(), chars.as_str()),
            None => "Chart".to_string(),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "histogram" => Ok(Self::Histogram),
            "pie" => Ok(Self::Pie),
            "scatter" => Ok(Self::Scatter),
            other => Err(ChartError::UnsupportedChartKind(other.to_string())),
        }
    }
}

/// Which column selector an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::Y => f.write_str("Y"),
        }
    }
}

/// A chart kind plus its column selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    /// `None` when the caller sent no (or an empty) `y` column.
    pub y: Option<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, x: impl Into<String>, y: Option<String>) -> Self {
        Self {
            kind,
            x: x.into(),
            y: y.filter(|name| !name.is_empty()),
        }
    }

    /// Parse the wire form. Fails with [`ChartError::UnsupportedChartKind`] before looking at
    /// any column.
    pub fn parse(kind: &str, x: impl Into<String>, y: Option<String>) -> ChartResult<Self> {
        Ok(Self::new(kind.parse()?, x, y))
    }
}

/// A PNG chart tagged with the kind that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub png: Vec<u8>,
}

impl RenderedChart {
    /// Standard (padded) base64 of the PNG bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }
}

/// Column indexes resolved by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Columns {
    pub x: usize,
    pub y: Option<usize>,
}

/// Check column existence, then the per-kind type requirements.
pub fn validate(dataset: &DataSet, request: &ChartRequest) -> ChartResult<()> {
    resolve_columns(dataset, request).map(|_| ())
}

fn resolve_columns(dataset: &DataSet, request: &ChartRequest) -> ChartResult<Columns> {
    let schema = &dataset.schema;
    let x = schema
        .index_of(&request.x)
        .ok_or(ChartError::InvalidColumn(Axis::X))?;
    let y = match request.y.as_deref() {
        Some(name) => Some(schema.index_of(name).ok_or(ChartError::InvalidColumn(Axis::Y))?),
        None => None,
    };

    let is_numeric = |idx: usize| schema.fields[idx].data_type.is_numeric();
    let mismatch = |message: &str| ChartError::TypeMismatch {
        kind: request.kind,
        message: message.to_string(),
    };

    match request.kind {
        ChartKind::Bar => {
            if !y.is_some_and(is_numeric) {
                return Err(mismatch("Y must be numeric for bar chart"));
            }
        }
        ChartKind::Histogram => {
            if !is_numeric(x) {
                return Err(mismatch("X must be numeric for histogram"));
            }
        }
        ChartKind::Scatter => {
            if !(is_numeric(x) && y.is_some_and(is_numeric)) {
                return Err(mismatch("X and Y must be numeric for scatter plot"));
            }
        }
        ChartKind::Line | ChartKind::Pie => {}
    }

    Ok(Columns { x, y })
}

/// Validate, aggregate, draw and encode one chart.
pub fn render(dataset: &DataSet, request: &ChartRequest) -> ChartResult<RenderedChart> {
    let columns = resolve_columns(dataset, request)?;
    let plot = PlotData::prepare(dataset, request.kind, columns)?;

    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT);
    canvas.draw(&request.kind.title(), &plot)?;
    let png = canvas.encode_png()?;

    Ok(RenderedChart {
        kind: request.kind,
        png,
    })
}

fn column_type(dataset: &DataSet, idx: usize) -> DataType {
    dataset.schema.fields[idx].data_type
}
