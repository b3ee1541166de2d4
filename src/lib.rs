//! `data-analyst-api` loads CSV/Excel uploads into an in-memory [`types::DataSet`], summarizes
//! its numeric columns and renders charts as base64 PNG, behind a small HTTP API.
//!
//! Column types are inferred once at load time and carried in the [`types::Schema`]:
//!
//! - [`types::DataType::Int64`], [`types::DataType::Float64`] (the "numeric" types)
//! - [`types::DataType::Bool`]
//! - [`types::DataType::DateTime`]
//! - [`types::DataType::Utf8`]
//!
//! Empty cells and the usual NA markers (`NA`, `null`, `NaN`, ...) load as [`types::Value::Null`].
//!
//! ## Quick example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use data_analyst_api::chart::{self, ChartRequest};
//! use data_analyst_api::ingestion::load;
//! use data_analyst_api::processing::summarize;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let csv = b"city,temp\nOslo,3.5\nRome,18.0\n".to_vec();
//! let ds = load("weather.csv", Cursor::new(csv))?;
//!
//! let stats = summarize(&ds);
//! assert_eq!(stats.get("temp").unwrap().count, 2);
//!
//! let request = ChartRequest::parse("bar", "city", Some("temp".to_string()))?;
//! chart::validate(&ds, &request)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, CSV/Excel parsing, type inference
//! - [`types`]: schema + in-memory dataset types
//! - [`processing`]: reductions and summary statistics
//! - [`chart`]: chart validation, aggregation and PNG rendering
//! - [`server`]: axum router and handlers
//! - [`error`]: error types used across the crate

pub mod chart;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod server;
pub mod types;

pub use error::{ChartError, ChartResult, IngestionError, IngestionResult};
