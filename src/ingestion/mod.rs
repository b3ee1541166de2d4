//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`load`] / [`ingest_from_reader`] (from [`unified`]) which:
//!
//! - detects the format from the upload's filename suffix
//! - rewinds the stream and parses it into an in-memory [`crate::types::DataSet`]
//! - infers one [`crate::types::DataType`] per column (see [`infer`])
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`excel`]

pub mod csv;
pub mod excel;
pub mod infer;
pub mod observability;
pub mod unified;

pub use observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver};
pub use unified::{ingest_from_reader, load, IngestionFormat, IngestionOptions};
