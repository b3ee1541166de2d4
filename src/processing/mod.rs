//! In-memory computations over loaded datasets.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion.
//! It is pure: the same dataset always produces the same result.
//!
//! - [`reduce()`]: single-column reductions (count/sum/min/max/mean)
//! - [`summarize()`]: mean/min/max/count for every numeric column
//!
//! ## Example
//!
//! ```rust
//! use data_analyst_api::processing::{reduce, summarize, ReduceOp};
//! use data_analyst_api::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", DataType::Utf8),
//!     Field::new("age", DataType::Int64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Utf8("Ada".to_string()), Value::Int64(20)],
//!         vec![Value::Utf8("Bob".to_string()), Value::Int64(30)],
//!     ],
//! );
//!
//! assert_eq!(reduce(&ds, "age", ReduceOp::Sum), Some(Value::Int64(50)));
//!
//! let stats = summarize(&ds);
//! assert_eq!(stats.numeric_columns().collect::<Vec<_>>(), vec!["age"]);
//! ```

pub mod reduce;
pub mod summary;

pub use reduce::{reduce, ReduceOp};
pub use summary::{summarize, ColumnStatistics, SummaryStatistics};
