//! Reduction operations for [`crate::types::DataSet`].

use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count non-null values.
    Count,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls. Always `Float64` (or `Null`).
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - For `Sum`/`Min`/`Max`/`Mean`, returns `Some(Value::Null)` if there are no non-null values,
///   or if the column is not numeric.
/// - For `Count`, always returns `Some(Value::Int64(non_null_count))`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;
    let data_type = dataset.schema.fields.get(idx)?.data_type;

    match op {
        ReduceOp::Count => {
            let n = dataset.column_values(idx).filter(|v| !v.is_null()).count();
            Some(Value::Int64(n as i64))
        }
        ReduceOp::Mean => Some(mean(dataset, idx)),
        ReduceOp::Sum | ReduceOp::Min | ReduceOp::Max => Some(reduce_numeric_typed(dataset, idx, data_type, op)),
    }
}

fn mean(dataset: &DataSet, idx: usize) -> Value {
    let (sum, n) = dataset.reduce_rows((0.0_f64, 0_usize), |(sum, n), row| {
        match row.get(idx).and_then(Value::as_f64) {
            Some(v) => (sum + v, n + 1),
            None => (sum, n),
        }
    });
    if n == 0 {
        Value::Null
    } else {
        Value::Float64(sum / n as f64)
    }
}

fn reduce_numeric_typed(dataset: &DataSet, idx: usize, data_type: DataType, op: ReduceOp) -> Value {
    match data_type {
        DataType::Int64 => {
            let acc = dataset.reduce_rows(None, |acc: Option<i64>, row| match row.get(idx) {
                Some(Value::Int64(v)) => Some(match (op, acc) {
                    (ReduceOp::Sum, Some(a)) => a.saturating_add(*v),
                    (ReduceOp::Min, Some(a)) => a.min(*v),
                    (ReduceOp::Max, Some(a)) => a.max(*v),
                    (_, _) => acc.unwrap_or(*v),
                }),
                _ => acc,
            });
            acc.map(Value::Int64).unwrap_or(Value::Null)
        }
        DataType::Float64 => {
            let acc = dataset.reduce_rows(None, |acc: Option<f64>, row| match row.get(idx) {
                Some(Value::Float64(v)) => Some(match (op, acc) {
                    (ReduceOp::Sum, Some(a)) => a + v,
                    (ReduceOp::Min, Some(a)) => a.min(*v),
                    (ReduceOp::Max, Some(a)) => a.max(*v),
                    (_, _) => acc.unwrap_or(*v),
                }),
                _ => acc,
            });
            acc.map(Value::Float64).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}
