//! Per-column summary statistics over the numeric columns of a [`DataSet`].

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::types::{DataSet, Value};

use super::reduce::{reduce, ReduceOp};

/// Statistics for one numeric column.
///
/// `mean`, `min` and `max` are null when the column has no non-null values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    /// Column name.
    pub name: String,
    /// Arithmetic mean of the non-null values.
    pub mean: Option<f64>,
    /// Smallest non-null value, typed like the column.
    pub min: Value,
    /// Largest non-null value, typed like the column.
    pub max: Value,
    /// Number of non-null values.
    pub count: usize,
}

/// Statistics for every numeric column, in schema order.
///
/// Serializes as `{numeric_columns, mean, min, max, count}` where each of the last four is an
/// object keyed by column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnStatistics>,
}

impl SummaryStatistics {
    /// Names of the summarized columns, in schema order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Statistics for column `name`, if it was summarized.
    pub fn get(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Summarize every numeric (`Int64`/`Float64`) column; other columns are skipped.
pub fn summarize(dataset: &DataSet) -> SummaryStatistics {
    let columns = dataset
        .schema
        .fields
        .iter()
        .filter(|f| f.data_type.is_numeric())
        .map(|f| {
            let stat = |op| reduce(dataset, &f.name, op).unwrap_or(Value::Null);
            let count = match stat(ReduceOp::Count) {
                Value::Int64(n) => n as usize,
                _ => 0,
            };
            ColumnStatistics {
                name: f.name.clone(),
                mean: stat(ReduceOp::Mean).as_f64(),
                min: stat(ReduceOp::Min),
                max: stat(ReduceOp::Max),
                count,
            }
        })
        .collect();

    SummaryStatistics { columns }
}

/// Serializes one statistic of every column as `{name: value}`.
struct PerColumn<'a, F> {
    columns: &'a [ColumnStatistics],
    pick: F,
}

impl<F, T> Serialize for PerColumn<'_, F>
where
    F: Fn(&ColumnStatistics) -> T,
    T: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(&column.name, &(self.pick)(column))?;
        }
        map.end()
    }
}

impl Serialize for SummaryStatistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns.as_slice();
        let names: Vec<&str> = self.numeric_columns().collect();

        let mut out = serializer.serialize_struct("SummaryStatistics", 5)?;
        out.serialize_field("numeric_columns", &names)?;
        out.serialize_field("mean", &PerColumn { columns, pick: |c: &ColumnStatistics| c.mean })?;
        out.serialize_field("min", &PerColumn { columns, pick: |c: &ColumnStatistics| c.min.clone() })?;
        out.serialize_field("max", &PerColumn { columns, pick: |c: &ColumnStatistics| c.max.clone() })?;
        out.serialize_field("count", &PerColumn { columns, pick: |c: &ColumnStatistics| c.count })?;
        out.end()
    }
}
