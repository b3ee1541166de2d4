//! Aggregation from validated columns to drawable series.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::{ChartError, ChartResult};
use crate::types::{DataSet, Value};

use super::{column_type, ChartKind, Columns, HISTOGRAM_BINS};

/// Horizontal axis of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineAxis {
    /// `x` is numeric and used as the coordinate.
    Numeric,
    /// `x` is not numeric; points sit at their row position, labelled with the `x` value.
    Positional(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything a canvas needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlotData {
    Bars {
        labels: Vec<String>,
        heights: Vec<f64>,
        x_desc: String,
    },
    Lines {
        axis: LineAxis,
        series: Vec<Series>,
        x_desc: String,
    },
    Histogram {
        edges: Vec<f64>,
        counts: Vec<usize>,
    },
    Pie {
        labels: Vec<String>,
        sizes: Vec<f64>,
    },
    Scatter {
        points: Vec<(f64, f64)>,
        x_desc: String,
        y_desc: String,
    },
}

impl PlotData {
    /// Aggregate `dataset` for `kind`. Columns must already be validated for that kind.
    pub fn prepare(dataset: &DataSet, kind: ChartKind, columns: Columns) -> ChartResult<Self> {
        let name = |idx: usize| dataset.schema.fields[idx].name.clone();
        let nothing = || ChartError::NothingToPlot(kind);

        let plot = match kind {
            ChartKind::Bar => {
                let y = columns.y.ok_or_else(nothing)?;
                let groups = group_rows(dataset, columns.x, |acc: f64, row| {
                    acc + row.get(y).and_then(Value::as_f64).unwrap_or(0.0)
                });
                let (labels, heights) = groups.into_iter().unzip();
                Self::Bars {
                    labels,
                    heights,
                    x_desc: name(columns.x),
                }
            }
            ChartKind::Pie => {
                let groups = group_rows(dataset, columns.x, |acc: f64, _row| acc + 1.0);
                let (labels, sizes) = groups.into_iter().unzip();
                Self::Pie { labels, sizes }
            }
            ChartKind::Histogram => {
                let values: Vec<f64> = dataset
                    .column_values(columns.x)
                    .filter_map(Value::as_f64)
                    .collect();
                let (edges, counts) = histogram(&values, HISTOGRAM_BINS).ok_or_else(nothing)?;
                Self::Histogram { edges, counts }
            }
            ChartKind::Scatter => {
                let y = columns.y.ok_or_else(nothing)?;
                Self::Scatter {
                    points: numeric_pairs(dataset, columns.x, y),
                    x_desc: name(columns.x),
                    y_desc: name(y),
                }
            }
            ChartKind::Line => line_data(dataset, columns)?,
        };

        if plot.is_empty() {
            return Err(nothing());
        }
        if !plot.has_drawable_axes() {
            return Err(ChartError::NonFiniteData(kind));
        }
        Ok(plot)
    }

    /// `true` when every axis the canvas will build is finite and non-empty.
    fn has_drawable_axes(&self) -> bool {
        match self {
            Self::Bars { heights, .. } => {
                let (lo, hi) = bounds(heights.iter().copied());
                heights.iter().all(|h| h.is_finite()) && drawable(&padded(lo.min(0.0), hi.max(0.0)))
            }
            Self::Histogram { edges, .. } => match (edges.first(), edges.last()) {
                (Some(&lo), Some(&hi)) => drawable(&(lo..hi)),
                _ => false,
            },
            Self::Pie { sizes, .. } => sizes.iter().sum::<f64>().is_finite(),
            Self::Scatter { points, .. } => points_fit(points.iter()),
            Self::Lines { series, .. } => points_fit(series.iter().flat_map(|s| s.points.iter())),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Bars { labels, .. } => labels.is_empty(),
            Self::Pie { labels, .. } => labels.is_empty(),
            Self::Histogram { counts, .. } => counts.is_empty(),
            Self::Scatter { points, .. } => points.is_empty(),
            Self::Lines { series, .. } => series.iter().all(|s| s.points.is_empty()),
        }
    }
}

/// Axis range with 5% padding on both sides; a degenerate range is widened by 1.
pub(crate) fn padded(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// `(min, max)` of `values`; `(inf, -inf)` when empty.
pub(crate) fn bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Plotters can only lay out ticks over a finite range of positive, finite width.
fn drawable(range: &Range<f64>) -> bool {
    range.start.is_finite()
        && range.end.is_finite()
        && (range.end - range.start).is_finite()
        && range.end > range.start
}

fn points_fit<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> bool {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.copied().unzip();
    let (x_lo, x_hi) = bounds(xs);
    let (y_lo, y_hi) = bounds(ys);
    drawable(&padded(x_lo, x_hi)) && drawable(&padded(y_lo, y_hi))
}

/// Fold rows into one accumulator per distinct non-null `x` value, ordered by key.
fn group_rows<F>(dataset: &DataSet, x: usize, mut fold: F) -> Vec<(String, f64)>
where
    F: FnMut(f64, &[Value]) -> f64,
{
    let mut keyed: Vec<(&Value, &[Value])> = dataset
        .rows
        .iter()
        .filter_map(|row| row.get(x).filter(|v| !v.is_null()).map(|key| (key, row.as_slice())))
        .collect();
    keyed.sort_by(|a, b| a.0.sort_cmp(b.0));

    let mut groups: Vec<(&Value, f64)> = Vec::new();
    for (key, row) in keyed {
        let same_key = groups
            .last()
            .is_some_and(|(last, _)| last.sort_cmp(key) == Ordering::Equal);
        if !same_key {
            groups.push((key, 0.0));
        }
        if let Some((_, acc)) = groups.last_mut() {
            *acc = fold(*acc, row);
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| (key.to_string(), acc))
        .collect()
}

/// Equal-width bins over `[min, max]`, last bin closed. `None` when `values` is empty.
///
/// A degenerate range is widened to `[v - 0.5, v + 0.5]`.
pub(crate) fn histogram(values: &[f64], bins: usize) -> Option<(Vec<f64>, Vec<usize>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0_usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some((edges, counts))
}

fn numeric_pairs(dataset: &DataSet, x: usize, y: usize) -> Vec<(f64, f64)> {
    dataset
        .rows
        .iter()
        .filter_map(|row| {
            let px = row.get(x).and_then(Value::as_f64)?;
            let py = row.get(y).and_then(Value::as_f64)?;
            Some((px, py))
        })
        .collect()
}

fn line_data(dataset: &DataSet, columns: Columns) -> ChartResult<PlotData> {
    let x = columns.x;
    let y_columns: Vec<usize> = match columns.y {
        Some(y) => vec![y],
        None => (0..dataset.schema.fields.len())
            .filter(|&idx| idx != x)
            .collect(),
    };
    let y_columns: Vec<usize> = y_columns
        .into_iter()
        .filter(|&idx| column_type(dataset, idx).is_numeric())
        .collect();
    if y_columns.is_empty() {
        return Err(ChartError::NothingToPlot(ChartKind::Line));
    }

    let axis = if column_type(dataset, x).is_numeric() {
        LineAxis::Numeric
    } else {
        LineAxis::Positional(dataset.column_values(x).map(Value::to_string).collect())
    };

    let series = y_columns
        .into_iter()
        .map(|y| {
            let points = match &axis {
                LineAxis::Numeric => numeric_pairs(dataset, x, y),
                LineAxis::Positional(_) => dataset
                    .column_values(y)
                    .enumerate()
                    .filter_map(|(pos, v)| v.as_f64().map(|py| (pos as f64, py)))
                    .collect(),
            };
            Series {
                name: dataset.schema.fields[y].name.clone(),
                points,
            }
        })
        .collect();

    Ok(PlotData::Lines {
        axis,
        series,
        x_desc: dataset.schema.fields[x].name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema};

    fn sales() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("region", DataType::Utf8),
            Field::new("units", DataType::Int64),
            Field::new("price", DataType::Float64),
        ]);
        let row = |r: &str, u: Value, p: Value| vec![Value::Utf8(r.to_string()), u, p];
        DataSet::new(
            schema,
            vec![
                row("west", Value::Int64(3), Value::Float64(1.5)),
                row("east", Value::Int64(2), Value::Null),
                row("west", Value::Null, Value::Float64(2.5)),
                vec![Value::Null, Value::Int64(7), Value::Float64(9.0)],
                row("east", Value::Int64(4), Value::Float64(0.5)),
            ],
        )
    }

    fn prepare(kind: ChartKind, x: usize, y: Option<usize>) -> ChartResult<PlotData> {
        PlotData::prepare(&sales(), kind, Columns { x, y })
    }

    #[test]
    fn bar_sums_per_sorted_group_and_drops_null_keys() {
        match prepare(ChartKind::Bar, 0, Some(1)).unwrap() {
            PlotData::Bars { labels, heights, x_desc } => {
                assert_eq!(labels, vec!["east", "west"]);
                assert_eq!(heights, vec![6.0, 3.0]);
                assert_eq!(x_desc, "region");
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn pie_counts_rows_per_group() {
        match prepare(ChartKind::Pie, 0, None).unwrap() {
            PlotData::Pie { labels, sizes } => {
                assert_eq!(labels, vec!["east", "west"]);
                assert_eq!(sizes, vec![2.0, 2.0]);
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn histogram_has_fixed_bin_count() {
        match prepare(ChartKind::Histogram, 2, None).unwrap() {
            PlotData::Histogram { edges, counts } => {
                assert_eq!(counts.len(), HISTOGRAM_BINS);
                assert_eq!(edges.len(), HISTOGRAM_BINS + 1);
                assert_eq!(counts.iter().sum::<usize>(), 4);
                assert_eq!(counts[HISTOGRAM_BINS - 1], 1);
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn histogram_widens_degenerate_range() {
        let (edges, counts) = histogram(&[2.0, 2.0], 4).unwrap();
        assert_eq!(edges.first(), Some(&1.5));
        assert_eq!(edges.last(), Some(&2.5));
        assert_eq!(counts.iter().sum::<usize>(), 2);
        assert!(histogram(&[], 4).is_none());
    }

    #[test]
    fn scatter_skips_rows_with_missing_values() {
        match prepare(ChartKind::Scatter, 1, Some(2)).unwrap() {
            PlotData::Scatter { points, .. } => {
                assert_eq!(points, vec![(3.0, 1.5), (7.0, 9.0), (4.0, 0.5)]);
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn line_over_text_x_uses_row_positions() {
        match prepare(ChartKind::Line, 0, Some(1)).unwrap() {
            PlotData::Lines { axis, series, .. } => {
                assert_eq!(
                    axis,
                    LineAxis::Positional(vec![
                        "west".into(),
                        "east".into(),
                        "west".into(),
                        "".into(),
                        "east".into()
                    ])
                );
                assert_eq!(series.len(), 1);
                assert_eq!(series[0].points, vec![(0.0, 3.0), (1.0, 2.0), (3.0, 7.0), (4.0, 4.0)]);
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn line_without_y_plots_every_other_numeric_column() {
        match prepare(ChartKind::Line, 1, None).unwrap() {
            PlotData::Lines { axis, series, .. } => {
                assert_eq!(axis, LineAxis::Numeric);
                let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["price"]);
            }
            other => panic!("unexpected plot: {other:?}"),
        }
    }

    #[test]
    fn line_with_text_y_has_nothing_to_plot() {
        let err = prepare(ChartKind::Line, 1, Some(0)).unwrap_err();
        assert!(matches!(err, ChartError::NothingToPlot(ChartKind::Line)));
    }

    #[test]
    fn padded_widens_degenerate_ranges() {
        assert_eq!(padded(3.0, 3.0), 2.0..4.0);
        let r = padded(0.0, 10.0);
        assert!((r.start + 0.5).abs() < 1e-9 && (r.end - 10.5).abs() < 1e-9);
    }

    #[test]
    fn drawable_rejects_overflowing_and_empty_ranges() {
        assert!(drawable(&(0.0..1.0)));
        assert!(!drawable(&(-1e308..1e308)));
        assert!(!drawable(&(1.0..f64::INFINITY)));
        assert!(!drawable(&(f64::NAN..1.0)));
        assert!(!drawable(&padded(1e300, 1e300)));
    }

    fn extremes() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("label", DataType::Utf8),
            Field::new("v", DataType::Float64),
            Field::new("w", DataType::Float64),
        ]);
        let row = |l: &str, v: f64, w: f64| vec![Value::Utf8(l.to_string()), Value::Float64(v), Value::Float64(w)];
        DataSet::new(
            schema,
            vec![row("a", 1e308, 1e308), row("b", -1e308, -1e308), row("a", 1e308, 0.0)],
        )
    }

    #[test]
    fn overflowing_values_are_rejected_for_every_kind() {
        let ds = extremes();
        let cases = [
            (ChartKind::Histogram, 1, None),
            (ChartKind::Scatter, 1, Some(2)),
            (ChartKind::Bar, 0, Some(1)),
            (ChartKind::Line, 1, Some(2)),
        ];
        for (kind, x, y) in cases {
            let err = PlotData::prepare(&ds, kind, Columns { x, y }).unwrap_err();
            assert!(matches!(err, ChartError::NonFiniteData(k) if k == kind), "{kind}: {err:?}");
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn infinite_values_are_rejected() {
        let schema = Schema::new(vec![Field::new("v", DataType::Float64)]);
        let ds = DataSet::new(
            schema,
            vec![vec![Value::Float64(1.0)], vec![Value::Float64(f64::INFINITY)]],
        );
        let err = PlotData::prepare(&ds, ChartKind::Histogram, Columns { x: 0, y: None }).unwrap_err();
        assert!(matches!(err, ChartError::NonFiniteData(ChartKind::Histogram)));
    }

    #[test]
    fn all_null_histogram_has_nothing_to_plot() {
        let schema = Schema::new(vec![Field::new("v", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null]]);
        let err = PlotData::prepare(&ds, ChartKind::Histogram, Columns { x: 0, y: None }).unwrap_err();
        assert!(matches!(err, ChartError::NothingToPlot(ChartKind::Histogram)));
    }
}
