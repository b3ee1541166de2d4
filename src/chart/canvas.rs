//! Pixel canvas: draws a [`PlotData`] with plotters and encodes it as PNG.

use std::fmt::Display;

use image::ImageEncoder;
use plotters::element::Pie;
use plotters::prelude::*;

use crate::error::{ChartError, ChartResult};

use super::plot::{bounds, padded, LineAxis, PlotData, Series};

const BAR_COLOR: RGBColor = RGBColor(0x25, 0x63, 0xeb);
const HISTOGRAM_COLOR: RGBColor = RGBColor(0x16, 0xa3, 0x4a);
const SCATTER_COLOR: RGBColor = RGBColor(0xdc, 0x26, 0x26);

/// Categorical palette for line series and pie slices.
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const MAX_CATEGORY_LABELS: usize = 20;

fn drawing_error(err: impl Display) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Label for tick `x` when it sits on an integer position inside `labels`.
fn label_at(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// An RGB pixel buffer owned by a single render call.
pub(crate) struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: vec![0u8; (width * height * 3) as usize],
            width,
            height,
        }
    }

    pub fn draw(&mut self, title: &str, plot: &PlotData) -> ChartResult<()> {
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        match plot {
            PlotData::Bars {
                labels,
                heights,
                x_desc,
            } => draw_bars(&root, title, labels, heights, x_desc)?,
            PlotData::Histogram { edges, counts } => draw_histogram(&root, title, edges, counts)?,
            PlotData::Lines {
                axis,
                series,
                x_desc,
            } => draw_lines(&root, title, axis, series, x_desc)?,
            PlotData::Pie { labels, sizes } => draw_pie(&root, title, labels, sizes)?,
            PlotData::Scatter {
                points,
                x_desc,
                y_desc,
            } => draw_scatter(&root, title, points, x_desc, y_desc)?,
        }

        root.present().map_err(drawing_error)?;
        Ok(())
    }

    /// Consume the canvas and return PNG bytes.
    pub fn encode_png(self) -> ChartResult<Vec<u8>> {
        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes).write_image(
            &self.buffer,
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        Ok(png_bytes)
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_bars(
    root: &Area<'_>,
    title: &str,
    labels: &[String],
    heights: &[f64],
    x_desc: &str,
) -> ChartResult<()> {
    let (lo, hi) = bounds(heights.iter().copied());
    let y_range = padded(lo.min(0.0), hi.max(0.0));
    let x_range = -0.5..(labels.len() as f64 - 0.5);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().min(MAX_CATEGORY_LABELS))
        .x_label_formatter(&|x| label_at(labels, *x))
        .x_desc(x_desc)
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(heights.iter().enumerate().map(|(idx, &height)| {
            let center = idx as f64;
            Rectangle::new([(center - 0.4, 0.0), (center + 0.4, height)], BAR_COLOR.filled())
        }))
        .map_err(drawing_error)?;
    Ok(())
}

fn draw_histogram(root: &Area<'_>, title: &str, edges: &[f64], counts: &[usize]) -> ChartResult<()> {
    let lo = edges.first().copied().unwrap_or(0.0);
    let hi = edges.last().copied().unwrap_or(1.0);
    let top = counts.iter().copied().max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..(top * 1.05).max(1.0))
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .y_desc("Frequency")
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(edges.windows(2).zip(counts).map(|(bin, &count)| {
            Rectangle::new([(bin[0], 0.0), (bin[1], count as f64)], HISTOGRAM_COLOR.filled())
        }))
        .map_err(drawing_error)?;
    chart
        .draw_series(edges.windows(2).zip(counts).map(|(bin, &count)| {
            Rectangle::new([(bin[0], 0.0), (bin[1], count as f64)], BLACK.stroke_width(1))
        }))
        .map_err(drawing_error)?;
    Ok(())
}

fn draw_lines(
    root: &Area<'_>,
    title: &str,
    axis: &LineAxis,
    series: &[Series],
    x_desc: &str,
) -> ChartResult<()> {
    let all_points = || series.iter().flat_map(|s| s.points.iter());
    let (x_lo, x_hi) = bounds(all_points().map(|p| p.0));
    let (y_lo, y_hi) = bounds(all_points().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(padded(x_lo, x_hi), padded(y_lo, y_hi))
        .map_err(drawing_error)?;

    let formatter = |x: &f64| match axis {
        LineAxis::Numeric => format!("{x}"),
        LineAxis::Positional(labels) => label_at(labels, *x),
    };
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc);
    if let LineAxis::Positional(labels) = axis {
        mesh.x_labels(labels.len().min(MAX_CATEGORY_LABELS));
        mesh.x_label_formatter(&formatter);
    }
    if let [only] = series {
        mesh.y_desc(only.name.as_str());
    }
    mesh.draw().map_err(drawing_error)?;

    for (idx, s) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
            .map_err(drawing_error)?
            .label(s.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_error)?;
    }
    Ok(())
}

/// Wedges in drawing order for a counter-clockwise pie.
///
/// Plotters sweeps clockwise from `start_angle`, so the slices are reversed; each keeps the
/// palette color of its original position.
fn counter_clockwise_wedges(labels: &[String], sizes: &[f64]) -> (Vec<String>, Vec<f64>, Vec<RGBColor>) {
    let mut wedges: Vec<(String, f64, RGBColor)> = labels
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(idx, (label, &size))| (label.clone(), size, PALETTE[idx % PALETTE.len()]))
        .collect();
    wedges.reverse();

    let mut out = (Vec::new(), Vec::new(), Vec::new());
    for (label, size, color) in wedges {
        out.0.push(label);
        out.1.push(size);
        out.2.push(color);
    }
    out
}

fn draw_pie(root: &Area<'_>, title: &str, labels: &[String], sizes: &[f64]) -> ChartResult<()> {
    let area = root.titled(title, ("sans-serif", 20)).map_err(drawing_error)?;
    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.38;
    let (labels, sizes, colors) = counter_clockwise_wedges(labels, sizes);

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 14).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 12).into_font().color(&WHITE));
    area.draw(&pie).map_err(drawing_error)?;
    Ok(())
}

fn draw_scatter(
    root: &Area<'_>,
    title: &str,
    points: &[(f64, f64)],
    x_desc: &str,
    y_desc: &str,
) -> ChartResult<()> {
    let (x_lo, x_hi) = bounds(points.iter().map(|p| p.0));
    let (y_lo, y_hi) = bounds(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(padded(x_lo, x_hi), padded(y_lo, y_hi))
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, SCATTER_COLOR.mix(0.7).filled())),
        )
        .map_err(drawing_error)?;
    Ok(())
}
