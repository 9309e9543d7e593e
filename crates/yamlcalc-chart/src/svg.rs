//! SVG rendering

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::axis::{format_tick, Axis};
use crate::chart::{Chart, ChartKind};
use crate::error::ChartResult;
use crate::legend::LegendPosition;
use tracing::debug;

const MARGIN: f64 = 10.0;
const TITLE_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 11.0;
const LEGEND_WIDTH: f64 = 140.0;
const LEGEND_ROW: f64 = 20.0;
const LEGEND_SWATCH: f64 = 12.0;
const AXIS_LABEL_WIDTH: f64 = 50.0;
const AXIS_LABEL_HEIGHT: f64 = 20.0;
const AXIS_TITLE_ROW: f64 = 20.0;
/// Share of a category slot covered by bars
const BAR_FILL: f64 = 0.8;

/// Area of the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by the given insets, never below one pixel
    fn inset(&self, left: f64, top: f64, right: f64, bottom: f64) -> Rect {
        Rect {
            x: self.x + left,
            y: self.y + top,
            width: (self.width - left - right).max(1.0),
            height: (self.height - top - bottom).max(1.0),
        }
    }
}

/// SVG chart renderer
pub struct SvgRenderer;

impl SvgRenderer {
    /// Render a chart to an SVG file
    pub fn write_file<P: AsRef<Path>>(chart: &Chart, path: P) -> ChartResult<()> {
        let file = File::create(path)?;
        Self::write(chart, file)
    }

    /// Render a chart to a writer
    pub fn write<W: Write>(chart: &Chart, mut writer: W) -> ChartResult<()> {
        writer.write_all(Self::render(chart).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Render a chart to SVG text
    pub fn render(chart: &Chart) -> String {
        let style = chart.style;
        let (w, h) = (chart.width, chart.height);

        let mut content = format!(
            r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" class="yamlcalc-chart {kind}" font-family="{font}">
  <rect class="background" x="0" y="0" width="{w}" height="{h}" fill="{fill}"/>"#,
            w = num(w),
            h = num(h),
            kind = chart.kind.name(),
            font = escape_xml(style.font_family),
            fill = style.background,
        );

        let mut area = Rect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        }
        .inset(MARGIN, MARGIN, MARGIN, MARGIN);

        if let Some(title) = &chart.title {
            content.push_str(&format!(
                "\n  <text class=\"title\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>",
                num(w / 2.0),
                num(area.y + TITLE_SIZE),
                TITLE_SIZE,
                style.foreground_strong,
                escape_xml(title)
            ));
            area = area.inset(0.0, TITLE_SIZE + MARGIN, 0.0, 0.0);
        }

        if chart.legend.visible && !chart.series.is_empty() {
            area = write_legend(&mut content, chart, area);
        }

        match chart.kind {
            ChartKind::Pie => write_pie(&mut content, chart, area),
            ChartKind::HorizontalBar => write_horizontal_bars(&mut content, chart, area),
            ChartKind::Bar | ChartKind::GroupedBar | ChartKind::StackedBar | ChartKind::Line => {
                write_vertical(&mut content, chart, area)
            }
        }

        content.push_str("\n</svg>\n");
        debug!(kind = chart.kind.name(), series = chart.series.len(), "rendered chart");
        content
    }
}

/// Draw the legend and return the area left for the plot
fn write_legend(content: &mut String, chart: &Chart, area: Rect) -> Rect {
    let style = chart.style;
    let (per_row, remaining) = match chart.legend.position {
        LegendPosition::Left => (1, area.inset(LEGEND_WIDTH, 0.0, 0.0, 0.0)),
        LegendPosition::Bottom => {
            let per_row = ((area.width / LEGEND_WIDTH).floor() as usize).max(1);
            let rows = (chart.series.len() + per_row - 1) / per_row;
            let height = rows as f64 * LEGEND_ROW + MARGIN;
            (per_row, area.inset(0.0, 0.0, 0.0, height))
        }
    };
    let origin_y = match chart.legend.position {
        LegendPosition::Left => area.y,
        LegendPosition::Bottom => remaining.bottom() + MARGIN,
    };

    content.push_str("\n  <g class=\"legend\">");
    for (index, series) in chart.series.iter().enumerate() {
        let x = area.x + (index % per_row) as f64 * LEGEND_WIDTH;
        let y = origin_y + (index / per_row) as f64 * LEGEND_ROW;
        content.push_str(&format!(
            "\n    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            num(x),
            num(y),
            LEGEND_SWATCH,
            LEGEND_SWATCH,
            style.color(index)
        ));
        content.push_str(&format!(
            "\n    <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            num(x + LEGEND_SWATCH + 5.0),
            num(y + LEGEND_SWATCH - 1.0),
            LABEL_SIZE,
            style.foreground,
            escape_xml(&series.name)
        ));
    }
    content.push_str("\n  </g>");
    remaining
}

fn write_pie(content: &mut String, chart: &Chart, area: Rect) {
    let style = chart.style;
    let cx = area.x + area.width / 2.0;
    let cy = area.y + area.height / 2.0;
    let radius = area.width.min(area.height) / 2.0 * 0.9;
    let inner = radius * chart.inner_radius;

    let slices: Vec<(usize, f64)> = chart
        .series
        .iter()
        .enumerate()
        .map(|(index, series)| (index, series.total()))
        .filter(|(_, value)| *value > 0.0)
        .collect();
    let total: f64 = slices.iter().map(|(_, value)| value).sum();
    if total <= 0.0 {
        return;
    }

    content.push_str("\n  <g class=\"plot pie\">");
    let mut start = -FRAC_PI_2;
    for (index, value) in slices {
        let name = &chart.series[index].name;
        let fraction = value / total;
        let end = start + fraction * TAU;
        let color = style.color(index);

        if fraction >= 1.0 - 1e-9 {
            content.push_str(&format!(
                "\n    <circle class=\"slice\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"><title>{}: {}</title></circle>",
                num(cx),
                num(cy),
                num(radius),
                color,
                escape_xml(name),
                format_tick(value)
            ));
            if inner > 0.0 {
                content.push_str(&format!(
                    "\n    <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>",
                    num(cx),
                    num(cy),
                    num(inner),
                    style.background
                ));
            }
        } else {
            let large = if end - start > PI { 1 } else { 0 };
            let (osx, osy) = polar(cx, cy, radius, start);
            let (oex, oey) = polar(cx, cy, radius, end);
            let path = if inner > 0.0 {
                let (isx, isy) = polar(cx, cy, inner, start);
                let (iex, iey) = polar(cx, cy, inner, end);
                format!(
                    "M{} {} A{} {} 0 {} 1 {} {} L{} {} A{} {} 0 {} 0 {} {} Z",
                    num(osx),
                    num(osy),
                    num(radius),
                    num(radius),
                    large,
                    num(oex),
                    num(oey),
                    num(iex),
                    num(iey),
                    num(inner),
                    num(inner),
                    large,
                    num(isx),
                    num(isy)
                )
            } else {
                format!(
                    "M{} {} L{} {} A{} {} 0 {} 1 {} {} Z",
                    num(cx),
                    num(cy),
                    num(osx),
                    num(osy),
                    num(radius),
                    num(radius),
                    large,
                    num(oex),
                    num(oey)
                )
            };
            content.push_str(&format!(
                "\n    <path class=\"slice\" d=\"{}\" fill=\"{}\"><title>{}: {}</title></path>",
                path,
                color,
                escape_xml(name),
                format_tick(value)
            ));
        }
        start = end;
    }
    content.push_str("\n  </g>");
}

/// Value axis covering every plotted value, or every stack for stacked bars
fn value_axis(chart: &Chart) -> Axis {
    let axis = if chart.kind == ChartKind::StackedBar {
        let mut extents = Vec::new();
        for category in 0..chart.category_count() {
            let (low, high) = chart
                .series
                .iter()
                .filter_map(|s| s.values.get(category).copied().flatten())
                .fold((0.0, 0.0), |(low, high), v| {
                    if v < 0.0 {
                        (low + v, high)
                    } else {
                        (low, high + v)
                    }
                });
            extents.push(low);
            extents.push(high);
        }
        Axis::fit(extents)
    } else {
        Axis::fit(chart.series.iter().flat_map(|s| s.present()))
    };
    axis.with_title(chart.y_title.clone())
}

fn write_vertical(content: &mut String, chart: &Chart, area: Rect) {
    let style = chart.style;
    let axis = value_axis(chart);
    let y_title_width = if chart.y_title.is_some() { AXIS_TITLE_ROW } else { 0.0 };
    let x_title_height = if chart.x_title.is_some() { AXIS_TITLE_ROW } else { 0.0 };
    let plot = area.inset(
        AXIS_LABEL_WIDTH + y_title_width,
        0.0,
        0.0,
        AXIS_LABEL_HEIGHT + x_title_height,
    );
    let y_of = |value: f64| plot.bottom() - axis.fraction(value) * plot.height;

    write_plot_background(content, chart, plot);
    content.push_str("\n  <g class=\"axis y\">");
    for tick in axis.ticks() {
        let y = y_of(tick);
        content.push_str(&format!(
            "\n    <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
            num(plot.x),
            num(y),
            num(plot.right()),
            num(y),
            style.foreground_subtle
        ));
        content.push_str(&format!(
            "\n    <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"{}\" fill=\"{}\">{}</text>",
            num(plot.x - 5.0),
            num(y + LABEL_SIZE / 3.0),
            LABEL_SIZE,
            style.foreground,
            axis.label(tick)
        ));
    }
    content.push_str("\n  </g>");

    let categories = chart.category_count().max(1);
    let slot = plot.width / categories as f64;
    content.push_str("\n  <g class=\"axis x\">");
    for (index, label) in chart.x_labels.iter().enumerate() {
        content.push_str(&format!(
            "\n    <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>",
            num(plot.x + slot * (index as f64 + 0.5)),
            num(plot.bottom() + LABEL_SIZE + 4.0),
            LABEL_SIZE,
            style.foreground,
            escape_xml(label)
        ));
    }
    content.push_str("\n  </g>");
    write_axis_titles(content, chart, plot);

    let baseline = y_of(0.0);
    content.push_str(&format!("\n  <g class=\"plot {}\">", chart.kind.name()));
    match chart.kind {
        ChartKind::Line => {
            for (index, series) in chart.series.iter().enumerate() {
                let color = style.color(index);
                let points: Vec<Option<(f64, f64)>> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v.map(|v| (plot.x + slot * (i as f64 + 0.5), y_of(v))))
                    .collect();
                content.push_str(&format!(
                    "\n    <path class=\"line\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
                    line_path(&points),
                    color
                ));
                for (x, y) in points.iter().flatten() {
                    content.push_str(&format!(
                        "\n    <circle cx=\"{}\" cy=\"{}\" r=\"3\" fill=\"{}\"/>",
                        num(*x),
                        num(*y),
                        color
                    ));
                }
            }
        }
        ChartKind::StackedBar => {
            let width = slot * BAR_FILL;
            for category in 0..categories {
                let x = plot.x + slot * category as f64 + (slot - width) / 2.0;
                let (mut up, mut down) = (0.0, 0.0);
                for (index, series) in chart.series.iter().enumerate() {
                    let Some(value) = series.values.get(category).copied().flatten() else {
                        continue;
                    };
                    let (from, to) = if value < 0.0 {
                        let from = down;
                        down += value;
                        (from, down)
                    } else {
                        let from = up;
                        up += value;
                        (from, up)
                    };
                    write_bar(
                        content,
                        Rect {
                            x,
                            y: y_of(from).min(y_of(to)),
                            width,
                            height: (y_of(from) - y_of(to)).abs(),
                        },
                        style.color(index),
                        &series.name,
                        value,
                    );
                }
            }
        }
        _ => {
            let group = slot * BAR_FILL;
            let width = group / chart.series.len().max(1) as f64;
            for (index, series) in chart.series.iter().enumerate() {
                for (category, value) in series.values.iter().enumerate() {
                    let Some(value) = *value else { continue };
                    let y = y_of(value);
                    write_bar(
                        content,
                        Rect {
                            x: plot.x + slot * category as f64 + (slot - group) / 2.0 + width * index as f64,
                            y: y.min(baseline),
                            width,
                            height: (baseline - y).abs(),
                        },
                        style.color(index),
                        &series.name,
                        value,
                    );
                }
            }
        }
    }
    content.push_str("\n  </g>");
}

fn write_horizontal_bars(content: &mut String, chart: &Chart, area: Rect) {
    let style = chart.style;
    let axis = value_axis(chart);
    let y_title_width = if chart.y_title.is_some() { AXIS_TITLE_ROW } else { 0.0 };
    let x_title_height = if chart.x_title.is_some() { AXIS_TITLE_ROW } else { 0.0 };
    let plot = area.inset(
        y_title_width + MARGIN,
        0.0,
        MARGIN,
        AXIS_LABEL_HEIGHT + x_title_height,
    );
    let x_of = |value: f64| plot.x + axis.fraction(value) * plot.width;

    write_plot_background(content, chart, plot);
    content.push_str("\n  <g class=\"axis x\">");
    for tick in axis.ticks() {
        let x = x_of(tick);
        content.push_str(&format!(
            "\n    <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>",
            num(x),
            num(plot.y),
            num(x),
            num(plot.bottom()),
            style.foreground_subtle
        ));
        content.push_str(&format!(
            "\n    <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>",
            num(x),
            num(plot.bottom() + LABEL_SIZE + 4.0),
            LABEL_SIZE,
            style.foreground,
            axis.label(tick)
        ));
    }
    content.push_str("\n  </g>");
    write_axis_titles(content, chart, plot);

    let baseline = x_of(0.0);
    let group = plot.height * BAR_FILL;
    let height = group / chart.series.len().max(1) as f64;
    content.push_str("\n  <g class=\"plot horizontal-bar\">");
    for (index, series) in chart.series.iter().enumerate() {
        let Some(value) = series.values.first().copied().flatten() else {
            continue;
        };
        let x = x_of(value);
        write_bar(
            content,
            Rect {
                x: x.min(baseline),
                y: plot.y + (plot.height - group) / 2.0 + height * index as f64,
                width: (x - baseline).abs(),
                height,
            },
            style.color(index),
            &series.name,
            value,
        );
    }
    content.push_str("\n  </g>");
}

fn write_plot_background(content: &mut String, chart: &Chart, plot: Rect) {
    content.push_str(&format!(
        "\n  <rect class=\"plot-background\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
        num(plot.x),
        num(plot.y),
        num(plot.width),
        num(plot.height),
        chart.style.plot_background
    ));
}

fn write_axis_titles(content: &mut String, chart: &Chart, plot: Rect) {
    let style = chart.style;
    if let Some(title) = &chart.x_title {
        content.push_str(&format!(
            "\n  <text class=\"x-title\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\">{}</text>",
            num(plot.x + plot.width / 2.0),
            num(plot.bottom() + AXIS_LABEL_HEIGHT + AXIS_TITLE_ROW - 4.0),
            LABEL_SIZE + 1.0,
            style.foreground,
            escape_xml(title)
        ));
    }
    if let Some(title) = &chart.y_title {
        let x = MARGIN + AXIS_TITLE_ROW / 2.0;
        let y = plot.y + plot.height / 2.0;
        content.push_str(&format!(
            "\n  <text class=\"y-title\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"{}\" fill=\"{}\" transform=\"rotate(-90 {} {})\">{}</text>",
            num(x),
            num(y),
            LABEL_SIZE + 1.0,
            style.foreground,
            num(x),
            num(y),
            escape_xml(title)
        ));
    }
}

fn write_bar(content: &mut String, bar: Rect, color: &str, name: &str, value: f64) {
    content.push_str(&format!(
        "\n    <rect class=\"bar\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"><title>{}: {}</title></rect>",
        num(bar.x),
        num(bar.y),
        num(bar.width),
        num(bar.height),
        color,
        escape_xml(name),
        format_tick(value)
    ));
}

/// Path through the present points, broken at missing ones
fn line_path(points: &[Option<(f64, f64)>]) -> String {
    let mut path = String::new();
    let mut pen_down = false;
    for point in points {
        match point {
            Some((x, y)) => {
                if !path.is_empty() {
                    path.push(' ');
                }
                path.push(if pen_down { 'L' } else { 'M' });
                path.push_str(&format!("{} {}", num(*x), num(*y)));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    path
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Coordinate text, rounded to hundredths
fn num(value: f64) -> String {
    format_tick((value * 100.0).round() / 100.0)
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::Legend;
    use crate::series::DataSeries;
    use crate::style::Style;
    use pretty_assertions::assert_eq;

    fn pie() -> Chart {
        let mut chart = Chart::new(ChartKind::Pie).with_title("Costs & <Income>");
        chart.add_series(DataSeries::new("rent", vec![Some(3.0)]));
        chart.add_series(DataSeries::new("food", vec![Some(1.0)]));
        chart.add_series(DataSeries::new("broken", vec![None]));
        chart
    }

    #[test]
    fn test_render_document_frame() {
        let svg = SvgRenderer::render(&pie());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"no\"?>\n<svg "));
        assert!(svg.contains("width=\"800\" height=\"600\" viewBox=\"0 0 800 600\""));
        assert!(svg.contains("class=\"yamlcalc-chart pie\""));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains(">Costs &amp; &lt;Income&gt;</text>"));
    }

    #[test]
    fn test_pie_slices() {
        let svg = SvgRenderer::render(&pie());
        assert_eq!(svg.matches("class=\"slice\"").count(), 2);
        assert!(svg.contains("<title>rent: 3</title>"));
        assert!(!svg.contains("<title>broken"));
        // every series still gets a legend entry
        assert!(svg.contains(">broken</text>"));
    }

    #[test]
    fn test_pie_single_slice_is_circle() {
        let mut chart = Chart::new(ChartKind::Pie);
        chart.inner_radius = 0.5;
        chart.add_series(DataSeries::new("all", vec![Some(5.0)]));
        let svg = SvgRenderer::render(&chart);
        assert!(svg.contains("<circle class=\"slice\""));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_grouped_bars() {
        let mut chart = Chart::new(ChartKind::GroupedBar);
        chart.x_labels = vec!["jan".into(), "feb".into()];
        chart.add_series(DataSeries::new("a", vec![Some(10.0), Some(-5.0)]));
        chart.add_series(DataSeries::new("b", vec![Some(20.0), None]));
        let svg = SvgRenderer::render(&chart);
        assert_eq!(svg.matches("class=\"bar\"").count(), 3);
        assert!(svg.contains(">jan</text>"));
        assert!(svg.contains("<title>a: -5</title>"));
    }

    #[test]
    fn test_stacked_bars_share_a_column() {
        let mut chart = Chart::new(ChartKind::StackedBar);
        chart.legend = Legend::hidden();
        chart.x_labels = vec!["q1".into()];
        chart.add_series(DataSeries::new("a", vec![Some(1.0)]));
        chart.add_series(DataSeries::new("b", vec![Some(2.0)]));
        let svg = SvgRenderer::render(&chart);

        let xs: Vec<&str> = svg
            .lines()
            .filter(|line| line.contains("class=\"bar\""))
            .filter_map(|line| line.split("x=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0], xs[1]);
        assert!(!svg.contains("class=\"legend\""));
    }

    #[test]
    fn test_line_breaks_at_missing_points() {
        assert_eq!(
            line_path(&[Some((1.0, 2.0)), Some((3.0, 4.0)), None, Some((5.0, 6.0))]),
            "M1 2 L3 4 M5 6"
        );

        let mut chart = Chart::new(ChartKind::Line);
        chart.x_labels = vec!["x".into(), "y".into(), "z".into()];
        chart.add_series(DataSeries::new("s", vec![Some(1.0), None, Some(3.0)]));
        let svg = SvgRenderer::render(&chart);
        assert_eq!(svg.matches("class=\"line\"").count(), 1);
        assert_eq!(svg.matches("r=\"3\"").count(), 2);
    }

    #[test]
    fn test_horizontal_bars_and_axis_titles() {
        let mut chart = Chart::new(ChartKind::HorizontalBar);
        chart.x_title = Some("amount".into());
        chart.y_title = Some("item".into());
        chart.legend = Legend::new(LegendPosition::Bottom);
        chart.add_series(DataSeries::new("one", vec![Some(1.0)]));
        chart.add_series(DataSeries::new("two", vec![Some(2.0)]));
        let svg = SvgRenderer::render(&chart);
        assert_eq!(svg.matches("class=\"bar\"").count(), 2);
        assert!(svg.contains("class=\"x-title\""));
        assert!(svg.contains("rotate(-90"));
    }

    #[test]
    fn test_style_colors() {
        let mut chart = pie();
        chart.style = Style::by_name("neon").unwrap();
        let svg = SvgRenderer::render(&chart);
        assert!(svg.contains("fill=\"black\""));
        assert!(svg.contains("fill=\"#ff0090\""));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        SvgRenderer::write_file(&pie(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, SvgRenderer::render(&pie()));
    }
}
