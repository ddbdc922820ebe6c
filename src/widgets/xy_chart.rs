use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget},
};

use crate::charts::{ScatterData, TimeSeries, XAxisKind};
use crate::config::Theme;
use crate::format::{format_axis_label, format_x_axis_label, truncate_label};

/// Legend entries beyond this stop fitting sensibly in a terminal chart.
const MAX_LEGEND_SERIES: usize = 7;
const MAX_SERIES_NAME_CHARS: usize = 16;

/// Plays vs Listeners scatter. Every row is a point; series exist only to
/// give each song label its own color.
pub struct ScatterChart<'a> {
    pub data: &'a ScatterData,
    pub theme: &'a Theme,
}

impl Widget for &ScatterChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.is_empty() {
            render_placeholder(area, buf, self.theme);
            return;
        }

        let mut all_x_min = f64::INFINITY;
        let mut all_x_max = f64::NEG_INFINITY;
        let mut all_y_min = f64::INFINITY;
        let mut all_y_max = f64::NEG_INFINITY;
        for series in &self.data.series {
            for &(x, y) in &series.points {
                all_x_min = all_x_min.min(x);
                all_x_max = all_x_max.max(x);
                all_y_min = all_y_min.min(y);
                all_y_max = all_y_max.max(y);
            }
        }

        let names: Vec<String> = self
            .data
            .series
            .iter()
            .map(|s| truncate_label(&s.label, MAX_SERIES_NAME_CHARS))
            .collect();
        let datasets: Vec<Dataset> = self
            .data
            .series
            .iter()
            .zip(names.iter())
            .enumerate()
            .map(|(i, (series, name))| {
                Dataset::default()
                    .name(name.as_str())
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(&series.points)
            })
            .collect();

        let (x_bounds, y_bounds) = chart_bounds(all_x_min, all_x_max, all_y_min, all_y_max);
        let legend = if self.data.series.len() <= MAX_LEGEND_SERIES {
            Some(LegendPosition::TopRight)
        } else {
            None
        };

        Chart::new(datasets)
            .x_axis(axis(x_bounds, XAxisKind::Numeric, self.theme))
            .y_axis(axis(y_bounds, XAxisKind::Numeric, self.theme))
            .legend_position(legend)
            .render(area, buf);
    }
}

/// Revenue over time as a single braille line in chronological order.
pub struct TimeSeriesChart<'a> {
    pub series: &'a TimeSeries,
    pub theme: &'a Theme,
}

impl Widget for &TimeSeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.series.points.is_empty() {
            render_placeholder(area, buf, self.theme);
            return;
        }

        let (x_min, x_max) = self
            .series
            .points
            .iter()
            .map(|&(x, _)| x)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), x| {
                (a.min(x), b.max(x))
            });
        let (y_min, y_max) = self
            .series
            .points
            .iter()
            .map(|&(_, y)| y)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), y| {
                (a.min(y), b.max(y))
            });

        let datasets = vec![Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.theme.series_color(0)))
            .data(&self.series.points)];

        let (x_bounds, y_bounds) = chart_bounds(x_min, x_max, y_min, y_max);

        Chart::new(datasets)
            .x_axis(axis(x_bounds, self.series.x_axis_kind, self.theme))
            .y_axis(axis(y_bounds, XAxisKind::Numeric, self.theme))
            .legend_position(None)
            .render(area, buf);
    }
}

fn render_placeholder(area: Rect, buf: &mut Buffer, theme: &Theme) {
    Paragraph::new("No data points")
        .style(Style::default().fg(theme.get("text_secondary")))
        .centered()
        .render(area, buf);
}

/// Widen degenerate ranges so ratatui never sees a zero-width axis.
fn chart_bounds(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> ([f64; 2], [f64; 2]) {
    let y_max_bounds = if y_max > y_min { y_max } else { y_min + 1.0 };
    let x_min_bounds = if x_max > x_min { x_min } else { x_min - 0.5 };
    let x_max_bounds = if x_max > x_min { x_max } else { x_min + 0.5 };
    ([x_min_bounds, x_max_bounds], [y_min, y_max_bounds])
}

fn axis<'a>(bounds: [f64; 2], kind: XAxisKind, theme: &Theme) -> Axis<'a> {
    let label_style = Style::default().fg(theme.get("text_primary"));
    let labels = vec![
        Span::styled(format_label(bounds[0], kind), label_style),
        Span::styled(format_label((bounds[0] + bounds[1]) / 2.0, kind), label_style),
        Span::styled(format_label(bounds[1], kind), label_style),
    ];
    Axis::default()
        .bounds(bounds)
        .style(Style::default().fg(theme.get("chart_axis")))
        .labels(labels)
}

fn format_label(v: f64, kind: XAxisKind) -> String {
    match kind {
        XAxisKind::Numeric => format_axis_label(v),
        _ => format_x_axis_label(v, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ScatterSeries;
    use crate::config::AppConfig;

    fn theme() -> Theme {
        Theme::from_config(&AppConfig::default().theme).unwrap()
    }

    fn render_to_string<W>(widget: W, width: u16, height: u16) -> String
    where
        W: Widget,
    {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let mut out = String::new();
        for y in 0..height {
            for x in 0..width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn scatter_legend_names_songs() {
        let theme = theme();
        let data = ScatterData {
            series: vec![
                ScatterSeries {
                    label: "Aurora".to_string(),
                    points: vec![(10.0, 5.0), (20.0, 8.0)],
                },
                ScatterSeries {
                    label: "Basalt".to_string(),
                    points: vec![(15.0, 3.0)],
                },
            ],
        };
        let chart = ScatterChart {
            data: &data,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 80, 20);
        assert!(rendered.contains("Aurora"));
        assert!(rendered.contains("Basalt"));
    }

    #[test]
    fn scatter_empty_shows_placeholder() {
        let theme = theme();
        let data = ScatterData::default();
        let chart = ScatterChart {
            data: &data,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 40, 5);
        assert!(rendered.contains("No data points"));
    }

    #[test]
    fn line_chart_labels_dates() {
        let theme = theme();
        let series = TimeSeries {
            // Day numbers for 2024-01-01 and 2024-01-31.
            points: vec![(19723.0, 10.0), (19753.0, 20.0)],
            x_axis_kind: XAxisKind::Date,
        };
        let chart = TimeSeriesChart {
            series: &series,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 80, 20);
        assert!(rendered.contains("2024-01-01"));
        assert!(rendered.contains("2024-01-31"));
    }

    #[test]
    fn line_chart_single_point_widens_bounds() {
        let theme = theme();
        let series = TimeSeries {
            points: vec![(5.0, 42.0)],
            x_axis_kind: XAxisKind::RowIndex,
        };
        let chart = TimeSeriesChart {
            series: &series,
            theme: &theme,
        };
        // Must not panic on a degenerate range.
        let rendered = render_to_string(&chart, 60, 10);
        assert!(!rendered.is_empty());
    }

    #[test]
    fn line_chart_empty_shows_placeholder() {
        let theme = theme();
        let series = TimeSeries {
            points: Vec::new(),
            x_axis_kind: XAxisKind::RowIndex,
        };
        let chart = TimeSeriesChart {
            series: &series,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 40, 5);
        assert!(rendered.contains("No data points"));
    }
}
