use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Paragraph, Widget},
};

use crate::charts::CategoryBars;
use crate::config::Theme;
use crate::format::{format_count, format_currency, truncate_label};

const MAX_LABEL_CHARS: usize = 24;

/// How the value printed inside each bar is rendered.
#[derive(Debug, Clone, Copy)]
pub enum ValueFormat<'a> {
    Count,
    Currency(&'a str),
}

impl ValueFormat<'_> {
    fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Count => format_count(value),
            ValueFormat::Currency(symbol) => format_currency(value, symbol),
        }
    }
}

/// Horizontal bar chart with one bar per dataset row, labels on the left.
/// Repeated labels stay repeated; no aggregation happens here.
pub struct CategoryBarChart<'a> {
    pub data: &'a CategoryBars,
    pub value_format: ValueFormat<'a>,
    pub theme: &'a Theme,
}

impl Widget for &CategoryBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.bars.is_empty() {
            Paragraph::new("No data points")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        let bar_color = self.theme.series_color(0);
        let max = self
            .data
            .bars
            .iter()
            .map(|(_, v)| v.max(0.0).round() as u64)
            .max()
            .unwrap_or(0);

        let bars: Vec<Bar> = self
            .data
            .bars
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .value(value.max(0.0).round() as u64)
                    .label(Line::from(truncate_label(label, MAX_LABEL_CHARS)))
                    .text_value(self.value_format.format(*value))
                    .style(Style::default().fg(bar_color))
            })
            .collect();

        BarChart::default()
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(0)
            .max(max.max(1))
            .label_style(Style::default().fg(self.theme.get("text_primary")))
            .value_style(Style::default().fg(self.theme.get("background")))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn theme() -> Theme {
        Theme::from_config(&AppConfig::default().theme).unwrap()
    }

    fn render_to_string(chart: &CategoryBarChart, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);
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
    fn renders_one_bar_per_row_with_labels() {
        let theme = theme();
        let data = CategoryBars {
            bars: vec![
                ("Midnight Drive".to_string(), 100.0),
                ("Midnight Drive".to_string(), 40.0),
                ("Neon Skyline".to_string(), 70.0),
            ],
        };
        let chart = CategoryBarChart {
            data: &data,
            value_format: ValueFormat::Count,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 60, 6);
        assert_eq!(rendered.matches("Midnight Drive").count(), 2);
        assert!(rendered.contains("Neon Skyline"));
        assert!(rendered.contains("100"));
    }

    #[test]
    fn currency_values_keep_symbol() {
        let theme = theme();
        let data = CategoryBars {
            bars: vec![("United States".to_string(), 1234.5)],
        };
        let chart = CategoryBarChart {
            data: &data,
            value_format: ValueFormat::Currency("$"),
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 60, 3);
        assert!(rendered.contains("$1,234.50"));
    }

    #[test]
    fn empty_data_shows_placeholder() {
        let theme = theme();
        let data = CategoryBars::default();
        let chart = CategoryBarChart {
            data: &data,
            value_format: ValueFormat::Count,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 40, 3);
        assert!(rendered.contains("No data points"));
    }

    #[test]
    fn long_labels_are_truncated() {
        let theme = theme();
        let data = CategoryBars {
            bars: vec![(
                "An Extremely Long Song Title That Never Ends".to_string(),
                5.0,
            )],
        };
        let chart = CategoryBarChart {
            data: &data,
            value_format: ValueFormat::Count,
            theme: &theme,
        };
        let rendered = render_to_string(&chart, 60, 3);
        assert!(rendered.contains('…'));
        assert!(!rendered.contains("Never Ends"));
    }
}
