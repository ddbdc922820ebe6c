use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};

use crate::charts::KpiSummary;
use crate::config::Theme;
use crate::format::{format_count, format_currency};

/// Row of three bordered indicator boxes showing the dataset totals for
/// revenue, plays, and listeners. Totals reflect the active genre filter.
pub struct KpiRow<'a> {
    pub summary: &'a KpiSummary,
    pub currency_symbol: &'a str,
    pub caption: &'a str,
    pub theme: &'a Theme,
}

impl KpiRow<'_> {
    fn cells(&self) -> [(&'static str, String); 3] {
        [
            (
                "Revenue",
                format_currency(self.summary.revenue, self.currency_symbol),
            ),
            ("Plays", format_count(self.summary.plays)),
            ("Listeners", format_count(self.summary.listeners)),
        ]
    }
}

impl Widget for &KpiRow<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::new(
            Direction::Horizontal,
            [Constraint::Ratio(1, 3); 3],
        )
        .split(area);

        for (i, (label, value)) in self.cells().into_iter().enumerate() {
            let block = Block::bordered()
                .border_style(Style::default().fg(self.theme.get("panel_border")));
            let inner = block.inner(layout[i]);
            block.render(layout[i], buf);

            let lines = vec![
                Line::from(label).style(Style::default().fg(self.theme.get("kpi_label"))),
                Line::from(value)
                    .style(Style::default().fg(self.theme.get("kpi_value")).bold()),
                Line::from(self.caption)
                    .style(Style::default().fg(self.theme.get("kpi_caption"))),
            ];
            Paragraph::new(lines).centered().render(inner, buf);
        }
    }
}
