use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

use crate::session::Screen;

const LANDING_CONTROLS: [(&str, &str); 2] = [("Enter", "Start"), ("q", "Quit")];

const UPLOAD_CONTROLS: [(&str, &str); 6] = [
    ("↑/↓", "Browse"),
    ("Enter", "Open"),
    ("Bksp", "Up"),
    ("Tab", "Filter"),
    ("g", "Generate"),
    ("q", "Quit"),
];

const EXPLORE_CONTROLS: [(&str, &str); 5] = [
    ("←/→", "Chart"),
    ("↑/↓", "Genre"),
    ("c", "Conclusion"),
    ("Esc", "Back"),
    ("q", "Quit"),
];

/// Bottom key-hint bar. The entry table follows the active screen, and the
/// right edge shows the filtered row count once a dataset is loaded.
pub struct Controls {
    pub screen: Screen,
    pub row_count: Option<usize>,
    pub bg: Color,
}

impl Controls {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            row_count: None,
            bg: Color::DarkGray,
        }
    }

    pub fn with_row_count(mut self, row_count: Option<usize>) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    fn entries(&self) -> &'static [(&'static str, &'static str)] {
        match self.screen {
            Screen::Landing => &LANDING_CONTROLS,
            Screen::Upload => &UPLOAD_CONTROLS,
            Screen::Explore => &EXPLORE_CONTROLS,
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let entries = self.entries();

        let mut constraints = entries.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        // Add space for row count if available
        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15)); // Space for "Rows: 12345"
        }
        constraints.push(Constraint::Fill(1)); // Fill the remaining space

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        // iterate over the controls and render them
        for (i, (key, action)) in entries.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(Style::default().bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(Style::default().bg(self.bg))
                .render(layout[j + 1], buf);
        }

        // Render row count if available
        let mut fill_start_idx = entries.len() * 2;
        if let Some(count) = self.row_count {
            let row_count_text = format!("Rows: {}", count);
            Paragraph::new(row_count_text)
                .style(Style::default().bg(self.bg).fg(Color::White))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(Style::default().bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(controls: &Controls, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        controls.render(area, &mut buf);
        (0..width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn landing_shows_start_hint() {
        let rendered = render_to_string(&Controls::new(Screen::Landing), 40);
        assert!(rendered.contains("Enter"));
        assert!(rendered.contains("Start"));
        assert!(rendered.contains("Quit"));
    }

    #[test]
    fn explore_shows_conclusion_and_back() {
        let rendered = render_to_string(&Controls::new(Screen::Explore), 60);
        assert!(rendered.contains("Conclusion"));
        assert!(rendered.contains("Back"));
        assert!(!rendered.contains("Generate"));
    }

    #[test]
    fn row_count_renders_on_right() {
        let controls = Controls::new(Screen::Explore).with_row_count(Some(1234));
        let rendered = render_to_string(&controls, 80);
        assert!(rendered.contains("Rows: 1234"));
    }
}
