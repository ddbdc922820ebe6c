//! Directory browser for the Upload screen.

use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::config::Theme;
use tunedash_cli::is_dataset_file;

/// Filesystem browser listing directories plus files with a recognized
/// dataset extension. Directories sort before files, both alphabetically.
/// A substring filter narrows the file rows; directories always stay
/// visible so navigation keeps working while filtering.
#[derive(Debug)]
pub struct UploadBrowser {
    pub current_dir: PathBuf,
    pub entries: Vec<fs::DirEntry>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub filter_input: String,
    pub filter_active: bool,
    visible_rows: usize,
}

impl UploadBrowser {
    pub fn new(start_dir: Option<PathBuf>) -> Self {
        let dir = start_dir
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let mut browser = Self {
            current_dir: dir,
            entries: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter_input: String::new(),
            filter_active: false,
            visible_rows: 18,
        };
        browser.refresh();
        browser
    }

    fn refresh(&mut self) {
        self.entries = Self::read_dir(&self.current_dir, &self.filter_input);
        let total = self.total_items();
        if self.selected >= total {
            self.selected = total.saturating_sub(1);
        }
        self.update_scroll_offset();
    }

    fn read_dir(dir: &Path, filter: &str) -> Vec<fs::DirEntry> {
        let filter = filter.to_lowercase();
        let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir.filter_map(|e| e.ok()).collect(),
            Err(_) => vec![],
        };
        entries.retain(|e| {
            let is_dir = e.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                return true;
            }
            if !is_dataset_file(&e.path()) {
                return false;
            }
            filter.is_empty()
                || e.file_name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&filter)
        });
        entries.sort_by_key(|e| {
            let is_file = e.file_type().map(|ft| ft.is_file()).unwrap_or(true);
            (is_file, e.file_name())
        });
        entries
    }

    fn at_root(&self) -> bool {
        self.current_dir.parent().is_none()
    }

    /// Number of selectable rows, counting the virtual `..` row.
    fn total_items(&self) -> usize {
        let entries_offset = if self.at_root() { 0 } else { 1 };
        self.entries.len() + entries_offset
    }

    fn go_to_parent(&mut self) {
        if let Some(parent) = self.current_dir.parent() {
            self.current_dir = parent.to_path_buf();
            self.selected = 0;
            self.scroll_offset = 0;
            self.refresh();
        }
    }

    fn descend(&mut self, dir: PathBuf) {
        self.current_dir = dir;
        self.selected = 0;
        self.scroll_offset = 0;
        self.refresh();
    }

    /// Handle a key event; returns the chosen dataset path when the user
    /// opens a file.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<PathBuf> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if self.filter_active {
            match key.code {
                KeyCode::Tab | KeyCode::Esc | KeyCode::Enter => {
                    self.filter_active = false;
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                    self.refresh();
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                    self.refresh();
                }
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Tab => {
                self.filter_active = true;
            }
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.update_scroll_offset();
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.total_items() {
                    self.selected += 1;
                    self.update_scroll_offset();
                }
            }
            KeyCode::Backspace => {
                if !self.at_root() {
                    self.go_to_parent();
                }
            }
            KeyCode::Enter => {
                let entries_offset = if self.at_root() { 0 } else { 1 };
                if !self.at_root() && self.selected == 0 {
                    self.go_to_parent();
                    return None;
                }
                let entry_idx = self.selected - entries_offset;
                if let Some(entry) = self.entries.get(entry_idx) {
                    if let Ok(ft) = entry.file_type() {
                        if ft.is_dir() {
                            self.descend(entry.path());
                        } else {
                            return Some(entry.path());
                        }
                    }
                }
            }
            _ => {}
        }
        None
    }

    /// The render pass reports how many list rows fit so scrolling tracks
    /// the real terminal size.
    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows.max(1);
        self.update_scroll_offset();
    }

    fn update_scroll_offset(&mut self) {
        let total_items = self.total_items();
        let visible_rows = self.visible_rows;

        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if total_items > visible_rows && self.selected >= self.scroll_offset + visible_rows {
            self.scroll_offset = self.selected + 1 - visible_rows;
        } else if total_items <= visible_rows {
            self.scroll_offset = 0;
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ],
        )
        .split(area);

        Paragraph::new(self.current_dir.display().to_string())
            .style(Style::default().fg(theme.get("dimmed")))
            .render(layout[0], buf);

        let filter_style = if self.filter_active {
            Style::default().fg(theme.get("panel_border_active"))
        } else {
            Style::default().fg(theme.get("text_secondary"))
        };
        let cursor = if self.filter_active { "_" } else { "" };
        Paragraph::new(Line::from(vec![
            Span::styled("Filter: ", filter_style),
            Span::styled(format!("{}{}", self.filter_input, cursor), filter_style),
        ]))
        .render(layout[1], buf);

        let list_area = layout[2];
        let rows = usize::from(list_area.height);
        let entries_offset = if self.at_root() { 0 } else { 1 };

        let mut lines: Vec<Line> = Vec::with_capacity(self.total_items());
        if !self.at_root() {
            lines.push(Line::from("../"));
        }
        for entry in &self.entries {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                lines.push(Line::from(format!("{}/", name)));
            } else {
                lines.push(Line::from(name));
            }
        }

        let selected_style = Style::default()
            .fg(theme.get("background"))
            .bg(theme.get("accent"))
            .bold();
        let dir_style = Style::default().fg(theme.get("accent"));
        let file_style = Style::default().fg(theme.get("text_primary"));

        for (row, (i, line)) in lines
            .into_iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(rows)
            .enumerate()
        {
            let is_dir_row = i < entries_offset
                || self
                    .entries
                    .get(i - entries_offset)
                    .and_then(|e| e.file_type().ok())
                    .map(|ft| ft.is_dir())
                    .unwrap_or(false);
            let style = if i == self.selected {
                selected_style
            } else if is_dir_row {
                dir_style
            } else {
                file_style
            };
            let row_area = Rect::new(list_area.x, list_area.y + row as u16, list_area.width, 1);
            Paragraph::new(line).style(style).render(row_area, buf);
        }
    }
}
