use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use polars::prelude::DataFrame;
use tracing::{error, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Paragraph};

pub mod charts;
pub mod config;
pub mod dataset;
pub mod format;
pub mod logging;
pub mod session;
pub mod upload;
pub mod widgets;

pub use config::{rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::{Dataset, OpenOptions};
pub use session::{Screen, SessionState};
pub use tunedash_cli::Args;

use charts::{applicable_charts, ChartKind, KpiSummary};
use dataset::{COL_COUNTRY, COL_LISTENERS, COL_PLAYS_BY_SONG, COL_REVENUE, COL_TOP_SONGS, GENRE_ALL};
use format::{format_count, format_currency};
use upload::UploadBrowser;
use widgets::category_bar::{CategoryBarChart, ValueFormat};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::kpi::KpiRow;
use widgets::sunburst::Sunburst;
use widgets::treemap::Treemap;
use widgets::worldmap::WorldMap;
use widgets::xy_chart::{ScatterChart, TimeSeriesChart};

pub const APP_NAME: &str = "tunedash";

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Request to upload a file. Flips the status line to "Loading" and
    /// schedules DoLoad so that line gets drawn before the blocking read.
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions),
    Exit,
}

pub struct App {
    pub session: SessionState,
    pub dataset: Option<Dataset>,
    pub browser: UploadBrowser,
    /// Distinct genres with the "All" sentinel first; empty when the dataset
    /// has no Genre column.
    pub genre_values: Vec<String>,
    pub genre_index: usize,
    /// Charts whose required columns the dataset has, in presentation order.
    pub charts: Vec<ChartKind>,
    pub chart_index: usize,
    /// The dataset restricted to the selected genre. Every KPI and chart
    /// reads from here, never from the raw frame.
    filtered: Option<DataFrame>,
    pub load_error: Option<String>,
    loading: Option<PathBuf>,
    pub open_options: OpenOptions,
    events: Sender<AppEvent>,
    debug: DebugState,
    theme: Theme,
    config: AppConfig,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to create default theme: {}. Using fallback.",
                e
            );
            Theme {
                colors: std::collections::HashMap::new(),
            }
        });

        Self::new_with_config(events, theme, AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        App {
            session: SessionState::new(),
            dataset: None,
            browser: UploadBrowser::new(None),
            genre_values: Vec::new(),
            genre_index: 0,
            charts: Vec::new(),
            chart_index: 0,
            filtered: None,
            load_error: None,
            loading: None,
            open_options: OpenOptions::new(),
            events,
            debug: DebugState::default(),
            theme,
            config,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn with_open_options(mut self, options: OpenOptions) -> Self {
        self.open_options = options;
        self
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }

    /// The genre every KPI and chart read is restricted to.
    pub fn selected_genre(&self) -> &str {
        self.genre_values
            .get(self.genre_index)
            .map(String::as_str)
            .unwrap_or(GENRE_ALL)
    }

    /// KPI totals over the genre-filtered rows. Zero when nothing is loaded.
    pub fn kpis(&self) -> KpiSummary {
        self.filtered
            .as_ref()
            .map(charts::kpi_summary)
            .unwrap_or_default()
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                self.load_error = None;
                self.loading = Some(path.clone());
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                self.load(path, options);
                self.loading = None;
                None
            }
            AppEvent::Resize(_cols, _rows) => None,
            AppEvent::Exit => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match self.session.screen {
            Screen::Landing => self.key_landing(event),
            Screen::Upload => self.key_upload(event),
            Screen::Explore => self.key_explore(event),
        }
    }

    fn key_landing(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Enter => {
                if self.session.start() {
                    self.debug.last_action = "start".to_string();
                }
                None
            }
            KeyCode::Char('q') => Some(AppEvent::Exit),
            _ => None,
        }
    }

    fn key_upload(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        // While the filter is being typed every key belongs to the browser,
        // so plain letters like q and g reach the input.
        if self.browser.filter_active {
            return self
                .browser
                .handle_key_event(*event)
                .map(|path| AppEvent::Open(path, self.open_options.clone()));
        }

        match event.code {
            KeyCode::Char('q') => Some(AppEvent::Exit),
            KeyCode::Char('g') => {
                if self.dataset.is_some() && self.session.generate() {
                    self.debug.last_action = "generate".to_string();
                }
                None
            }
            _ => self
                .browser
                .handle_key_event(*event)
                .map(|path| AppEvent::Open(path, self.open_options.clone())),
        }
    }

    fn key_explore(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('q') => Some(AppEvent::Exit),
            KeyCode::Esc => {
                if self.session.back() {
                    self.debug.last_action = "back".to_string();
                }
                None
            }
            KeyCode::Char('c') => {
                if self.session.show_conclusion() {
                    self.debug.last_action = "conclusion".to_string();
                }
                None
            }
            KeyCode::Right => {
                self.next_chart();
                None
            }
            KeyCode::Left => {
                self.previous_chart();
                None
            }
            KeyCode::Down => {
                self.next_genre();
                None
            }
            KeyCode::Up => {
                self.previous_genre();
                None
            }
            _ => None,
        }
    }

    fn next_chart(&mut self) {
        if self.charts.is_empty() {
            return;
        }
        self.chart_index = (self.chart_index + 1) % self.charts.len();
        self.debug.last_action = "next_chart".to_string();
    }

    fn previous_chart(&mut self) {
        if self.charts.is_empty() {
            return;
        }
        self.chart_index = (self.chart_index + self.charts.len() - 1) % self.charts.len();
        self.debug.last_action = "previous_chart".to_string();
    }

    fn next_genre(&mut self) {
        if self.genre_index + 1 < self.genre_values.len() {
            self.genre_index += 1;
            self.debug.last_action = "next_genre".to_string();
            self.refresh_filtered();
        }
    }

    fn previous_genre(&mut self) {
        if !self.genre_values.is_empty() && self.genre_index > 0 {
            self.genre_index -= 1;
            self.debug.last_action = "previous_genre".to_string();
            self.refresh_filtered();
        }
    }

    fn load(&mut self, path: &Path, options: &OpenOptions) {
        match Dataset::load(path, options) {
            Ok(dataset) => {
                self.load_error = None;
                self.set_dataset(dataset);
            }
            Err(e) => {
                // A bad file is not fatal: report on the upload screen and
                // keep whatever dataset was loaded before.
                error!(path = %path.display(), "failed to load dataset: {e}");
                self.load_error = Some(format!("Could not open {}: {e}", path.display()));
            }
        }
    }

    /// Install a dataset, replacing any previous one wholesale. Genre and
    /// chart selections restart from the beginning.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.genre_values = dataset.genre_values();
        self.genre_index = 0;
        self.charts = applicable_charts(&dataset.columns);
        self.chart_index = 0;
        self.dataset = Some(dataset);
        self.refresh_filtered();
    }

    fn refresh_filtered(&mut self) {
        self.filtered = match &self.dataset {
            Some(dataset) => match dataset.filtered(self.selected_genre()) {
                Ok(df) => Some(df),
                Err(e) => {
                    warn!(genre = self.selected_genre(), "genre filter failed: {e}");
                    Some(dataset.df.clone())
                }
            },
            None => None,
        };
    }

    fn render_landing(&self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .split(area);

        let lines = vec![
            Line::styled("TuneDash", Style::default().fg(self.color("title")).bold()),
            Line::default(),
            Line::styled(
                "Explore revenue, plays, and listeners from a music-catalog export.",
                Style::default().fg(self.color("text_primary")),
            ),
            Line::default(),
            Line::styled(
                "Press Enter to upload a dataset",
                Style::default().fg(self.color("accent")).bold(),
            ),
            Line::styled("q quits", Style::default().fg(self.color("dimmed"))),
        ];
        Paragraph::new(lines).centered().render(layout[1], buf);

        Paragraph::new(format!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .style(Style::default().fg(self.color("dimmed")))
            .centered()
            .render(layout[3], buf);
    }

    fn render_upload(&mut self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(
            "Select a dataset to upload. Every listed file is parsed as delimited text, whatever its extension says.",
        )
        .style(Style::default().fg(self.color("text_primary")))
        .render(layout[0], buf);

        let list_area = layout[2];
        // The browser spends two of its rows on the path and filter lines.
        self.browser
            .set_visible_rows(usize::from(list_area.height).saturating_sub(2));
        self.browser.render(list_area, buf, &self.theme);

        Paragraph::new(self.upload_status_line()).render(layout[3], buf);
    }

    fn upload_status_line(&self) -> Line<'_> {
        if let Some(path) = &self.loading {
            return Line::styled(
                format!("Loading {}...", path.display()),
                Style::default().fg(self.color("warning")),
            );
        }
        if let Some(error) = &self.load_error {
            return Line::styled(error.clone(), Style::default().fg(self.color("error")));
        }
        match &self.dataset {
            Some(dataset) => {
                let name = dataset
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| dataset.path.display().to_string());
                Line::styled(
                    format!(
                        "Loaded {} ({} rows, {} columns). Press g to generate the dashboard.",
                        name,
                        dataset.height(),
                        dataset.width()
                    ),
                    Style::default().fg(self.color("accent")),
                )
            }
            None => Line::styled(
                "Open a file with Enter to upload it.",
                Style::default().fg(self.color("dimmed")),
            ),
        }
    }

    fn render_explore(&self, area: Rect, buf: &mut Buffer) {
        let Some(dataset) = &self.dataset else {
            Paragraph::new("No dataset loaded. Press Esc to go back and upload one.")
                .style(Style::default().fg(self.color("dimmed")))
                .centered()
                .render(area, buf);
            return;
        };
        let df = self.filtered.as_ref().unwrap_or(&dataset.df);

        let show_conclusion = self.session.conclusion_visible;
        let mut constraints = vec![
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ];
        if show_conclusion {
            constraints.push(Constraint::Length(6));
        }
        constraints.push(Constraint::Length(1));
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let summary = charts::kpi_summary(df);
        let kpi = KpiRow {
            summary: &summary,
            currency_symbol: &self.config.display.currency_symbol,
            caption: &self.config.display.kpi_caption,
            theme: &self.theme,
        };
        kpi.render(layout[0], buf);

        self.render_genre_line(layout[1], buf);
        self.render_chart_tabs(layout[2], buf);
        self.render_chart(df, layout[3], buf);

        if show_conclusion {
            self.render_conclusion(&summary, df, layout[4], buf);
        }

        if let Some(kind) = self.charts.get(self.chart_index) {
            Paragraph::new(kind.description())
                .style(Style::default().fg(self.color("text_secondary")))
                .render(layout[layout.len() - 1], buf);
        }
    }

    fn render_genre_line(&self, area: Rect, buf: &mut Buffer) {
        let line = if self.genre_values.is_empty() {
            // The filter degrades to a visible warning, not a blank line,
            // when there is nothing to filter on.
            Line::styled(
                "No Genre column in this dataset; showing every row.",
                Style::default().fg(self.color("warning")),
            )
        } else {
            Line::from(vec![
                Span::styled("Genre: ", Style::default().fg(self.color("text_secondary"))),
                Span::styled(
                    self.selected_genre().to_string(),
                    Style::default().fg(self.color("accent")).bold(),
                ),
                Span::styled(
                    format!("  ({}/{})", self.genre_index + 1, self.genre_values.len()),
                    Style::default().fg(self.color("dimmed")),
                ),
            ])
        };
        Paragraph::new(line).render(area, buf);
    }

    fn render_chart_tabs(&self, area: Rect, buf: &mut Buffer) {
        if self.charts.is_empty() {
            Paragraph::new("No charts available; the dataset has none of the charted columns.")
                .style(Style::default().fg(self.color("warning")))
                .render(area, buf);
            return;
        }

        let mut spans: Vec<Span> = Vec::with_capacity(self.charts.len() * 2);
        for (i, kind) in self.charts.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if i == self.chart_index {
                Style::default()
                    .fg(self.color("background"))
                    .bg(self.color("accent"))
                    .bold()
            } else {
                Style::default().fg(self.color("text_secondary"))
            };
            spans.push(Span::styled(format!(" {} ", kind.title()), style));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_chart(&self, df: &DataFrame, area: Rect, buf: &mut Buffer) {
        let Some(kind) = self.charts.get(self.chart_index).copied() else {
            Paragraph::new("Upload a dataset with song, country, or revenue columns to see charts here.")
                .style(Style::default().fg(self.color("dimmed")))
                .centered()
                .render(area, buf);
            return;
        };

        let block = Block::bordered()
            .border_style(Style::default().fg(self.color("panel_border")))
            .title(Span::styled(
                kind.title(),
                Style::default().fg(self.color("title")).bold(),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let limit = self.config.performance.chart_row_limit;
        let outcome: Result<()> = match kind {
            ChartKind::PlaysBySong => {
                charts::prepare_category_bars(df, COL_TOP_SONGS, COL_PLAYS_BY_SONG, limit).map(
                    |data| {
                        let chart = CategoryBarChart {
                            data: &data,
                            value_format: ValueFormat::Count,
                            theme: &self.theme,
                        };
                        chart.render(inner, buf);
                    },
                )
            }
            ChartKind::RevenueByCountryMap => charts::prepare_map(df, limit).map(|data| {
                let chart = WorldMap {
                    data: &data,
                    currency_symbol: &self.config.display.currency_symbol,
                    theme: &self.theme,
                };
                chart.render(inner, buf);
            }),
            ChartKind::RevenueByCountryBar => {
                charts::prepare_category_bars(df, COL_COUNTRY, COL_REVENUE, limit).map(|data| {
                    let chart = CategoryBarChart {
                        data: &data,
                        value_format: ValueFormat::Currency(&self.config.display.currency_symbol),
                        theme: &self.theme,
                    };
                    chart.render(inner, buf);
                })
            }
            ChartKind::PlaysVsListeners => charts::prepare_scatter(df, limit).map(|data| {
                let chart = ScatterChart {
                    data: &data,
                    theme: &self.theme,
                };
                chart.render(inner, buf);
            }),
            ChartKind::RevenueOverTime => charts::prepare_time_series(df, limit).map(|series| {
                let chart = TimeSeriesChart {
                    series: &series,
                    theme: &self.theme,
                };
                chart.render(inner, buf);
            }),
            ChartKind::TopSongsByListeners => charts::prepare_treemap(df, limit).map(|data| {
                let chart = Treemap {
                    data: &data,
                    theme: &self.theme,
                };
                chart.render(inner, buf);
            }),
            ChartKind::GenreTopSongs => charts::prepare_sunburst(df, limit).map(|data| {
                let chart = Sunburst {
                    data: &data,
                    theme: &self.theme,
                };
                chart.render(inner, buf);
            }),
        };

        if let Err(e) = outcome {
            warn!(chart = kind.title(), "chart preparation failed: {e}");
            Paragraph::new(format!("Chart unavailable: {e}"))
                .style(Style::default().fg(self.color("error")))
                .centered()
                .render(inner, buf);
        }
    }

    fn render_conclusion(
        &self,
        summary: &KpiSummary,
        df: &DataFrame,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let block = Block::bordered()
            .border_style(Style::default().fg(self.color("panel_border_active")))
            .title(Span::styled(
                "Conclusion",
                Style::default().fg(self.color("title")).bold(),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .conclusion_lines(summary, df)
            .into_iter()
            .map(|text| Line::styled(text, Style::default().fg(self.color("text_primary"))))
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }

    /// Narrative summary of the current selection. Only speaks about columns
    /// the dataset actually has.
    pub fn conclusion_lines(&self, summary: &KpiSummary, df: &DataFrame) -> Vec<String> {
        let symbol = &self.config.display.currency_symbol;
        let mut lines = vec![format!(
            "{} rows selected: {} revenue, {} plays, {} listeners.",
            df.height(),
            format_currency(summary.revenue, symbol),
            format_count(summary.plays),
            format_count(summary.listeners),
        )];

        if self.selected_genre() != GENRE_ALL {
            lines.push(format!("Filtered to the {} genre.", self.selected_genre()));
        } else if self.genre_values.len() > 1 {
            lines.push(format!(
                "{} genres in the catalog.",
                self.genre_values.len() - 1
            ));
        }

        if let Some((song, listeners)) = top_entry(df, COL_TOP_SONGS, COL_LISTENERS) {
            lines.push(format!(
                "Most listened song: {} ({} listeners).",
                song,
                format_count(listeners)
            ));
        }
        if let Some((country, revenue)) = top_entry(df, COL_COUNTRY, COL_REVENUE) {
            lines.push(format!(
                "Top market: {} ({}).",
                country,
                format_currency(revenue, symbol)
            ));
        }

        lines
    }
}

/// Row with the largest value, as (label, value). None when either column is
/// missing or no row has a usable value.
fn top_entry(df: &DataFrame, label_column: &str, value_column: &str) -> Option<(String, f64)> {
    if df.column(label_column).is_err() || df.column(value_column).is_err() {
        return None;
    }
    let bars = charts::prepare_category_bars(df, label_column, value_column, df.height()).ok()?;
    bars.bars.into_iter().max_by(|a, b| a.1.total_cmp(&b.1))
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        match self.session.screen {
            Screen::Landing => self.render_landing(layout[0], buf),
            Screen::Upload => self.render_upload(layout[0], buf),
            Screen::Explore => self.render_explore(layout[0], buf),
        }

        let row_count = match self.session.screen {
            Screen::Landing => None,
            Screen::Upload => self.dataset.as_ref().map(Dataset::height),
            Screen::Explore => self.filtered.as_ref().map(DataFrame::height),
        };
        let controls = Controls::new(self.session.screen)
            .with_row_count(row_count)
            .with_bg(self.color("controls_bg"));
        controls.render(layout[1], buf);

        if self.debug.enabled {
            self.debug.render(layout[2], buf);
        }
    }
}
