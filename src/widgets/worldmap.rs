use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Paragraph, Widget,
    },
};

use crate::charts::{scale_bucket, MapData};
use crate::config::Theme;
use crate::format::format_currency;

const SCALE_BUCKETS: usize = 5;

/// Revenue by country on a world map. Each row paints a marker at its
/// country's centroid, colored by where the row's revenue falls between the
/// dataset minimum and maximum. Later rows for the same country paint over
/// earlier ones. Countries that cannot be located are skipped.
pub struct WorldMap<'a> {
    pub data: &'a MapData,
    pub currency_symbol: &'a str,
    pub theme: &'a Theme,
}

impl Widget for &WorldMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.rows.is_empty() {
            Paragraph::new("No data points")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        let layout = Layout::new(
            Direction::Vertical,
            [Constraint::Fill(1), Constraint::Length(1)],
        )
        .split(area);

        let located: Vec<((f64, f64), usize)> = self
            .data
            .rows
            .iter()
            .filter_map(|(country, value)| {
                country_centroid(country).map(|center| {
                    (
                        center,
                        scale_bucket(*value, self.data.min, self.data.max, SCALE_BUCKETS),
                    )
                })
            })
            .collect();

        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([-180.0, 180.0])
            .y_bounds([-90.0, 90.0])
            .paint(|ctx| {
                ctx.draw(&Map {
                    resolution: MapResolution::High,
                    color: self.theme.get("map_land"),
                });
                ctx.layer();
                for &((lon, lat), bucket) in &located {
                    let coords = marker_points(lon, lat);
                    ctx.draw(&Points {
                        coords: &coords,
                        color: self.theme.map_scale_color(bucket),
                    });
                }
            })
            .render(layout[0], buf);

        self.render_legend(layout[1], buf);
    }
}

impl WorldMap<'_> {
    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let label_style = Style::default().fg(self.theme.get("text_secondary"));
        let mut spans = vec![Span::styled("Low ", label_style)];
        for bucket in 0..SCALE_BUCKETS {
            spans.push(Span::styled(
                "██",
                Style::default().fg(self.theme.map_scale_color(bucket)),
            ));
        }
        spans.push(Span::styled(" High", label_style));
        spans.push(Span::styled(
            format!(
                "  {} to {}",
                format_currency(self.data.min, self.currency_symbol),
                format_currency(self.data.max, self.currency_symbol)
            ),
            label_style,
        ));
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Small filled square around the centroid so markers survive the braille
/// grid's resolution at typical terminal sizes.
fn marker_points(lon: f64, lat: f64) -> Vec<(f64, f64)> {
    let mut coords = Vec::with_capacity(63);
    for dx in -4..=4 {
        for dy in -3..=3 {
            coords.push((lon + f64::from(dx), lat + f64::from(dy)));
        }
    }
    coords
}

/// Approximate centroid (longitude, latitude) for a country name, matched
/// case-insensitively after alias normalization.
pub fn country_centroid(name: &str) -> Option<(f64, f64)> {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let canonical = match lowered.as_str() {
        "usa" | "us" | "united states of america" | "america" => "United States",
        "uk" | "great britain" | "britain" => "United Kingdom",
        "korea" | "republic of korea" => "South Korea",
        "russian federation" => "Russia",
        "czech republic" => "Czechia",
        "uae" => "United Arab Emirates",
        "holland" => "Netherlands",
        "viet nam" => "Vietnam",
        _ => trimmed,
    };
    COUNTRY_CENTROIDS
        .iter()
        .find(|(entry, _, _)| entry.eq_ignore_ascii_case(canonical))
        .map(|&(_, lon, lat)| (lon, lat))
}

/// (name, longitude, latitude)
const COUNTRY_CENTROIDS: [(&str, f64, f64); 76] = [
    ("United States", -98.5, 39.8),
    ("Canada", -106.3, 56.1),
    ("Mexico", -102.5, 23.6),
    ("Guatemala", -90.2, 15.8),
    ("Cuba", -79.5, 21.5),
    ("Jamaica", -77.3, 18.1),
    ("Haiti", -72.7, 18.9),
    ("Dominican Republic", -70.2, 18.7),
    ("Costa Rica", -84.1, 9.7),
    ("Panama", -80.1, 8.5),
    ("Colombia", -74.3, 4.6),
    ("Venezuela", -66.6, 6.4),
    ("Ecuador", -78.2, -1.8),
    ("Peru", -75.0, -9.2),
    ("Brazil", -51.9, -14.2),
    ("Bolivia", -63.6, -16.3),
    ("Paraguay", -58.4, -23.4),
    ("Chile", -71.5, -35.7),
    ("Argentina", -63.6, -38.4),
    ("Uruguay", -55.8, -32.5),
    ("Iceland", -19.0, 64.9),
    ("Ireland", -8.2, 53.4),
    ("United Kingdom", -3.4, 55.4),
    ("Portugal", -8.2, 39.4),
    ("Spain", -3.7, 40.5),
    ("France", 2.2, 46.2),
    ("Belgium", 4.5, 50.5),
    ("Netherlands", 5.3, 52.1),
    ("Germany", 10.5, 51.2),
    ("Switzerland", 8.2, 46.8),
    ("Austria", 14.6, 47.5),
    ("Italy", 12.6, 41.9),
    ("Norway", 8.5, 60.5),
    ("Sweden", 18.6, 60.1),
    ("Denmark", 9.5, 56.3),
    ("Finland", 25.7, 61.9),
    ("Poland", 19.1, 51.9),
    ("Czechia", 15.5, 49.8),
    ("Slovakia", 19.7, 48.7),
    ("Hungary", 19.5, 47.2),
    ("Romania", 25.0, 45.9),
    ("Bulgaria", 25.5, 42.7),
    ("Greece", 21.8, 39.1),
    ("Ukraine", 31.2, 48.4),
    ("Russia", 105.3, 61.5),
    ("Turkey", 35.2, 39.0),
    ("Israel", 34.9, 31.0),
    ("Saudi Arabia", 45.1, 23.9),
    ("United Arab Emirates", 53.8, 23.4),
    ("Egypt", 30.8, 26.8),
    ("Morocco", -7.1, 31.8),
    ("Algeria", 1.7, 28.0),
    ("Tunisia", 9.5, 33.9),
    ("Nigeria", 8.7, 9.1),
    ("Ghana", -1.0, 7.9),
    ("Kenya", 37.9, 0.0),
    ("Ethiopia", 40.5, 9.1),
    ("South Africa", 22.9, -30.6),
    ("India", 79.0, 20.6),
    ("Pakistan", 69.3, 30.4),
    ("Bangladesh", 90.4, 23.7),
    ("Sri Lanka", 80.8, 7.9),
    ("Nepal", 84.1, 28.4),
    ("China", 104.2, 35.9),
    ("Japan", 138.3, 36.2),
    ("South Korea", 127.8, 35.9),
    ("Taiwan", 121.0, 23.7),
    ("Hong Kong", 114.1, 22.4),
    ("Thailand", 101.0, 15.9),
    ("Vietnam", 108.3, 14.1),
    ("Philippines", 121.8, 12.9),
    ("Malaysia", 101.9, 4.2),
    ("Singapore", 103.8, 1.4),
    ("Indonesia", 113.9, -0.8),
    ("Australia", 133.8, -25.3),
    ("New Zealand", 174.9, -40.9),
];
