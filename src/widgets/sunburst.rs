use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{canvas::Canvas, canvas::Points, Paragraph, Widget},
};

use crate::charts::SunburstData;
use crate::config::Theme;
use crate::format::truncate_label;

const GENRE_RING: (f64, f64) = (0.35, 0.62);
const SONG_RING: (f64, f64) = (0.68, 0.95);

/// Two-ring sunburst: genres on the inner ring, each genre's songs nested
/// in the matching angular span of the outer ring. Song segments share
/// their genre's color; thin radial gaps mark the boundaries.
pub struct Sunburst<'a> {
    pub data: &'a SunburstData,
    pub theme: &'a Theme,
}

/// Angular extent of one genre and of each of its songs, in radians from
/// the top of the circle, clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreSpan {
    pub start: f64,
    pub end: f64,
    pub songs: Vec<(f64, f64)>,
}

/// Distribute the full circle across genres proportionally to their weight,
/// then subdivide each genre's span across its songs.
pub fn angular_layout(data: &SunburstData) -> Vec<GenreSpan> {
    let mut spans = Vec::with_capacity(data.genres.len());
    if data.total <= 0.0 {
        return spans;
    }
    let mut acc = 0.0;
    for genre in &data.genres {
        let start = acc / data.total * TAU;
        acc += genre.total;
        let end = acc / data.total * TAU;

        let mut songs = Vec::with_capacity(genre.songs.len());
        if genre.total > 0.0 {
            let genre_span = end - start;
            let mut song_acc = 0.0;
            for (_, weight) in &genre.songs {
                let s = start + song_acc / genre.total * genre_span;
                song_acc += weight;
                let e = start + song_acc / genre.total * genre_span;
                songs.push((s, e));
            }
        }
        spans.push(GenreSpan { start, end, songs });
    }
    spans
}

impl Widget for &Sunburst<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.is_empty() || area.width == 0 || area.height < 2 {
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
        let canvas_area = layout[0];

        // Braille cells hold a 2x4 dot grid, which makes the dots close to
        // square. Size the bounds from the dot grid so the rings stay round.
        let dots_w = f64::from(canvas_area.width) * 2.0;
        let dots_h = f64::from(canvas_area.height) * 4.0;
        let (x_half, y_half) = if dots_w >= dots_h {
            (dots_w / dots_h, 1.0)
        } else {
            (1.0, dots_h / dots_w)
        };
        let pitch = 2.0 / dots_w.min(dots_h);

        let spans = angular_layout(self.data);

        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([-x_half, x_half])
            .y_bounds([-y_half, y_half])
            .paint(|ctx| {
                for (i, span) in spans.iter().enumerate() {
                    let color = self.theme.series_color(i);
                    let coords =
                        ring_segment_points(GENRE_RING, span.start, span.end, pitch);
                    ctx.draw(&Points {
                        coords: &coords,
                        color,
                    });
                    for &(s, e) in &span.songs {
                        let coords = ring_segment_points(SONG_RING, s, e, pitch);
                        ctx.draw(&Points {
                            coords: &coords,
                            color,
                        });
                    }
                }
            })
            .render(canvas_area, buf);

        self.render_legend(layout[1], buf);
    }
}

impl Sunburst<'_> {
    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::with_capacity(self.data.genres.len() * 2);
        for (i, genre) in self.data.genres.iter().enumerate() {
            spans.push(Span::styled(
                "■ ",
                Style::default().fg(self.theme.series_color(i)),
            ));
            spans.push(Span::styled(
                format!("{}  ", truncate_label(&genre.name, 14)),
                Style::default().fg(self.theme.get("text_primary")),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Fill one annular segment with points spaced one braille dot apart. A one
/// dot angular gap is left at each edge so neighboring segments read as
/// separate wedges; segments too narrow for gaps are filled edge to edge.
fn ring_segment_points(
    (r0, r1): (f64, f64),
    theta0: f64,
    theta1: f64,
    pitch: f64,
) -> Vec<(f64, f64)> {
    let mut coords = Vec::new();
    let span = theta1 - theta0;
    if span <= 0.0 {
        return coords;
    }
    let step_r = pitch * 0.9;
    let mut r = r0;
    while r <= r1 {
        let gap = pitch / r;
        let (a0, a1) = if span > 3.0 * gap {
            (theta0 + gap / 2.0, theta1 - gap / 2.0)
        } else {
            (theta0, theta1)
        };
        let dtheta = (pitch / r) * 0.9;
        let mut theta = a0;
        while theta <= a1 {
            let drawn = FRAC_PI_2 - theta;
            coords.push((r * drawn.cos(), r * drawn.sin()));
            theta += dtheta;
        }
        r += step_r;
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::SunburstGenre;
    use crate::config::AppConfig;

    fn theme() -> Theme {
        Theme::from_config(&AppConfig::default().theme).unwrap()
    }

    fn sample_data() -> SunburstData {
        SunburstData {
            genres: vec![
                SunburstGenre {
                    name: "Rock".to_string(),
                    total: 60.0,
                    songs: vec![
                        ("Aurora".to_string(), 40.0),
                        ("Basalt".to_string(), 20.0),
                    ],
                },
                SunburstGenre {
                    name: "Pop".to_string(),
                    total: 40.0,
                    songs: vec![("Cinder".to_string(), 40.0)],
                },
            ],
            total: 100.0,
        }
    }

    fn render_to_string(widget: &Sunburst, width: u16, height: u16) -> String {
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
    fn genre_spans_cover_the_circle_proportionally() {
        let spans = angular_layout(&sample_data());
        assert_eq!(spans.len(), 2);
        assert!((spans[0].start - 0.0).abs() < 1e-9);
        assert!((spans[0].end - 0.6 * TAU).abs() < 1e-9);
        assert!((spans[1].start - 0.6 * TAU).abs() < 1e-9);
        assert!((spans[1].end - TAU).abs() < 1e-9);
    }

    #[test]
    fn song_spans_nest_inside_their_genre() {
        let spans = angular_layout(&sample_data());
        let rock = &spans[0];
        assert_eq!(rock.songs.len(), 2);
        let (s0, e0) = rock.songs[0];
        let (s1, e1) = rock.songs[1];
        assert!((s0 - rock.start).abs() < 1e-9);
        assert!((e1 - rock.end).abs() < 1e-9);
        assert!((e0 - s1).abs() < 1e-9);
        // Aurora has twice Basalt's weight, so twice the angle.
        assert!(((e0 - s0) / (e1 - s1) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_layout_for_zero_total() {
        let spans = angular_layout(&SunburstData::default());
        assert!(spans.is_empty());
    }

    #[test]
    fn segment_points_stay_in_the_ring() {
        let coords = ring_segment_points((0.35, 0.62), 0.0, TAU / 4.0, 0.02);
        assert!(!coords.is_empty());
        for (x, y) in coords {
            let r = (x * x + y * y).sqrt();
            assert!((0.35..=0.63).contains(&r), "point left the ring: r={}", r);
        }
    }

    #[test]
    fn renders_genre_legend() {
        let theme = theme();
        let data = sample_data();
        let sunburst = Sunburst {
            data: &data,
            theme: &theme,
        };
        let rendered = render_to_string(&sunburst, 60, 20);
        assert!(rendered.contains("Rock"));
        assert!(rendered.contains("Pop"));
    }

    #[test]
    fn empty_data_shows_placeholder() {
        let theme = theme();
        let data = SunburstData::default();
        let sunburst = Sunburst {
            data: &data,
            theme: &theme,
        };
        let rendered = render_to_string(&sunburst, 40, 5);
        assert!(rendered.contains("No data points"));
    }
}
