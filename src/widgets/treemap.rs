use std::cmp::Ordering;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::charts::TreemapData;
use crate::config::Theme;
use crate::format::{format_count, truncate_label};

const MIN_LABEL_WIDTH: u16 = 5;
const MIN_LABEL_HEIGHT: u16 = 2;

/// Top Songs by Listeners as nested rectangles. One tile per row, sized by
/// the row's listener count; repeated songs keep separate tiles.
pub struct Treemap<'a> {
    pub data: &'a TreemapData,
    pub theme: &'a Theme,
}

impl Widget for &Treemap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.tiles.is_empty() || area.width == 0 || area.height == 0 {
            Paragraph::new("No data points")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        let sizes: Vec<f64> = self.data.tiles.iter().map(|(_, size)| *size).collect();
        let rects = layout_tiles(&sizes, area);

        let text_fg = self.theme.get("background");
        for (i, rect) in rects.iter().enumerate() {
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            let color = self.theme.series_color(i);
            buf.set_style(*rect, Style::default().bg(color));

            if rect.width >= MIN_LABEL_WIDTH && rect.height >= MIN_LABEL_HEIGHT {
                let (label, size) = &self.data.tiles[i];
                let text_style = Style::default().fg(text_fg).bg(color);
                let max_chars = (rect.width - 2) as usize;
                buf.set_stringn(
                    rect.x + 1,
                    rect.y,
                    truncate_label(label, max_chars),
                    max_chars,
                    text_style,
                );
                if rect.height >= 3 {
                    buf.set_stringn(
                        rect.x + 1,
                        rect.y + 1,
                        format_count(*size),
                        max_chars,
                        text_style,
                    );
                }
            }
        }
    }
}

/// Compute one cell rect per tile, filling `area` exactly. Tiles are placed
/// largest-first by recursive halving: the tile list splits at roughly half
/// the total weight and the rect splits along its longer side in the same
/// proportion. Tiles that end up with no cells come back zero-sized.
pub fn layout_tiles(sizes: &[f64], area: Rect) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); sizes.len()];
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].partial_cmp(&sizes[a]).unwrap_or(Ordering::Equal));
    subdivide(sizes, &order, area, &mut rects);
    rects
}

fn subdivide(sizes: &[f64], items: &[usize], rect: Rect, rects: &mut [Rect]) {
    match items {
        [] => return,
        [only] => {
            rects[*only] = rect;
            return;
        }
        _ => {}
    }
    if rect.width == 0 || rect.height == 0 {
        for &i in items {
            rects[i] = Rect::new(rect.x, rect.y, 0, 0);
        }
        return;
    }

    let total: f64 = items.iter().map(|&i| sizes[i]).sum();
    let mut prefix = 0.0;
    let mut split = 0;
    for (n, &i) in items.iter().enumerate() {
        prefix += sizes[i];
        if prefix >= total / 2.0 {
            split = n + 1;
            break;
        }
    }
    let split = split.clamp(1, items.len() - 1);
    let (head, tail) = items.split_at(split);
    let head_sum: f64 = head.iter().map(|&i| sizes[i]).sum();
    let frac = if total > 0.0 { head_sum / total } else { 0.5 };

    if rect.width >= rect.height && rect.width >= 2 {
        let w1 = (f64::from(rect.width) * frac)
            .round()
            .clamp(1.0, f64::from(rect.width - 1)) as u16;
        subdivide(sizes, head, Rect::new(rect.x, rect.y, w1, rect.height), rects);
        subdivide(
            sizes,
            tail,
            Rect::new(rect.x + w1, rect.y, rect.width - w1, rect.height),
            rects,
        );
    } else if rect.height >= 2 {
        let h1 = (f64::from(rect.height) * frac)
            .round()
            .clamp(1.0, f64::from(rect.height - 1)) as u16;
        subdivide(sizes, head, Rect::new(rect.x, rect.y, rect.width, h1), rects);
        subdivide(
            sizes,
            tail,
            Rect::new(rect.x, rect.y + h1, rect.width, rect.height - h1),
            rects,
        );
    } else {
        // A single cell cannot split further; the heavier half keeps it.
        subdivide(sizes, head, rect, rects);
        subdivide(sizes, tail, Rect::new(rect.x, rect.y, 0, 0), rects);
    }
}
