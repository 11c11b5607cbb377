use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tabdeck_core::links::display_host;
use unicode_width::UnicodeWidthChar;

use crate::app::{App, IconState};

/// Terminal lines per tile, including the spacer below it
pub const TILE_HEIGHT: u16 = 3;

pub struct LinkGridWidget;

impl LinkGridWidget {
    /// Draw the tiles on the visible columns, clipped to the scroll viewport
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let surface = app.scroller.surface();
        let links = app.visible_links();

        if links.is_empty() {
            let message = if app.query.is_empty() {
                "No links yet. Add one with `tabdeck add <url>`"
            } else {
                "No links match the filter"
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(theme.grey1),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let viewport = surface.viewport_cells().min(area.width);
        let left = area.x + (area.width - viewport) / 2;
        let tile_width = surface.tile_width() as i64;
        let rows = surface.rows();

        for column in surface.visible_columns() {
            let x = surface.column_x(column);
            let start = x.max(0);
            let end = (x + tile_width).min(viewport as i64);
            if end <= start {
                continue;
            }
            let skip = (start - x) as u16;

            for row in 0..rows {
                let index = column * rows + row;
                let Some(link) = links.get(index) else {
                    break;
                };
                let y = area.y + row as u16 * TILE_HEIGHT;
                if y + 2 > area.y + area.height {
                    break;
                }

                let selected = index == app.selected;
                let base = if selected {
                    Style::default().bg(theme.selection)
                } else {
                    Style::default().bg(theme.bg0)
                };
                let name_style = if selected {
                    base.fg(theme.fg1).add_modifier(Modifier::BOLD)
                } else {
                    base.fg(theme.fg0)
                };

                let state = app.icon_state(&link.id);
                let glyph_color = match state {
                    IconState::Loaded => theme.icon_loaded,
                    IconState::Loading => theme.icon_loading,
                    IconState::Fallback => theme.icon_fallback,
                };

                let text_width = surface.tile_width().saturating_sub(2) as usize;
                let host = display_host(&link.url).unwrap_or_default();
                let lines = vec![
                    Line::from(vec![
                        Span::styled(state.glyph(), base.fg(glyph_color)),
                        Span::styled(" ", base),
                        Span::styled(pad_to_width(&link.name, text_width), name_style),
                    ]),
                    Line::from(vec![
                        Span::styled("  ", base),
                        Span::styled(pad_to_width(&host, text_width), base.fg(theme.grey1)),
                    ]),
                ];

                let rect = Rect::new(left + start as u16, y, (end - start) as u16, 2);
                frame.render_widget(Paragraph::new(lines).scroll((0, skip)), rect);
            }
        }
    }
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = truncate_to_width(text, width);
    let used: usize = out.chars().map(|c| c.width().unwrap_or(0)).sum();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("GitHub", 10), "GitHub");
        assert_eq!(truncate_to_width("GitHub", 6), "GitHub");
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Hacker News", 8), "Hacker …");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_truncate_counts_wide_chars() {
        // each CJK char is two columns wide
        assert_eq!(truncate_to_width("日本語サイト", 7), "日本語…");
    }

    #[test]
    fn test_pad_fills_tile() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc…");
    }
}
