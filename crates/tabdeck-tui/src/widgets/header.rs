use chrono::{Local, NaiveTime};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode};

pub struct HeaderWidget;

impl HeaderWidget {
    /// Clock on the first line, the filter prompt below it
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let now = Local::now().time();
        let clock = format_clock(now, app.settings.clock_24h, app.settings.show_seconds);

        let filter_line = if app.mode == Mode::Filter || !app.query.is_empty() {
            let cursor = if app.mode == Mode::Filter { "_" } else { "" };
            Line::from(vec![
                Span::styled("/", Style::default().fg(theme.accent)),
                Span::styled(
                    format!("{}{}", app.query, cursor),
                    Style::default().fg(theme.fg0),
                ),
            ])
        } else {
            Line::from(Span::styled(
                "/ to filter",
                Style::default().fg(theme.grey0),
            ))
        };

        let lines = vec![
            Line::from(Span::styled(
                clock,
                Style::default()
                    .fg(theme.clock)
                    .add_modifier(Modifier::BOLD),
            )),
            filter_line,
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.bg0));
        frame.render_widget(paragraph, area);
    }
}

pub fn format_clock(time: NaiveTime, clock_24h: bool, show_seconds: bool) -> String {
    let pattern = match (clock_24h, show_seconds) {
        (true, false) => "%H:%M",
        (true, true) => "%H:%M:%S",
        (false, false) => "%-I:%M %p",
        (false, true) => "%-I:%M:%S %p",
    };
    time.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_formats() {
        let time = NaiveTime::from_hms_opt(14, 5, 9).unwrap();
        assert_eq!(format_clock(time, true, false), "14:05");
        assert_eq!(format_clock(time, true, true), "14:05:09");
        assert_eq!(format_clock(time, false, false), "2:05 PM");
        assert_eq!(format_clock(time, false, true), "2:05:09 PM");
    }
}
