use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct PageDotsWidget;

impl PageDotsWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let state = app.scroller.snap_state();
        if state.page_count <= 1 {
            return;
        }

        let theme = &app.theme;
        let mut spans = Vec::with_capacity(state.page_count * 2);
        for index in 0..state.page_count {
            if index > 0 {
                spans.push(Span::raw(" "));
            }
            if index == state.active_page_index {
                spans.push(Span::styled("●", Style::default().fg(theme.page_dot_active)));
            } else {
                spans.push(Span::styled("○", Style::default().fg(theme.page_dot)));
            }
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.bg0));
        frame.render_widget(paragraph, area);
    }
}
