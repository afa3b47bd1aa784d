use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// One-line control strip: state symbol, title button and like button.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.tracker.view();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let title = if view.title_button.is_empty() {
        Span::styled("No music playing", Style::default().fg(theme.overlay))
    } else {
        Span::styled(
            view.title_button.clone(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )
    };

    let left = Line::from(vec![
        Span::styled(
            format!(" {} ", view.strip.glyph()),
            Style::default().fg(theme.base).bg(theme.blue),
        ),
        Span::raw(" "),
        title,
    ]);
    f.render_widget(Paragraph::new(left), chunks[0]);

    let like = match (view.like.enabled, view.like.liked) {
        (false, _) => Span::styled("♥", Style::default().fg(theme.surface)),
        (true, true) => Span::styled("♥", Style::default().fg(theme.red)),
        (true, false) => Span::styled("♡", Style::default().fg(theme.overlay)),
    };
    f.render_widget(
        Paragraph::new(Line::from(like)).alignment(Alignment::Center),
        chunks[1],
    );
}
