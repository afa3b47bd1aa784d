use crate::app::App;
use crate::tracker::truncate;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let song = &app.tracker.view().song;

    if song.name.is_empty() {
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize;

    let mut lines = vec![Line::from(Span::styled(
        truncate(&song.name, max_width),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ))];
    if !song.artist.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&song.artist, max_width),
            Style::default().fg(theme.magenta),
        )));
    }
    if !song.album.is_empty() {
        lines.push(Line::from(Span::styled(
            truncate(&song.album, max_width),
            Style::default().fg(theme.cyan).add_modifier(Modifier::DIM),
        )));
    }

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
