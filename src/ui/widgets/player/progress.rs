use crate::app::App;
use crate::tracker::format_time;
use crate::ui::utils::bar;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_progress(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.tracker.view();

    if !view.song.is_valid() {
        return;
    }

    let gauge_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(80),
            Constraint::Percentage(10),
        ])
        .split(area)[1];

    // A key-driven gesture shows where the knob is headed
    let ratio = app.scrub.map(|g| g.value).unwrap_or(view.progress);
    let spans = bar(
        gauge_area.width as usize,
        ratio,
        Style::default().fg(theme.magenta),
        Style::default().fg(theme.surface),
        true,
    );
    f.render_widget(Paragraph::new(Line::from(spans)), gauge_area);
}

pub fn render_time(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.tracker.view();

    if !view.song.is_valid() {
        return;
    }

    let line = match &view.time_info {
        // Scrubbing
        Some(info) => Line::from(Span::styled(
            format!("{info} / {}", format_time(view.song.duration)),
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            format!(
                "{} / {}",
                format_time(view.elapsed),
                format_time(view.song.duration)
            ),
            Style::default().fg(theme.overlay),
        )),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
