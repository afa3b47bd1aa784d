use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
    Frame,
};

pub mod art;
pub mod controls;
pub mod info;
pub mod progress;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let player_name = app
        .tracker
        .view()
        .player
        .map(|id| id.to_string())
        .unwrap_or_else(|| "Now Playing".to_string());
    let title = Line::from(vec![Span::styled(
        format!(" {player_name} "),
        Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
    )]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(theme.blue))
        .style(Style::default().bg(Color::Reset));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Tiny terminals drop the artwork and the time line
    let compact = inner.height < 12;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                              // 0: Control strip
            Constraint::Min(0),                                 // 1: Artwork
            Constraint::Length(3),                              // 2: Info
            Constraint::Length(1),                              // 3: Progress
            Constraint::Length(if compact { 0 } else { 1 }),    // 4: Time
            Constraint::Length(1),                              // 5: Buttons
            Constraint::Length(if compact { 0 } else { 1 }),    // 6: Volume
        ])
        .split(inner);

    super::strip::render(f, chunks[0], app);
    if !compact {
        art::render(f, chunks[1], app);
    }
    info::render(f, chunks[2], app);
    progress::render_progress(f, chunks[3], app);
    if chunks[4].height > 0 {
        progress::render_time(f, chunks[4], app);
    }
    controls::render_buttons(f, chunks[5], app);
    if chunks[6].height > 0 {
        controls::render_volume(f, chunks[6], app);
    }

    super::popups::overlay::render(f, chunks[1], app);
}
