pub mod theme;
pub mod utils;
pub mod widgets;

pub use theme::Theme;

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn ui(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    widgets::player::render(f, chunks[0], app);

    // Footer hint
    let theme = &app.theme;
    let keys = &app.keys;
    let hint = |key: &str, label: &str| {
        vec![
            Span::styled(
                format!(" {} ", keys.display(key)),
                Style::default().fg(theme.overlay).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label.to_string(), Style::default().fg(theme.overlay)),
        ]
    };
    let footer: Vec<Span> = [
        hint(&keys.play_pause, "play"),
        hint(&keys.next_track, "next"),
        hint(&keys.like, "like"),
        hint(&keys.show_player, "open"),
        hint(&keys.quit, "quit"),
    ]
    .concat();
    f.render_widget(
        Paragraph::new(Line::from(footer)).alignment(Alignment::Right),
        chunks[1],
    );

    widgets::popups::render(f, app);
}
