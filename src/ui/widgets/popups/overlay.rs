use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::time::Instant;

/// Glyph of the last transport action, centred over `area`.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(action) = app.tracker.view().visible_action(Instant::now()) else {
        return;
    };
    let theme = &app.theme;

    let (width, height) = (7, 3);
    if area.width < width || area.height < height {
        return;
    }
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay));
    let glyph = Paragraph::new(action.glyph())
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .block(block);
    f.render_widget(glyph, rect);
}
