use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::time::Instant;

const SLIDE_MS: u128 = 300;

/// Status message above the footer, sliding in from the right.
pub fn render(f: &mut Frame, app: &App) {
    let Some(ref toast) = app.toast else {
        return;
    };
    let theme = &app.theme;
    let screen = f.area();
    let now = Instant::now();

    let width = (toast.message.chars().count() as u16 + 4).min(screen.width.saturating_sub(2));
    let height = 3;
    if screen.height < height + 2 || width == 0 {
        return;
    }

    let entered = now.duration_since(toast.start_time).as_millis();
    let remaining = toast.deadline.saturating_duration_since(now).as_millis();

    // Cubic ease in and out of the right edge
    let hidden = if entered < SLIDE_MS {
        let t = entered as f32 / SLIDE_MS as f32;
        (1.0 - t).powi(3)
    } else if remaining < SLIDE_MS {
        let t = (SLIDE_MS - remaining) as f32 / SLIDE_MS as f32;
        t.powi(3)
    } else {
        0.0
    };

    let x = screen.width.saturating_sub(width + 1) + (width as f32 * hidden) as u16;
    let y = screen.height.saturating_sub(height + 1);
    let area = Rect::new(x, y, width, height).intersection(screen);
    if area.is_empty() {
        return;
    }

    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.blue));
    let text = Paragraph::new(Line::from(Span::styled(
        toast.message.as_str(),
        Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(text, area);
}
