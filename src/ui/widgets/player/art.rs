use crate::app::{App, ArtworkState};
use crate::artwork::ArtworkRenderer;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    if area.height < 2 {
        return;
    }

    match &app.artwork {
        ArtworkState::Loaded(image) => {
            // Square cover: two pixels per row
            let size = (area.width as u32).min(area.height as u32 * 2);
            let art_lines = ArtworkRenderer::render_thumbnail(image, size);

            let padding_top = (area.height as usize).saturating_sub(art_lines.len()) / 2;
            let mut lines: Vec<Line> = vec![Line::default(); padding_top];
            lines.extend(art_lines);

            let artwork_widget = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().style(Style::default().bg(Color::Reset)));
            f.render_widget(artwork_widget, area);
        }
        ArtworkState::Loading => {
            let p = Paragraph::new(centered(area, "Loading..."))
                .alignment(Alignment::Center)
                .block(Block::default().style(Style::default().fg(theme.yellow)));
            f.render_widget(p, area);
        }
        ArtworkState::Failed | ArtworkState::Idle => {
            // Default background, tinted when a palette is known
            let p = Paragraph::new(centered(area, "♫"))
                .alignment(Alignment::Center)
                .block(Block::default().style(Style::default().fg(theme.overlay).bg(theme.surface)));
            f.render_widget(p, area);
        }
    }
}

fn centered(area: Rect, text: &str) -> String {
    let padding = (area.height as usize).saturating_sub(1) / 2;
    format!("{}{}", "\n".repeat(padding), text)
}
