use crate::app::App;
use crate::ui::utils::bar;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const CENTER_WIDTH: u16 = 30;
const VOLUME_BAR_WIDTH: usize = 16;

pub fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.tracker.view();

    let play_icon = if view.playing { "⏸" } else { "▶" };
    let btn_style = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(CENTER_WIDTH),
            Constraint::Fill(1),
        ])
        .split(area);

    let toggle = |on: bool| {
        if on {
            Style::default().fg(theme.green)
        } else {
            Style::default().fg(theme.surface)
        }
    };

    f.render_widget(
        Paragraph::new(Span::styled("🔀 ", toggle(view.shuffling))).alignment(Alignment::Right),
        layout[0],
    );

    let center = Line::from(vec![
        Span::styled("  ⏮  ", btn_style),
        Span::raw("   "),
        Span::styled(format!("  {play_icon}  "), btn_style),
        Span::raw("   "),
        Span::styled("  ⏭  ", btn_style),
    ]);
    f.render_widget(
        Paragraph::new(center).alignment(Alignment::Center),
        layout[1],
    );

    f.render_widget(
        Paragraph::new(Span::styled(" 🔁", toggle(view.repeating))).alignment(Alignment::Left),
        layout[2],
    );
}

pub fn render_volume(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.tracker.view();

    let mut spans = vec![Span::styled(
        format!("{} ", view.volume_level.glyph()),
        Style::default().fg(theme.overlay),
    )];
    spans.extend(bar(
        VOLUME_BAR_WIDTH,
        view.volume as f64 / 100.0,
        Style::default().fg(theme.magenta),
        Style::default().fg(theme.surface),
        false,
    ));
    spans.push(Span::styled(
        format!(" {:>3}%", view.volume),
        Style::default().fg(theme.overlay),
    ));

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
