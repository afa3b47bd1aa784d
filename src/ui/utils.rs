use ratatui::style::Style;
use ratatui::text::Span;

/// Horizontal bar `width` cells wide, filled to `ratio`. With `knob`, the
/// last filled cell becomes a playhead.
pub fn bar(width: usize, ratio: f64, fill: Style, empty: Style, knob: bool) -> Vec<Span<'static>> {
    let filled = (width as f64 * ratio.clamp(0.0, 1.0)).round() as usize;

    (0..width)
        .map(|i| {
            if i < filled {
                if knob && i == filled - 1 {
                    Span::styled("●", fill)
                } else {
                    Span::styled("━", fill)
                }
            } else {
                Span::styled("─", empty)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bar_fill() {
        let s = Style::default();
        assert_eq!(text(&bar(6, 0.5, s, s, true)), "━━●───");
        assert_eq!(text(&bar(4, 1.5, s, s, false)), "━━━━");
        assert_eq!(text(&bar(3, 0.0, s, s, true)), "───");
    }
}
