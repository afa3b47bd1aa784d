use ratatui::style::Color;

use crate::artwork::{Palette, Rgb};

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub base: Color,
    pub surface: Color,
    pub overlay: Color,
    pub text: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),
            surface: Color::Rgb(49, 50, 68),
            overlay: Color::Rgb(108, 112, 134),
            text: Color::Rgb(205, 214, 244),
            red: Color::Rgb(243, 139, 168),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            blue: Color::Rgb(137, 180, 250),
            magenta: Color::Rgb(203, 166, 247),
            cyan: Color::Rgb(148, 226, 213),
        }
    }
}

fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

impl Theme {
    /// Tints the accents with the artwork colours.
    pub fn with_palette(mut self, palette: Option<&Palette>) -> Self {
        if let Some(p) = palette {
            self.surface = rgb(p.background);
            self.blue = rgb(p.primary);
            self.magenta = rgb(p.primary);
            self.cyan = rgb(p.secondary);
        }
        self
    }
}
