use ratatui::style::{Color, Modifier, Style};
use spark_core::content::HeadingLevel;

/// Colors used by the feed and reader widgets
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey1: Color,

    pub red: Color,
    pub orange: Color,
    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,
    pub blue: Color,

    pub selection: Color,
    pub accent: Color,
    pub error: Color,
    pub liked: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            red: Color::Rgb(0xea, 0x69, 0x62),
            orange: Color::Rgb(0xe7, 0x8a, 0x4e),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            blue: Color::Rgb(0x7d, 0xae, 0xa3),
            selection: Color::Rgb(0x45, 0x40, 0x3d),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
            error: Color::Rgb(0xea, 0x69, 0x62),
            liked: Color::Rgb(0xea, 0x69, 0x62),
        }
    }
}

impl Theme {
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg0)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.grey1)
    }

    pub fn heading(&self, level: HeadingLevel) -> Style {
        let color = match level {
            HeadingLevel::H1 => self.yellow,
            HeadingLevel::H2 => self.orange,
            HeadingLevel::H3 => self.aqua,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn quote(&self) -> Style {
        Style::default().fg(self.grey1).add_modifier(Modifier::ITALIC)
    }

    pub fn bar(&self) -> Style {
        Style::default().fg(self.fg0).bg(self.bg2)
    }
}
