//! Color palettes. Chosen by name from the CLI/config; `t` flips between them.
use ratatui::style::Color;

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    /// Dark terminal-palette theme.
    pub fn dark() -> Self {
        Self {
            name: "dark",
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Catppuccin Mocha.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            name: "mocha",
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            warning: Color::Rgb(0xfa, 0xb3, 0x87),      // peach
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Unknown names fall back to `mocha`.
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Self::dark(),
            "mocha" => Self::mocha(),
            other => {
                tracing::warn!(theme = other, "unknown theme, using mocha");
                Self::mocha()
            }
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "mocha" { Self::dark() } else { Self::mocha() }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_and_toggle() {
        assert_eq!(Theme::by_name("DARK").name, "dark");
        assert_eq!(Theme::by_name("solarized").name, "mocha");
        assert_eq!(Theme::mocha().toggled().name, "dark");
        assert_eq!(Theme::dark().toggled().name, "mocha");
    }
}
