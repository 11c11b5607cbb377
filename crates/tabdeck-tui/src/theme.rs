use ratatui::style::Color;
use tabdeck_core::links::Background;

/// Runtime colors for the new-tab page
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey1: Color,

    // Palette colors
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub aqua: Color,

    // Semantic colors
    pub selection: Color,
    pub clock: Color,
    pub icon_loaded: Color,
    pub icon_loading: Color,
    pub icon_fallback: Color,
    pub page_dot: Color,
    pub page_dot_active: Color,
    pub error: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg1: Color::Rgb(0x32, 0x30, 0x2f),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            fg1: Color::Rgb(0xdd, 0xc7, 0xa1),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            red: Color::Rgb(0xea, 0x69, 0x62),
            yellow: Color::Rgb(0xd8, 0xa6, 0x57),
            green: Color::Rgb(0xa9, 0xb6, 0x65),
            aqua: Color::Rgb(0x89, 0xb4, 0x82),
            selection: Color::Rgb(0x45, 0x40, 0x3d),
            clock: Color::Rgb(0xdd, 0xc7, 0xa1),
            icon_loaded: Color::Rgb(0xa9, 0xb6, 0x65),
            icon_loading: Color::Rgb(0xd8, 0xa6, 0x57),
            icon_fallback: Color::Rgb(0x92, 0x83, 0x74),
            page_dot: Color::Rgb(0x7c, 0x6f, 0x64),
            page_dot_active: Color::Rgb(0xd4, 0xbe, 0x98),
            error: Color::Rgb(0xea, 0x69, 0x62),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
        }
    }
}

impl Theme {
    /// Theme with the page background taken from a solid-color setting
    ///
    /// Image backgrounds keep the default color.
    pub fn with_background(mut self, background: &Background) -> Self {
        if let Background::Solid { color } = background {
            if let Some(parsed) = parse_hex_color(color) {
                self.bg0 = parsed;
            }
        }
        self
    }
}

/// Parse `#rrggbb` or `#rgb`
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Color::Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#1d2021"), Some(Color::Rgb(0x1d, 0x20, 0x21)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("1d2021"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_image_background_keeps_default() {
        let theme = Theme::default().with_background(&Background::Image {
            url: "https://example.com/bg.jpg".into(),
        });
        assert_eq!(theme.bg0, Theme::default().bg0);
    }
}
