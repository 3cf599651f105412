//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Bubble colours and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Bubble colours (index 0..=4): slate, plum, coral, peach, then the wildcard.
    pub bubble: [Color; 5],
    /// Arena background.
    pub bg: Color,
    /// Borders and the defense line.
    pub div_line: Color,
    /// Text (score, combo).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// `0xRRGGBB` → `Color::Rgb`.
const fn hex(v: u32) -> Color {
    Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

const DUSK_BUBBLES: [Color; 5] = [
    hex(0x355070), // slate
    hex(0x6D597A), // plum
    hex(0xE56B6F), // coral
    hex(0xEAAC8B), // peach
    hex(0x8C0000), // wildcard
];

impl Default for Theme {
    fn default() -> Self {
        Self::dusk_default()
    }
}

impl Theme {
    /// Built-in "dusk" palette on a near-black arena.
    pub fn dusk_default() -> Self {
        Self {
            bubble: DUSK_BUBBLES,
            bg: hex(0x121212),
            div_line: hex(0x3F444F),
            main_fg: hex(0xABB2BF),
            title: hex(0xEAAC8B),
            inactive_fg: hex(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Uses the built-in theme if `path` is None or does not exist.
    /// `palette` then optionally overrides the bubble colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    pub fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::dusk_default();
        t.apply_palette(palette);
        t
    }

    /// Override bubble colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.bubble = [
                    hex(0x0088FF), // blue
                    hex(0xFF00FF), // magenta
                    hex(0xFF2020), // red
                    hex(0xFFFF00), // yellow
                    hex(0xFFFFFF), // wildcard
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe-Ito: distinguishable under the common deficiencies
                self.bubble = [
                    hex(0x0072B2), // blue
                    hex(0xCC79A7), // reddish purple
                    hex(0xE69F00), // orange
                    hex(0x56B4E9), // sky blue
                    hex(0xF0E442), // wildcard: yellow
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let base = Self::dusk_default();
        Self {
            bubble: [
                get("cpu_box").unwrap_or(base.bubble[0]),
                get("net_box").unwrap_or(base.bubble[1]),
                get("cpu_end")
                    .or_else(|| get("temp_end"))
                    .unwrap_or(base.bubble[2]),
                get("cpu_mid").unwrap_or(base.bubble[3]),
                get("hi_fg")
                    .or_else(|| get("proc_misc"))
                    .unwrap_or(base.bubble[4]),
            ],
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    /// Colour for a bubble colour index (palette order, wildcard last).
    #[inline]
    pub fn bubble_color(&self, index: u8) -> Color {
        self.bubble[(index as usize) % self.bubble.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let (r, g, b) = if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).map_err(|_| invalid())?;
        let g = u8::from_str_radix(&s[2..4], 16).map_err(|_| invalid())?;
        let b = u8::from_str_radix(&s[4..6], 16).map_err(|_| invalid())?;
        (r, g, b)
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).map_err(|_| invalid())? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).map_err(|_| invalid())? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).map_err(|_| invalid())? * 17;
        (r, g, b)
    } else {
        return Err(invalid());
    };
    Ok(Color::Rgb(r, g, b))
}

/// RGB components of a colour; named colours map to their nominal values.
pub fn rgb_of(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Blue => (0, 0, 255),
        Color::Magenta => (255, 0, 255),
        Color::Cyan => (0, 255, 255),
        Color::Gray => (128, 128, 128),
        Color::DarkGray => (64, 64, 64),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    }
}
