use ratatui::style::Color;
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuiTheme {
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub border_fg: Color,
    pub match_fg: Color,
}

fn default_highlight_fg() -> Color { Color::Black }
fn default_highlight_bg() -> Color { Color::Cyan }
fn default_border_fg() -> Color { Color::Gray }
fn default_match_fg() -> Color { Color::Yellow }

impl Default for TuiTheme {
    fn default() -> Self {
        TuiTheme {
            highlight_fg: default_highlight_fg(),
            highlight_bg: default_highlight_bg(),
            border_fg: default_border_fg(),
            match_fg: default_match_fg(),
        }
    }
}

#[derive(Deserialize)]
struct RawTheme {
    highlight_fg: Option<String>,
    highlight_bg: Option<String>,
    border_fg: Option<String>,
    match_fg: Option<String>,
}

pub fn load_tui_theme() -> TuiTheme {
    load_tui_theme_from(&crate::config::config_dir().join("theme.toml"))
}

pub fn load_tui_theme_from(path: &Path) -> TuiTheme {
    if let Ok(s) = std::fs::read_to_string(path) {
        match toml::from_str::<RawTheme>(&s) {
            Ok(raw) => {
                return TuiTheme {
                    highlight_fg: raw
                        .highlight_fg
                        .and_then(parse_color)
                        .unwrap_or_else(default_highlight_fg),
                    highlight_bg: raw
                        .highlight_bg
                        .and_then(parse_color)
                        .unwrap_or_else(default_highlight_bg),
                    border_fg: raw
                        .border_fg
                        .and_then(parse_color)
                        .unwrap_or_else(default_border_fg),
                    match_fg: raw
                        .match_fg
                        .and_then(parse_color)
                        .unwrap_or_else(default_match_fg),
                };
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "invalid theme"),
        }
    }
    TuiTheme::default()
}

pub fn parse_color(s: String) -> Option<Color> { parse_color_str(&s) }

fn parse_color_str(s: &str) -> Option<Color> {
    let k = s.trim().to_ascii_lowercase();
    match k.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "reset" | "default" => Some(Color::Reset),
        _ => {
            if let Some(hex) = k.strip_prefix('#') { return parse_hex(hex); }
            if let Some(rest) = k.strip_prefix("rgb(") { return parse_rgb_tuple(rest); }
            None
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() == 6 && hex.is_ascii() {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else { None }
}

fn parse_rgb_tuple(rest: &str) -> Option<Color> {
    let t = rest.strip_suffix(')')?;
    let parts: Vec<_> = t.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 { return None; }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}
