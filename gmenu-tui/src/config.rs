use gmenu_core::MatchMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub matching: Option<Matching>,
    pub tui: Option<Tui>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Matching {
    /// substring (default) | glob | regex
    pub mode: Option<MatchMode>,
    /// Use case when matching items
    pub case_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tui {
    /// Quiet period after the last keystroke before the list is refiltered (default: 300)
    pub debounce_ms: Option<u64>,
    /// Bold the matched part of each row in substring mode (default: true)
    pub highlight: Option<bool>,
    /// Dialog title (default: "gmenu")
    pub title: Option<String>,
    /// Dialog width in cells; clamped to the terminal
    pub width: Option<u16>,
    /// Dialog height in cells; clamped to the terminal
    pub height: Option<u16>,
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("gmenu")
    } else {
        PathBuf::from("./.config/gmenu")
    }
}

pub fn state_dir() -> PathBuf {
    // Prefer XDG state dir when available; fall back to config dir
    if let Some(bd) = directories::BaseDirs::new() {
        if let Some(sd) = bd.state_dir() {
            return sd.join("gmenu");
        }
    }
    config_dir()
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing file means defaults. A file that cannot be read or parsed is
/// logged and ignored.
pub fn load_settings_from(path: &Path) -> Settings {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read settings");
            return Settings::default();
        }
    };
    match toml::from_str(&s) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
            Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let s: Settings = toml::from_str(
            r#"
            [matching]
            mode = "glob"
            case_sensitive = true

            [tui]
            debounce_ms = 120
            highlight = false
            title = "run"
            width = 60
            height = 12
            "#,
        )
        .unwrap();
        let m = s.matching.unwrap();
        assert_eq!(m.mode, Some(MatchMode::Glob));
        assert_eq!(m.case_sensitive, Some(true));
        let t = s.tui.unwrap();
        assert_eq!(t.debounce_ms, Some(120));
        assert_eq!(t.highlight, Some(false));
        assert_eq!(t.title.as_deref(), Some("run"));
        assert_eq!((t.width, t.height), (Some(60), Some(12)));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.toml"));
        assert!(s.matching.is_none() && s.tui.is_none());
    }

    #[test]
    fn malformed_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[matching]\nmode = \"fuzzy\"\n").unwrap();
        let s = load_settings_from(&path);
        assert!(s.matching.is_none());
    }
}
