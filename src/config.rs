//! Configuration file support
//!
//! Loads settings from ~/.paren-hide.toml (or %USERPROFILE%\.paren-hide.toml
//! on Windows).
//!
//! Example:
//! ```text
//! # paren-hide configuration
//! toggle-key = "C-c h"
//! theme = "dark"
//! frame-background = "#1e1e2e"
//! companion = true
//! hide-on-open = false
//! show-line-numbers = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::command::KeyTable;
use crate::error::Result;
use crate::face::Theme;
use crate::input::Key;
use crate::syntax::Color;

/// Default binding of the in-mode toggle
pub const DEFAULT_TOGGLE_KEY: &str = "C-c h";

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Key sequence of the paren-hide toggle
    pub toggle_key: String,
    /// Theme name: "dark", "light" or "terminal"
    pub theme: String,
    /// Frame background color, overriding what the terminal reports
    pub frame_background: Option<String>,
    /// Whether the paren matcher aid is installed
    pub companion: bool,
    /// Whether to hide parentheses as soon as a file is opened
    pub hide_on_open: bool,
    /// Whether to show line numbers
    pub show_line_numbers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toggle_key: DEFAULT_TOGGLE_KEY.to_string(),
            theme: "dark".to_string(),
            frame_background: None,
            companion: true,
            hide_on_open: false,
            show_line_numbers: false,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        let home = std::env::var("USERPROFILE").ok();

        #[cfg(not(windows))]
        let home = std::env::var("HOME").ok();

        home.map(|home| PathBuf::from(home).join(".paren-hide.toml"))
    }

    /// Load configuration, falling back to defaults on any problem
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// The toggle key, or the default binding if the configured one is
    /// invalid or already bound to a global command
    ///
    /// Mode bindings are looked up first, so a globally bound key would
    /// shadow that command while the mode is on.
    pub fn toggle_key(&self) -> Key {
        let key = match Key::parse(&self.toggle_key) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "using default toggle key");
                return Key::ctlc('h');
            }
        };
        match KeyTable::with_defaults().lookup(key) {
            Some(cmd) => {
                warn!(key = %key.display_name(), command = cmd.name(), "toggle key already bound, using default");
                Key::ctlc('h')
            }
            None => key,
        }
    }

    /// The configured theme, or the dark theme if the name is unknown
    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            warn!(theme = %self.theme, "unknown theme, using dark");
            Theme::dark()
        })
    }

    /// The configured frame background, if set and valid
    pub fn frame_background(&self) -> Option<Color> {
        let name = self.frame_background.as_deref()?;
        let color = Color::parse(name);
        if color.is_none() {
            warn!(color = %name, "invalid frame-background");
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewerError;

    #[test]
    fn test_parse_config() {
        let contents = r##"
# Comment
toggle-key = "C-x h"
theme = "light"
frame-background = "#fdf6e3"
companion = false
hide-on-open = true
show-line-numbers = true
        "##;

        let config = Config::parse(contents).unwrap();
        assert_eq!(config.toggle_key(), Key::ctlx('h'));
        assert_eq!(config.theme().name, "light");
        assert_eq!(config.frame_background(), Some(Color::Rgb(0xfd, 0xf6, 0xe3)));
        assert!(!config.companion);
        assert!(config.hide_on_open);
        assert!(config.show_line_numbers);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::parse("theme = \"terminal\"").unwrap();
        assert_eq!(config.toggle_key, DEFAULT_TOGGLE_KEY);
        assert!(config.companion);
        assert_eq!(config.frame_background(), None);
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::parse("toggle-key = \"nonsense key\"\ntheme = \"neon\"\nframe-background = \"mauve\"").unwrap();
        assert_eq!(config.toggle_key(), Key::ctlc('h'));
        assert_eq!(config.theme().name, "dark");
        assert_eq!(config.frame_background(), None);
    }

    #[test]
    fn test_globally_bound_toggle_key_falls_back() {
        for bound in ["C-x p", "q", "C-x C-c", "C-n"] {
            let config = Config::parse(&format!("toggle-key = \"{}\"", bound)).unwrap();
            assert_eq!(config.toggle_key(), Key::ctlc('h'), "{} is a global key", bound);
        }
        let config = Config::parse("toggle-key = \"C-c p\"").unwrap();
        assert_eq!(config.toggle_key(), Key::ctlc('p'));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Config::parse("companion = \"yes\""), Err(ViewerError::Config(_))));
        assert!(matches!(Config::parse("tab-width = 4"), Err(ViewerError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paren-hide.toml");
        fs::write(&path, "hide-on-open = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.hide_on_open);
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
