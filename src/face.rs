//! Faces and themes
//!
//! A face is a named Style. The FaceTable holds the base style of every
//! face plus a stack of temporary overrides; resolving a face layers the
//! live overrides on its base style in push order.

use std::collections::HashMap;

use crate::syntax::{Color, Style, TokenType};

/// Face for buffer text with no other face
pub const DEFAULT_FACE: &str = "default";
/// Face the paren matcher draws a matched pair with
pub const PAREN_MATCH_FACE: &str = "paren-match";
/// Face the paren matcher draws an unmatched delimiter with
pub const PAREN_MISMATCH_FACE: &str = "paren-mismatch";

/// Token for a temporary face override, used to release it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverrideHandle(u64);

/// Partial style layered over a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceOverride {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl FaceOverride {
    /// Override only the foreground
    pub fn foreground(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
        }
    }

    fn apply(&self, mut style: Style) -> Style {
        if let Some(fg) = self.fg {
            style.fg = fg;
        }
        if let Some(bg) = self.bg {
            style.bg = bg;
        }
        style
    }
}

/// A color theme: the default background plus a style per face
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name ("dark", "light", "terminal")
    pub name: String,
    /// Background of the default face; `Color::Default` when the theme
    /// leaves it to the terminal
    pub background: Color,
    /// Foreground of the default face
    pub foreground: Color,
    /// Styles for token faces
    token_styles: Vec<(TokenType, Style)>,
    /// Style of a matched delimiter pair
    pub paren_match: Style,
    /// Style of an unmatched delimiter
    pub paren_mismatch: Style,
}

impl Theme {
    /// Light text on black
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color::Black,
            foreground: Color::White,
            token_styles: TokenType::ALL.iter().map(|t| (*t, t.default_style())).collect(),
            paren_match: Style::fg(Color::BrightWhite).with_bg(Color::Blue),
            paren_mismatch: Style::fg(Color::BrightWhite).with_bg(Color::Red),
        }
    }

    /// Dark text on bright white
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color::BrightWhite,
            foreground: Color::Black,
            token_styles: TokenType::ALL.iter().map(|t| (*t, t.light_style())).collect(),
            paren_match: Style::fg(Color::Black).with_bg(Color::BrightCyan),
            paren_mismatch: Style::fg(Color::BrightWhite).with_bg(Color::Red),
        }
    }

    /// Dark token colors over whatever the terminal's own colors are
    pub fn terminal() -> Self {
        Self {
            name: "terminal".to_string(),
            background: Color::Default,
            foreground: Color::Default,
            ..Self::dark()
        }
    }

    /// Look up a built-in theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "terminal" => Some(Self::terminal()),
            _ => None,
        }
    }

    /// Every face this theme defines, with its style
    pub fn faces(&self) -> Vec<(String, Style)> {
        let mut faces = vec![(
            DEFAULT_FACE.to_string(),
            Style::fg(self.foreground).with_bg(self.background),
        )];
        faces.extend(
            self.token_styles
                .iter()
                .filter(|(t, _)| *t != TokenType::Default)
                .map(|(t, style)| (t.face_name().to_string(), *style)),
        );
        faces.push((PAREN_MATCH_FACE.to_string(), self.paren_match));
        faces.push((PAREN_MISMATCH_FACE.to_string(), self.paren_mismatch));
        faces
    }
}

/// Named faces with temporary overrides
#[derive(Debug, Default)]
pub struct FaceTable {
    faces: HashMap<String, Style>,
    overrides: Vec<(OverrideHandle, String, FaceOverride)>,
    next_handle: u64,
}

impl FaceTable {
    /// Face table holding every face of a theme
    pub fn from_theme(theme: &Theme) -> Self {
        let mut table = Self::default();
        table.apply_theme(theme);
        table
    }

    /// Replace the theme's faces; other faces and overrides are kept
    pub fn apply_theme(&mut self, theme: &Theme) {
        for (name, style) in theme.faces() {
            self.faces.insert(name, style);
        }
    }

    /// Base style of a face, without overrides
    pub fn get(&self, name: &str) -> Option<Style> {
        self.faces.get(name).copied()
    }

    /// Define or redefine a face
    pub fn set(&mut self, name: &str, style: Style) {
        self.faces.insert(name.to_string(), style);
    }

    /// Forget a face; returns whether it was defined
    pub fn remove(&mut self, name: &str) -> bool {
        self.faces.remove(name).is_some()
    }

    /// Effective style of a face: base style plus live overrides
    ///
    /// Unknown faces resolve to the unstyled default.
    pub fn resolve(&self, name: &str) -> Style {
        let base = self.get(name).unwrap_or_default();
        self.overrides
            .iter()
            .filter(|(_, face, _)| face == name)
            .fold(base, |style, (_, _, ov)| ov.apply(style))
    }

    /// Layer a temporary override on a face
    pub fn push_override(&mut self, name: &str, ov: FaceOverride) -> OverrideHandle {
        let handle = OverrideHandle(self.next_handle);
        self.next_handle += 1;
        self.overrides.push((handle, name.to_string(), ov));
        handle
    }

    /// Drop an override; returns whether the handle was live
    pub fn release(&mut self, handle: OverrideHandle) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|(h, _, _)| *h != handle);
        self.overrides.len() != before
    }

    /// Number of live overrides
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_defines_token_faces() {
        let table = FaceTable::from_theme(&Theme::dark());
        assert_eq!(table.get("paren"), Some(TokenType::Paren.default_style()));
        assert_eq!(table.get(DEFAULT_FACE).map(|s| s.bg), Some(Color::Black));
        assert!(table.get(PAREN_MATCH_FACE).is_some());
        assert_eq!(table.get("no-such-face"), None);
    }

    #[test]
    fn test_theme_by_name() {
        assert_eq!(Theme::by_name("Light").map(|t| t.background), Some(Color::BrightWhite));
        assert_eq!(Theme::by_name("terminal").map(|t| t.background), Some(Color::Default));
        assert!(Theme::by_name("solarized").is_none());
    }

    #[test]
    fn test_overrides_layer_and_release() {
        let mut table = FaceTable::from_theme(&Theme::dark());
        let base = table.resolve(PAREN_MATCH_FACE);

        let first = table.push_override(PAREN_MATCH_FACE, FaceOverride::foreground(Color::Red));
        let second = table.push_override(PAREN_MATCH_FACE, FaceOverride::foreground(Color::Green));
        assert_eq!(table.resolve(PAREN_MATCH_FACE).fg, Color::Green);
        assert_eq!(table.resolve(PAREN_MATCH_FACE).bg, base.bg);
        assert_eq!(table.override_count(), 2);

        assert!(table.release(second));
        assert_eq!(table.resolve(PAREN_MATCH_FACE).fg, Color::Red);
        assert!(table.release(first));
        assert!(!table.release(first));
        assert_eq!(table.resolve(PAREN_MATCH_FACE), base);
    }

    #[test]
    fn test_apply_theme_keeps_custom_faces() {
        let mut table = FaceTable::from_theme(&Theme::dark());
        table.set("custom", Style::fg(Color::Cyan));
        let handle = table.push_override("paren", FaceOverride::foreground(Color::Black));

        table.apply_theme(&Theme::light());
        assert_eq!(table.get("custom"), Some(Style::fg(Color::Cyan)));
        assert_eq!(table.resolve("paren").fg, Color::Black);
        assert!(table.release(handle));
        assert_eq!(table.resolve("paren"), TokenType::Paren.light_style());
    }
}
