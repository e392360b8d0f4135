//! Token types for syntax highlighting
//!
//! Each token type names the face its matches are drawn with, and
//! carries the default style that face gets in the dark and light themes.

use super::style::{Color, Style};

/// Semantic token types for Lisp-family highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// `;` line comments and `#| |#` block comments
    Comment,
    /// String literals
    String,
    /// Character literals (`?a`, `#\a`)
    Char,
    /// Numeric literals
    Number,
    /// Special forms and definers (`defun`, `let`, `if`)
    Keyword,
    /// Names introduced by a definer
    Function,
    /// Self-evaluating symbols (`:key`, `nil`, `t`, `#t`)
    Constant,
    /// Reader macros (quote, backquote, unquote)
    Special,
    /// Round parentheses
    Paren,
    /// Square and curly brackets
    Bracket,
    /// Default/plain text (no special highlighting)
    Default,
}

impl TokenType {
    /// Every token type, in display order
    pub const ALL: [TokenType; 11] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Char,
        TokenType::Number,
        TokenType::Keyword,
        TokenType::Function,
        TokenType::Constant,
        TokenType::Special,
        TokenType::Paren,
        TokenType::Bracket,
        TokenType::Default,
    ];

    /// Get the default style for this token type on a dark background
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::Comment => Style::fg(Color::BrightBlack).with_italic(),
            TokenType::String => Style::fg(Color::Green),
            TokenType::Char => Style::fg(Color::Green),
            TokenType::Number => Style::fg(Color::Cyan),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::Function => Style::fg(Color::Blue),
            TokenType::Constant => Style::fg(Color::BrightRed),
            TokenType::Special => Style::fg(Color::BrightYellow),
            TokenType::Paren => Style::fg(Color::White),
            TokenType::Bracket => Style::fg(Color::BrightCyan),
            TokenType::Default => Style::default(),
        }
    }

    /// Get the default style for this token type on a light background
    pub fn light_style(&self) -> Style {
        match self {
            TokenType::Comment => Style::fg(Color::BrightBlack).with_italic(),
            TokenType::String => Style::fg(Color::Green),
            TokenType::Char => Style::fg(Color::Green),
            TokenType::Number => Style::fg(Color::Blue),
            TokenType::Keyword => Style::fg(Color::Magenta).with_bold(),
            TokenType::Function => Style::fg(Color::Blue).with_bold(),
            TokenType::Constant => Style::fg(Color::Red),
            TokenType::Special => Style::fg(Color::Yellow),
            TokenType::Paren => Style::fg(Color::Black),
            TokenType::Bracket => Style::fg(Color::Cyan),
            TokenType::Default => Style::default(),
        }
    }

    /// Name of the face matches of this token type are drawn with
    pub fn face_name(&self) -> &'static str {
        match self {
            TokenType::Comment => "comment",
            TokenType::String => "string",
            TokenType::Char => "char",
            TokenType::Number => "number",
            TokenType::Keyword => "keyword",
            TokenType::Function => "function",
            TokenType::Constant => "constant",
            TokenType::Special => "special",
            TokenType::Paren => "paren",
            TokenType::Bracket => "bracket",
            TokenType::Default => "default",
        }
    }

    /// Parse a token type from its face name
    pub fn from_face_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.face_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles_not_empty() {
        assert!(!TokenType::Comment.default_style().is_default());
        assert!(!TokenType::Paren.default_style().is_default());
        assert!(!TokenType::Paren.light_style().is_default());
        assert!(TokenType::Default.default_style().is_default());
    }

    #[test]
    fn test_face_names_are_unique() {
        for token_type in TokenType::ALL {
            assert_eq!(TokenType::from_face_name(token_type.face_name()), Some(token_type));
        }
        assert_eq!(TokenType::from_face_name("nope"), None);
    }
}
