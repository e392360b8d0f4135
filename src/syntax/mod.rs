//! Syntax and styling module
//!
//! This module provides the highlighting infrastructure the host
//! exposes to minor modes:
//! - Colors, styles and resolved spans
//! - Comparable highlight rules and their compiled form
//! - Per-buffer font-lock state with add/remove/refontify

mod builtin;
mod language;
mod manager;
mod rules;
mod style;
mod tokens;

pub use builtin::is_lisp_dialect;
pub use language::LanguageDefinition;
pub use manager::{FontLock, SyntaxManager};
pub use rules::{FaceSpan, HighlightRule, PAREN_CHARS};
pub use style::{Color, Span, Style};
pub use tokens::TokenType;
