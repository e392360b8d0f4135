//! Built-in language definitions
//!
//! This module provides syntax highlighting definitions for
//! the Lisp family.

mod clojure;
mod common_lisp;
mod emacs_lisp;
mod scheme;

use super::language::LanguageDefinition;

/// Names of the built-in languages that belong to the Lisp family
pub const LISP_DIALECTS: [&str; 4] = ["Emacs Lisp", "Scheme", "Common Lisp", "Clojure"];

/// Whether `language` names a Lisp dialect
pub fn is_lisp_dialect(language: &str) -> bool {
    LISP_DIALECTS.contains(&language)
}

/// Get all built-in language definitions
pub fn all_languages() -> Vec<LanguageDefinition> {
    vec![
        emacs_lisp::emacs_lisp_language(),
        scheme::scheme_language(),
        common_lisp::common_lisp_language(),
        clojure::clojure_language(),
    ]
}
