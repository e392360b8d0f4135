//! Emacs Lisp language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::MultilineRule;
use crate::syntax::tokens::TokenType;

/// Create Emacs Lisp language definition
pub fn emacs_lisp_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Emacs Lisp");
    lang.add_extension("el");

    // Strings (with escape support)
    if let Some(rule) = MultilineRule::with_escape("string", "\"", "\"", TokenType::String.face_name(), 1, '\\') {
        lang.add_multiline(rule);
    }

    // Single-line patterns (priority 0-100, higher = first)

    lang.add_token_rule("comment", r";.*$", TokenType::Comment, 100);

    // Character literals: ?a ?\( ?\C-x
    lang.add_token_rule("char", r"\?(?:\\[CMS]-)*\\?.", TokenType::Char, 95);

    // Definers and special forms
    let keywords = r"\b(?:defun|defmacro|defvar|defcustom|defconst|defgroup|defface|defsubst|define-minor-mode|define-derived-mode|lambda|let\*?|if|when|unless|cond|progn|prog1|while|dolist|dotimes|setq|setq-local|and|or|not|catch|throw|unwind-protect|condition-case|save-excursion|require|provide)\b";
    lang.add_token_rule("keyword", keywords, TokenType::Keyword, 80);

    let builtins = r"\b(?:car|cdr|cons|list|append|mapcar|apply|funcall|format|message|concat|length|nth|eq|equal|memq|assq|plist-get|add-hook|remove-hook)\b";
    lang.add_token_rule("builtin", builtins, TokenType::Function, 75);

    // :keywords and self-evaluating symbols
    lang.add_token_rule("keyword_symbol", r":[\w\-]+", TokenType::Constant, 70);
    lang.add_token_rule("nil_t", r"\b(?:nil|t)\b", TokenType::Constant, 69);

    // Quote, function quote, backquote, unquote
    lang.add_token_rule("quote", r"#'|'|`|,@?", TokenType::Special, 60);

    lang.add_token_rule("float", r"-?\b\d+\.\d+(?:e[+-]?\d+)?\b", TokenType::Number, 51);
    lang.add_token_rule("integer", r"-?\b\d+\b", TokenType::Number, 50);

    lang.add_token_rule("paren", r"[()]", TokenType::Paren, 10);
    lang.add_token_rule("bracket", r"[\[\]]", TokenType::Bracket, 10);

    lang
}
