//! Common Lisp language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::MultilineRule;
use crate::syntax::tokens::TokenType;

/// Create Common Lisp language definition
pub fn common_lisp_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Common Lisp");
    lang.add_extension("lisp");
    lang.add_extension("lsp");
    lang.add_extension("cl");
    lang.add_extension("asd");

    if let Some(rule) = MultilineRule::new("block_comment", r"#\|", r"\|#", TokenType::Comment.face_name(), 1) {
        lang.add_multiline(rule);
    }

    if let Some(rule) = MultilineRule::with_escape("string", "\"", "\"", TokenType::String.face_name(), 2, '\\') {
        lang.add_multiline(rule);
    }

    lang.add_token_rule("comment", r";.*$", TokenType::Comment, 100);

    lang.add_token_rule("char", r"#\\(?:[A-Za-z]\w+|.)", TokenType::Char, 95);

    let keywords = r"\b(?:defun|defmacro|defvar|defparameter|defconstant|defclass|defmethod|defgeneric|defstruct|defpackage|in-package|lambda|let\*?|flet|labels|if|when|unless|cond|case|progn|loop|do|dolist|dotimes|setf|setq|and|or|not|handler-case|unwind-protect|multiple-value-bind|destructuring-bind)\b";
    lang.add_token_rule("keyword", keywords, TokenType::Keyword, 80);

    let builtins = r"\b(?:car|cdr|cons|list|append|mapcar|apply|funcall|format|length|nth|eq|eql|equal|gethash|make-hash-table)\b";
    lang.add_token_rule("builtin", builtins, TokenType::Function, 75);

    lang.add_token_rule("keyword_symbol", r":[\w\-]+", TokenType::Constant, 70);
    lang.add_token_rule("nil_t", r"\b(?:nil|t)\b", TokenType::Constant, 69);

    lang.add_token_rule("quote", r"#'|'|`|,@?", TokenType::Special, 60);

    lang.add_token_rule("float", r"-?\b\d+\.\d+(?:[ed][+-]?\d+)?\b", TokenType::Number, 51);
    lang.add_token_rule("integer", r"-?\b\d+\b", TokenType::Number, 50);

    lang.add_token_rule("paren", r"[()]", TokenType::Paren, 10);

    lang
}
