//! Scheme and Racket language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::MultilineRule;
use crate::syntax::tokens::TokenType;

/// Create Scheme language definition
pub fn scheme_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Scheme");
    lang.add_extension("scm");
    lang.add_extension("ss");
    lang.add_extension("sld");
    lang.add_extension("rkt");

    // Block comments #| ... |#
    if let Some(rule) = MultilineRule::new("block_comment", r"#\|", r"\|#", TokenType::Comment.face_name(), 1) {
        lang.add_multiline(rule);
    }

    if let Some(rule) = MultilineRule::with_escape("string", "\"", "\"", TokenType::String.face_name(), 2, '\\') {
        lang.add_multiline(rule);
    }

    lang.add_token_rule("comment", r";.*$", TokenType::Comment, 100);

    // Character literals: #\a #\space #\(
    lang.add_token_rule("char", r"#\\(?:space|newline|tab|nul|[a-z]\w+|.)", TokenType::Char, 95);

    let keywords = r"\b(?:define|define-syntax|define-record-type|lambda|let|let\*|letrec|let-values|if|cond|case|when|unless|begin|do|and|or|else|quasiquote|syntax-rules|import|export|library)\b";
    lang.add_token_rule("keyword", keywords, TokenType::Keyword, 80);

    let builtins = r"\b(?:car|cdr|cons|list|append|map|for-each|apply|display|newline|length|reverse|vector|null\?|pair\?|eq\?|eqv\?|equal\?)";
    lang.add_token_rule("builtin", builtins, TokenType::Function, 75);

    lang.add_token_rule("boolean", r"#(?:true|false|t|f)\b", TokenType::Constant, 70);

    lang.add_token_rule("quote", r"'|`|,@?", TokenType::Special, 60);

    lang.add_token_rule("float", r"-?\b\d+\.\d+\b", TokenType::Number, 51);
    lang.add_token_rule("integer", r"-?\b\d+\b", TokenType::Number, 50);

    lang.add_token_rule("paren", r"[()]", TokenType::Paren, 10);
    lang.add_token_rule("bracket", r"[\[\]]", TokenType::Bracket, 10);

    lang
}
