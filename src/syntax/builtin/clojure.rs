//! Clojure language definition

use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::MultilineRule;
use crate::syntax::tokens::TokenType;

/// Create Clojure language definition
pub fn clojure_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Clojure");
    lang.add_extension("clj");
    lang.add_extension("cljs");
    lang.add_extension("cljc");
    lang.add_extension("edn");

    if let Some(rule) = MultilineRule::with_escape("string", "\"", "\"", TokenType::String.face_name(), 1, '\\') {
        lang.add_multiline(rule);
    }

    lang.add_token_rule("comment", r";.*$", TokenType::Comment, 100);

    // Character literals: \a \newline \(
    lang.add_token_rule("char", r"\\(?:newline|space|tab|u[0-9a-fA-F]{4}|.)", TokenType::Char, 95);

    let keywords = r"\b(?:def|defn|defn-|defmacro|defprotocol|defrecord|defmulti|defmethod|ns|fn|let|loop|recur|if|if-let|when|when-let|cond|case|do|doseq|for|and|or|not|try|catch|finally|throw)\b";
    lang.add_token_rule("keyword", keywords, TokenType::Keyword, 80);

    let builtins = r"\b(?:map|filter|reduce|first|rest|cons|conj|assoc|dissoc|get|get-in|update|str|println|count|apply|partial|comp)\b";
    lang.add_token_rule("builtin", builtins, TokenType::Function, 75);

    lang.add_token_rule("keyword_symbol", r"::?[\w\-./?!*+<>=]+", TokenType::Constant, 70);
    lang.add_token_rule("literal", r"\b(?:nil|true|false)\b", TokenType::Constant, 69);

    // Reader macros: quote, syntax-quote, unquote, deref, var quote, metadata
    lang.add_token_rule("reader_macro", r"#'|'|`|~@?|@|\^", TokenType::Special, 60);

    lang.add_token_rule("float", r"-?\b\d+\.\d+M?\b", TokenType::Number, 51);
    lang.add_token_rule("integer", r"-?\b\d+N?\b", TokenType::Number, 50);

    lang.add_token_rule("paren", r"[()]", TokenType::Paren, 10);
    lang.add_token_rule("bracket", r"[\[\]{}]", TokenType::Bracket, 10);

    lang
}
