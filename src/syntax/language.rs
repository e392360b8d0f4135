//! Language definitions for syntax highlighting
//!
//! A LanguageDefinition carries the default highlight rules and the
//! multiline rules for a language. The rules a buffer actually uses live
//! in its FontLock state and may diverge from the defaults at runtime.

use super::rules::{FaceSpan, HighlightResult, HighlightRule, LineState, MultilineRule, PatternRule};
use super::tokens::TokenType;

/// A complete language definition for syntax highlighting
pub struct LanguageDefinition {
    /// Language name (e.g., "Emacs Lisp", "Scheme")
    pub name: String,
    /// File extensions (e.g., ["el"], ["scm", "ss"])
    pub extensions: Vec<String>,
    /// Default single-line rules, sorted by priority (highest first)
    pub rules: Vec<HighlightRule>,
    /// Multi-line rules for comments, strings, etc.
    pub multiline_rules: Vec<MultilineRule>,
}

impl LanguageDefinition {
    /// Create a new empty language definition
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            rules: Vec::new(),
            multiline_rules: Vec::new(),
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Add a pattern rule
    pub fn add_rule(&mut self, rule: HighlightRule) {
        self.rules.push(rule);
        // Keep sorted by priority (highest first); sort is stable
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Add a pattern rule drawn with the face of a token type
    pub fn add_token_rule(&mut self, name: &str, pattern: &str, token_type: TokenType, priority: i32) {
        self.add_rule(HighlightRule::new(name, pattern, token_type.face_name(), priority));
    }

    /// Add a multiline rule
    pub fn add_multiline(&mut self, rule: MultilineRule) {
        self.multiline_rules.push(rule);
    }
}

/// Highlight a single line of text
///
/// `patterns` must be in priority order. Takes the state from the
/// previous line and returns spans plus the state for the next line.
/// At each step the earliest match wins; at equal positions multiline
/// constructs beat patterns, and patterns tie-break by priority.
pub fn highlight_line(
    patterns: &[PatternRule],
    multiline_rules: &[MultilineRule],
    text: &str,
    prev_state: LineState,
) -> HighlightResult {
    let mut spans = Vec::new();
    let mut pos = 0;
    let mut current_state = prev_state;

    let get_multiline = |id: u8| multiline_rules.iter().find(|r| r.state_id == id);

    while pos < text.len() {
        // If inside a multiline construct, look for its end
        if current_state.is_inside_multiline() {
            match get_multiline(current_state.multiline_id) {
                Some(rule) => match rule.find_end(text, pos) {
                    Some(end_pos) => {
                        spans.push(FaceSpan::new(pos, end_pos, &rule.face));
                        pos = end_pos;
                        current_state = LineState::default();
                        continue;
                    }
                    None => {
                        spans.push(FaceSpan::new(pos, text.len(), &rule.face));
                        return HighlightResult {
                            spans,
                            end_state: current_state,
                        };
                    }
                },
                // Invalid state - reset
                None => current_state = LineState::default(),
            }
        }

        let multiline_hit = multiline_rules
            .iter()
            .filter_map(|rule| rule.find_start(text, pos).map(|(s, e)| (s, e, rule)))
            .min_by_key(|(s, _, _)| *s);

        let pattern_hit = patterns
            .iter()
            .filter_map(|rule| rule.find_at(text, pos).map(|(s, e)| (s, e, rule)))
            .min_by_key(|(s, _, _)| *s);

        match (multiline_hit, pattern_hit) {
            (Some((start, end, rule)), pattern)
                if pattern.map_or(true, |(ps, _, _)| start <= ps) =>
            {
                match rule.find_end(text, end) {
                    Some(close_pos) => {
                        // Complete construct on this line
                        spans.push(FaceSpan::new(start, close_pos, &rule.face));
                        pos = close_pos;
                    }
                    None => {
                        // Multiline continues to next line
                        spans.push(FaceSpan::new(start, text.len(), &rule.face));
                        return HighlightResult {
                            spans,
                            end_state: LineState::inside(rule.state_id),
                        };
                    }
                }
            }
            (_, Some((start, end, rule))) => {
                spans.push(FaceSpan::new(start, end, &rule.face));
                pos = end;
            }
            (_, None) => break,
        }
    }

    HighlightResult {
        spans,
        end_state: current_state,
    }
}
