//! Pattern rules for syntax highlighting
//!
//! This module defines the rule types used to match and tokenize
//! source code for syntax highlighting.

use regex::Regex;

/// Characters the paren-hide mode treats as parentheses
pub const PAREN_CHARS: [char; 6] = ['(', ')', '[', ']', '{', '}'];

/// A highlight rule as the host stores it
///
/// This is the uncompiled, comparable form of a [`PatternRule`]. The
/// active rule set of a buffer is a list of these, and rules are added
/// and removed by equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightRule {
    /// Name for debugging
    pub name: String,
    /// Regex source
    pub pattern: String,
    /// Face applied to matches
    pub face: String,
    /// Priority (higher = matched first)
    pub priority: i32,
}

impl HighlightRule {
    /// Create a new highlight rule
    pub fn new(name: &str, pattern: &str, face: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            face: face.to_string(),
            priority,
        }
    }

    /// Whether the pattern contains a literal parenthesis or bracket
    pub fn matches_paren_literal(&self) -> bool {
        contains_paren_literal(&self.pattern)
    }

    /// Compile into a matchable rule; `None` if the regex is invalid
    pub fn compile(&self) -> Option<PatternRule> {
        Regex::new(&self.pattern).ok().map(|regex| PatternRule {
            name: self.name.clone(),
            pattern: regex,
            face: self.face.clone(),
            priority: self.priority,
        })
    }
}

/// Scan regex source for an escaped paren/bracket or one inside a
/// non-negated character class. Unescaped `(` and `{` outside a class
/// are grouping and repetition, not literals.
fn contains_paren_literal(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    // Each open class level records whether it is negated
    let mut classes: Vec<bool> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let negated = classes.iter().any(|&n| n);

        if ch == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                if PAREN_CHARS.contains(&next) && !negated {
                    return true;
                }
            }
            i += 2;
            continue;
        }

        if classes.is_empty() {
            if ch == '[' {
                i = open_class(&chars, i, &mut classes);
                if chars.get(i) == Some(&']') {
                    // `[]...]` and `[^]...]` start with a literal `]`
                    if !classes.iter().any(|&n| n) {
                        return true;
                    }
                    i += 1;
                }
                continue;
            }
            i += 1;
            continue;
        }

        match ch {
            '[' if chars.get(i + 1) == Some(&':') => {
                // POSIX class such as [:alpha:]
                let rest: String = chars[i..].iter().collect();
                i += rest.find(":]").map(|n| n + 2).unwrap_or(1);
            }
            '[' => {
                i = open_class(&chars, i, &mut classes);
            }
            ']' => {
                classes.pop();
                i += 1;
            }
            c if PAREN_CHARS.contains(&c) && !negated => return true,
            _ => i += 1,
        }
    }

    false
}

/// Push a class level for the `[` at `i`; returns the index after `[` or `[^`
fn open_class(chars: &[char], i: usize, classes: &mut Vec<bool>) -> usize {
    if chars.get(i + 1) == Some(&'^') {
        classes.push(true);
        i + 2
    } else {
        classes.push(false);
        i + 1
    }
}

/// A single-line pattern rule
///
/// Matches a regex pattern and assigns a face to the match.
/// Rules are tried in priority order (highest first).
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Face to assign to matches
    pub face: String,
    /// Priority (higher = matched first)
    pub priority: i32,
}

impl PatternRule {
    /// Find the first non-empty match in text starting at position
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        let mut from = start;
        while from < text.len() {
            let m = self.pattern.find_at(text, from)?;
            if m.end() > m.start() {
                return Some((m.start(), m.end()));
            }
            // Skip empty matches
            from = m.end() + 1;
            while from < text.len() && !text.is_char_boundary(from) {
                from += 1;
            }
        }
        None
    }
}

/// A multi-line construct rule (block comments, strings)
///
/// These rules track state across lines for constructs that
/// can span multiple lines.
#[derive(Clone)]
pub struct MultilineRule {
    /// Name for debugging
    pub name: String,
    /// Pattern that starts the construct
    pub start: Regex,
    /// Pattern that ends the construct
    pub end: Regex,
    /// Face for this construct
    pub face: String,
    /// Escape character (usually backslash)
    pub escape_char: Option<char>,
    /// Unique ID for this multiline state (1-255, 0 = normal)
    pub state_id: u8,
}

impl MultilineRule {
    /// Create a new multiline rule
    pub fn new(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        face: &str,
        state_id: u8,
    ) -> Option<Self> {
        let start = Regex::new(start_pattern).ok()?;
        let end = Regex::new(end_pattern).ok()?;
        Some(Self {
            name: name.to_string(),
            start,
            end,
            face: face.to_string(),
            escape_char: None,
            state_id,
        })
    }

    /// Create a multiline rule with escape support
    pub fn with_escape(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        face: &str,
        state_id: u8,
        escape_char: char,
    ) -> Option<Self> {
        let mut rule = Self::new(name, start_pattern, end_pattern, face, state_id)?;
        rule.escape_char = Some(escape_char);
        Some(rule)
    }

    /// Find start of this construct in text
    pub fn find_start(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.start.find(&text[start..]).map(|m| (start + m.start(), start + m.end()))
    }

    /// Find end of this construct in text, respecting escapes
    pub fn find_end(&self, text: &str, start: usize) -> Option<usize> {
        if start >= text.len() {
            return None;
        }

        let search_text = &text[start..];

        let Some(escape) = self.escape_char else {
            return self.end.find(search_text).map(|m| start + m.end());
        };

        let mut pos = 0;
        while pos < search_text.len() {
            let m = self.end.find(&search_text[pos..])?;
            let match_start = pos + m.start();
            let escape_count = search_text[..match_start]
                .chars()
                .rev()
                .take_while(|&c| c == escape)
                .count();
            if escape_count % 2 == 1 {
                // Odd number of escapes = escaped
                pos += m.end().max(1);
                while pos < search_text.len() && !search_text.is_char_boundary(pos) {
                    pos += 1;
                }
                continue;
            }
            return Some(start + pos + m.end());
        }
        None
    }
}

/// Line state for tracking multi-line constructs
///
/// This is stored per-line to track whether we're inside a
/// multi-line comment, string, etc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    /// 0 = normal, non-zero = inside multiline rule with this ID
    pub multiline_id: u8,
}

impl LineState {
    /// Create state for being inside a multiline construct
    pub fn inside(state_id: u8) -> Self {
        Self { multiline_id: state_id }
    }

    /// Check if we're inside a multiline construct
    pub fn is_inside_multiline(&self) -> bool {
        self.multiline_id != 0
    }

    /// Check if we're in normal (no multiline) state
    pub fn is_normal(&self) -> bool {
        self.multiline_id == 0
    }
}

/// A span of a line tagged with the face that styles it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSpan {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Face name
    pub face: String,
}

impl FaceSpan {
    pub fn new(start: usize, end: usize, face: &str) -> Self {
        Self {
            start,
            end,
            face: face.to_string(),
        }
    }
}

/// Result of highlighting a single line
#[derive(Debug)]
pub struct HighlightResult {
    /// Spans of styled text in this line
    pub spans: Vec<FaceSpan>,
    /// State at end of line (for next line)
    pub end_state: LineState,
}
