//! Paren matcher: the structural-editing companion aid
//!
//! Pairs up delimiters across the buffer, ignoring those inside
//! strings, comments and character literals. While enabled it marks
//! the pair under the cursor with `paren-match`, or a lone delimiter
//! with `paren-mismatch`.

use std::collections::HashMap;

use tracing::debug;

use crate::face::{PAREN_MATCH_FACE, PAREN_MISMATCH_FACE};
use crate::host::CompanionAid;

/// A position in a buffer (line index, byte column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// A face drawn on top of font-lock highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub face: &'static str,
}

fn closer_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}')
}

/// Delimiters outside strings, comments and escapes, in buffer order
pub fn scan_delimiters(lines: &[String]) -> Vec<(Pos, char)> {
    let mut found = Vec::new();
    let mut in_string = false;
    let mut in_block_comment = false;

    for (line_idx, text) in lines.iter().enumerate() {
        let mut chars = text.char_indices().peekable();
        while let Some((col, ch)) = chars.next() {
            if in_block_comment {
                if ch == '|' && chars.peek().map(|&(_, c)| c) == Some('#') {
                    chars.next();
                    in_block_comment = false;
                }
                continue;
            }
            if in_string {
                match ch {
                    '\\' => {
                        chars.next();
                    }
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match ch {
                ';' => break,
                '"' => in_string = true,
                // Escaped characters: ?\( #\( \(
                '\\' => {
                    chars.next();
                }
                '#' if chars.peek().map(|&(_, c)| c) == Some('|') => {
                    chars.next();
                    in_block_comment = true;
                }
                c if closer_for(c).is_some() || is_closer(c) => found.push((Pos::new(line_idx, col), c)),
                _ => {}
            }
        }
    }

    found
}

/// Map every delimiter to its partner; `None` when unmatched or mismatched
pub fn pair_delimiters(delims: &[(Pos, char)]) -> HashMap<Pos, Option<Pos>> {
    let mut partners = HashMap::new();
    let mut stack: Vec<(Pos, char)> = Vec::new();

    for &(pos, ch) in delims {
        if closer_for(ch).is_some() {
            stack.push((pos, ch));
            continue;
        }
        match stack.pop() {
            Some((open_pos, open)) if closer_for(open) == Some(ch) => {
                partners.insert(open_pos, Some(pos));
                partners.insert(pos, Some(open_pos));
            }
            Some((open_pos, _)) => {
                partners.insert(open_pos, None);
                partners.insert(pos, None);
            }
            None => {
                partners.insert(pos, None);
            }
        }
    }
    for (pos, _) in stack {
        partners.insert(pos, None);
    }

    partners
}

/// Delimiters of one buffer with their partners
#[derive(Debug, Default)]
struct DelimiterIndex {
    /// In buffer order
    delims: Vec<(Pos, char)>,
    partners: HashMap<Pos, Option<Pos>>,
}

impl DelimiterIndex {
    fn build(lines: &[String]) -> Self {
        let delims = scan_delimiters(lines);
        let partners = pair_delimiters(&delims);
        Self { delims, partners }
    }

    fn at(&self, cursor: Pos) -> Option<(Pos, Option<Pos>)> {
        if let Some(&partner) = self.partners.get(&cursor) {
            return Some((cursor, partner));
        }
        // A closer ending right at the cursor
        let idx = self.delims.partition_point(|(pos, _)| *pos < cursor);
        let &(pos, ch) = self.delims.get(idx.checked_sub(1)?)?;
        (pos.line == cursor.line && pos.col + ch.len_utf8() == cursor.col && is_closer(ch))
            .then(|| (pos, self.partners.get(&pos).copied().flatten()))
    }

    fn first_unbalanced(&self) -> Option<Pos> {
        self.delims
            .iter()
            .map(|(pos, _)| *pos)
            .find(|pos| self.partners.get(pos).copied().flatten().is_none())
    }
}

/// Structural aid that shows matching delimiters
///
/// A matcher serves one read-only buffer: the delimiter scan is done on
/// first use and kept.
#[derive(Debug, Default)]
pub struct ParenMatcher {
    enabled: bool,
    index: Option<DelimiterIndex>,
    scans: usize,
}

impl ParenMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The delimiter the cursor is on, or the closer just before it,
    /// with its partner
    pub fn delimiter_at(lines: &[String], cursor: Pos) -> Option<(Pos, Option<Pos>)> {
        DelimiterIndex::build(lines).at(cursor)
    }

    /// Partner of the delimiter at the cursor
    pub fn matching_delimiter(lines: &[String], cursor: Pos) -> Option<Pos> {
        Self::delimiter_at(lines, cursor).and_then(|(_, partner)| partner)
    }

    /// First delimiter without a partner, in buffer order
    pub fn first_unbalanced(lines: &[String]) -> Option<Pos> {
        DelimiterIndex::build(lines).first_unbalanced()
    }

    fn index(&mut self, lines: &[String]) -> &DelimiterIndex {
        let scans = &mut self.scans;
        self.index.get_or_insert_with(|| {
            *scans += 1;
            let index = DelimiterIndex::build(lines);
            debug!(delimiters = index.delims.len(), scans = *scans, "indexed delimiters");
            index
        })
    }

    /// Number of full-buffer scans so far
    #[cfg(test)]
    pub(crate) fn scan_count(&self) -> usize {
        self.scans
    }

    /// Overlays for the cursor position; empty while disabled
    pub fn overlays(&mut self, lines: &[String], cursor: Pos) -> Vec<Overlay> {
        if !self.enabled {
            return Vec::new();
        }
        let Some((pos, partner)) = self.index(lines).at(cursor) else {
            return Vec::new();
        };

        let overlay = |p: Pos, face| Overlay {
            line: p.line,
            start: p.col,
            end: p.col + 1,
            face,
        };
        match partner {
            Some(other) => vec![overlay(pos, PAREN_MATCH_FACE), overlay(other, PAREN_MATCH_FACE)],
            None => vec![overlay(pos, PAREN_MISMATCH_FACE)],
        }
    }
}

impl CompanionAid for ParenMatcher {
    fn is_present(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn paren_faces(&self) -> Vec<String> {
        vec![PAREN_MATCH_FACE.to_string(), PAREN_MISMATCH_FACE.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_skips_strings_comments_and_chars() {
        let text = lines(&[r#"(a "b)" ?\( #\) ; (c"#, "#| ( |# [d]"]);
        let found: Vec<char> = scan_delimiters(&text).into_iter().map(|(_, c)| c).collect();
        assert_eq!(found, vec!['(', '[', ']']);
    }

    #[test]
    fn test_matching_across_lines() {
        let text = lines(&["(defun f (x)", "  (* x 2))"]);

        assert_eq!(ParenMatcher::matching_delimiter(&text, Pos::new(0, 0)), Some(Pos::new(1, 9)));
        // Cursor just after a closer
        assert_eq!(ParenMatcher::matching_delimiter(&text, Pos::new(0, 12)), Some(Pos::new(0, 9)));
        assert_eq!(ParenMatcher::matching_delimiter(&text, Pos::new(0, 2)), None);
    }

    #[test]
    fn test_mismatched_delimiters() {
        let text = lines(&["(a]"]);
        assert_eq!(ParenMatcher::delimiter_at(&text, Pos::new(0, 0)), Some((Pos::new(0, 0), None)));
        assert_eq!(ParenMatcher::first_unbalanced(&text), Some(Pos::new(0, 0)));
    }

    #[test]
    fn test_first_unbalanced() {
        assert_eq!(ParenMatcher::first_unbalanced(&lines(&["(a [b] {c})"])), None);
        assert_eq!(ParenMatcher::first_unbalanced(&lines(&["(a", "(b)"])), Some(Pos::new(0, 0)));
        assert_eq!(ParenMatcher::first_unbalanced(&lines(&["a)"])), Some(Pos::new(0, 1)));
    }

    #[test]
    fn test_overlays_follow_enabled_state() {
        let text = lines(&["(a)"]);
        let mut matcher = ParenMatcher::new();
        assert!(matcher.overlays(&text, Pos::new(0, 0)).is_empty());

        matcher.enable();
        let overlays = matcher.overlays(&text, Pos::new(0, 0));
        assert_eq!(overlays.len(), 2);
        assert!(overlays.iter().all(|o| o.face == PAREN_MATCH_FACE));
        assert_eq!(overlays[1].start, 2);

        let lone = lines(&["(a"]);
        let mut matcher = ParenMatcher::new();
        matcher.enable();
        let overlays = matcher.overlays(&lone, Pos::new(0, 0));
        assert_eq!(overlays, vec![Overlay { line: 0, start: 0, end: 1, face: PAREN_MISMATCH_FACE }]);
    }

    #[test]
    fn test_buffer_scanned_once() {
        let text = lines(&["(defun f (x)", "  [x {y}])", "(g)"]);
        let mut matcher = ParenMatcher::new();
        assert!(matcher.overlays(&text, Pos::new(0, 0)).is_empty());
        assert_eq!(matcher.scan_count(), 0);

        matcher.enable();
        for line in 0..text.len() {
            for col in 0..12 {
                matcher.overlays(&text, Pos::new(line, col));
            }
        }
        assert_eq!(matcher.scan_count(), 1);
        // Cached answers agree with a fresh scan
        assert_eq!(matcher.overlays(&text, Pos::new(1, 2))[1].start, 8);
        let after_closer = matcher.overlays(&text, Pos::new(1, 10));
        assert_eq!(after_closer[0], Overlay { line: 1, start: 9, end: 10, face: PAREN_MATCH_FACE });
        assert_eq!(after_closer[1], Overlay { line: 0, start: 0, end: 1, face: PAREN_MATCH_FACE });
        assert_eq!(matcher.scan_count(), 1);
    }

    #[test]
    fn test_paren_faces() {
        let matcher = ParenMatcher::new();
        assert!(matcher.is_present());
        assert_eq!(matcher.paren_faces(), vec!["paren-match", "paren-mismatch"]);
    }
}
