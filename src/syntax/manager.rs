//! Syntax highlighting manager
//!
//! The SyntaxManager owns the language definitions and detects a
//! buffer's language. Each buffer gets its own FontLock: the live rule
//! set, its compiled form and a per-line span cache.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::builtin;
use super::language::{self, LanguageDefinition};
use super::rules::{FaceSpan, HighlightRule, LineState, MultilineRule, PatternRule};

/// Per-buffer highlighting cache
#[derive(Debug, Default)]
pub struct HighlightCache {
    /// Per-line end state (multiline construct tracking)
    pub line_states: Vec<LineState>,
    /// Cached spans per line
    pub line_spans: Vec<Vec<FaceSpan>>,
}

impl HighlightCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines with valid cached results
    pub fn valid_lines(&self) -> usize {
        self.line_spans.len()
    }

    /// Invalidate entire cache
    pub fn invalidate_all(&mut self) {
        self.line_states.clear();
        self.line_spans.clear();
    }
}

/// Font-lock state for one buffer
///
/// Rule mutations are recorded immediately but only take effect on the
/// next [`FontLock::refontify`], matching how an editor batches keyword
/// changes until the buffer is re-scanned.
pub struct FontLock {
    /// Language for this buffer (None if no highlighting)
    language: Option<String>,
    /// Active rules, sorted by priority (highest first)
    rules: Vec<HighlightRule>,
    /// Multiline rules of the language
    multiline_rules: Vec<MultilineRule>,
    /// Compiled form of `rules` as of the last refontify
    patterns: Vec<PatternRule>,
    /// Whether `rules` changed since the last refontify
    stale: bool,
    cache: HighlightCache,
}

impl FontLock {
    /// Font-lock state seeded from a language definition
    pub fn new(lang: Option<&LanguageDefinition>) -> Self {
        let mut font_lock = Self {
            language: lang.map(|l| l.name.clone()),
            rules: lang.map(|l| l.rules.clone()).unwrap_or_default(),
            multiline_rules: lang.map(|l| l.multiline_rules.clone()).unwrap_or_default(),
            patterns: Vec::new(),
            stale: true,
            cache: HighlightCache::new(),
        };
        font_lock.refontify();
        font_lock
    }

    /// Font-lock state with no language and no rules
    pub fn plain() -> Self {
        Self::new(None)
    }

    /// Language name, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The active rule set, highest priority first
    pub fn rules(&self) -> &[HighlightRule] {
        &self.rules
    }

    /// Whether rule changes are waiting for a refontify
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Add rules not already present; returns how many were added
    pub fn add_rules(&mut self, rules: &[HighlightRule]) -> usize {
        let mut added = 0;
        for rule in rules {
            if !self.rules.contains(rule) {
                self.rules.push(rule.clone());
                added += 1;
            }
        }
        if added > 0 {
            self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
            self.stale = true;
        }
        added
    }

    /// Remove every rule equal to one of `rules`; returns how many were removed
    pub fn remove_rules(&mut self, rules: &[HighlightRule]) -> usize {
        let before = self.rules.len();
        self.rules.retain(|r| !rules.contains(r));
        let removed = before - self.rules.len();
        if removed > 0 {
            self.stale = true;
        }
        removed
    }

    /// Recompile the rule set and drop every cached line
    pub fn refontify(&mut self) {
        self.patterns = self
            .rules
            .iter()
            .filter_map(|rule| {
                let compiled = rule.compile();
                if compiled.is_none() {
                    debug!(rule = %rule.name, pattern = %rule.pattern, "skipping invalid highlight rule");
                }
                compiled
            })
            .collect();
        self.stale = false;
        self.cache.invalidate_all();
    }

    /// Spans for one line of `lines`
    ///
    /// Lines before `line_idx` are highlighted first when their end state
    /// is not cached yet, so multiline constructs carry over correctly.
    pub fn highlight_line(&mut self, lines: &[String], line_idx: usize) -> Vec<FaceSpan> {
        if self.language.is_none() || line_idx >= lines.len() {
            return Vec::new();
        }

        while self.cache.valid_lines() <= line_idx {
            let idx = self.cache.valid_lines();
            let prev_state = idx
                .checked_sub(1)
                .and_then(|i| self.cache.line_states.get(i).copied())
                .unwrap_or_default();
            let result =
                language::highlight_line(&self.patterns, &self.multiline_rules, &lines[idx], prev_state);
            self.cache.line_states.push(result.end_state);
            self.cache.line_spans.push(result.spans);
        }

        self.cache.line_spans[line_idx].clone()
    }
}

/// Main syntax highlighting manager
pub struct SyntaxManager {
    /// Loaded language definitions
    languages: HashMap<String, LanguageDefinition>,
    /// Extension to language name mapping
    extension_map: HashMap<String, String>,
}

impl SyntaxManager {
    /// Create a new syntax manager with built-in languages
    pub fn new() -> Self {
        let mut manager = Self {
            languages: HashMap::new(),
            extension_map: HashMap::new(),
        };

        for lang in builtin::all_languages() {
            manager.add_language(lang);
        }

        manager
    }

    /// Add a language definition
    pub fn add_language(&mut self, lang: LanguageDefinition) {
        let name = lang.name.clone();
        for ext in &lang.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        self.languages.insert(name, lang);
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// Get a language definition by name
    pub fn get_language(&self, name: &str) -> Option<&LanguageDefinition> {
        self.languages.get(name)
    }

    /// Fresh font-lock state for a buffer visiting `filename`
    pub fn font_lock_for(&self, filename: Option<&Path>) -> FontLock {
        let lang = filename
            .and_then(|f| self.detect_language(f))
            .and_then(|name| self.get_language(name));
        FontLock::new(lang)
    }

    /// List available languages
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for SyntaxManager {
    fn default() -> Self {
        Self::new()
    }
}
