//! Session: one buffer with its highlighting, faces and companion aid
//!
//! The session is the [`Host`] minor modes talk to. It also turns the
//! font-lock spans and companion overlays of a line into resolved
//! styles for the display.

use tracing::debug;

use crate::buffer::Buffer;
use crate::companion::{ParenMatcher, Pos};
use crate::face::{FaceOverride, FaceTable, OverrideHandle, Theme, DEFAULT_FACE};
use crate::host::{CompanionAid, Host};
use crate::syntax::{Color, FontLock, HighlightRule, Span, Style, SyntaxManager};

pub struct Session {
    buffer: Buffer,
    font_lock: FontLock,
    faces: FaceTable,
    theme: Theme,
    /// Background reported for the frame (terminal or config)
    frame_background: Option<Color>,
    companion: Option<ParenMatcher>,
    message: Option<String>,
}

impl Session {
    /// Session for a buffer, highlighted per its file extension
    pub fn new(buffer: Buffer, syntax: &SyntaxManager, theme: Theme) -> Self {
        let font_lock = syntax.font_lock_for(buffer.filename());
        Self {
            buffer,
            font_lock,
            faces: FaceTable::from_theme(&theme),
            theme,
            frame_background: None,
            companion: None,
            message: None,
        }
    }

    /// Install the paren matcher aid
    pub fn with_companion(mut self, matcher: ParenMatcher) -> Self {
        self.companion = Some(matcher);
        self
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Language of the buffer, if it has one
    pub fn language(&self) -> Option<&str> {
        self.font_lock.language()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Switch theme; faces defined outside the theme and overrides survive
    pub fn set_theme(&mut self, theme: Theme) {
        debug!(theme = %theme.name, "switching theme");
        self.faces.apply_theme(&theme);
        self.theme = theme;
    }

    pub fn set_frame_background(&mut self, color: Option<Color>) {
        self.frame_background = color;
    }

    /// Number of live face overrides
    pub fn override_count(&self) -> usize {
        self.faces.override_count()
    }

    pub fn companion_enabled(&self) -> bool {
        self.companion.as_ref().is_some_and(|c| c.is_enabled())
    }

    /// Current status message
    pub fn current_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Resolved spans for one line, with companion overlays on top
    ///
    /// Spans cover the whole line; unstyled text gets the default face.
    pub fn styled_line(&mut self, line_idx: usize, cursor: Pos) -> Vec<Span> {
        let Some(text) = self.buffer.line(line_idx) else {
            return Vec::new();
        };
        let len = text.len();
        let base = self.faces.resolve(DEFAULT_FACE);
        let mut styles = vec![base; len];

        for span in self.font_lock.highlight_line(self.buffer.lines(), line_idx) {
            let style = base.merge(self.faces.resolve(&span.face));
            for s in &mut styles[span.start.min(len)..span.end.min(len)] {
                *s = style;
            }
        }

        if let Some(matcher) = self.companion.as_mut() {
            for overlay in matcher.overlays(self.buffer.lines(), cursor) {
                if overlay.line != line_idx {
                    continue;
                }
                let face = self.faces.resolve(overlay.face);
                for s in &mut styles[overlay.start.min(len)..overlay.end.min(len)] {
                    *s = s.merge(face);
                }
            }
        }

        let mut spans: Vec<Span> = Vec::new();
        for (pos, style) in styles.into_iter().enumerate() {
            match spans.last_mut() {
                Some(last) if last.style == style => last.end = pos + 1,
                _ => spans.push(Span::new(pos, pos + 1, style)),
            }
        }
        spans
    }
}

impl Host for Session {
    fn face(&self, name: &str) -> Option<Style> {
        self.faces.get(name)
    }

    fn set_face(&mut self, name: &str, style: Style) {
        self.faces.set(name, style);
    }

    fn remove_face(&mut self, name: &str) {
        if self.faces.remove(name) {
            debug!(face = name, "face removed");
        }
    }

    fn frame_background(&self) -> Option<Color> {
        self.frame_background
    }

    fn theme_background(&self) -> Option<Color> {
        Some(self.theme.background)
    }

    fn highlight_rules(&self) -> Vec<HighlightRule> {
        self.font_lock.rules().to_vec()
    }

    fn add_highlight_rules(&mut self, rules: &[HighlightRule]) {
        let added = self.font_lock.add_rules(rules);
        debug!(added, "highlight rules added");
    }

    fn remove_highlight_rules(&mut self, rules: &[HighlightRule]) {
        let removed = self.font_lock.remove_rules(rules);
        debug!(removed, "highlight rules removed");
    }

    fn refontify(&mut self) {
        self.font_lock.refontify();
    }

    fn push_face_override(&mut self, face: &str, ov: FaceOverride) -> OverrideHandle {
        self.faces.push_override(face, ov)
    }

    fn release_face_override(&mut self, handle: OverrideHandle) {
        if !self.faces.release(handle) {
            debug!(?handle, "released unknown face override");
        }
    }

    fn companion(&mut self) -> Option<&mut dyn CompanionAid> {
        self.companion.as_mut().map(|c| c as &mut dyn CompanionAid)
    }

    fn message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
    }
}
