//! Paren-hide minor mode
//!
//! Hides parentheses and brackets by drawing them in the background
//! color, and puts the previous highlighting back on demand.
//!
//! On activation the mode captures every highlight rule that matches a
//! paren or bracket literal. Hiding adds one top-priority rule mapping
//! delimiters to the `paren-hide` face, whose foreground is the current
//! background color, and overrides the foreground of every face the
//! companion aid draws delimiters with. Restoring removes that rule,
//! re-adds the captured rules and releases the overrides.
//!
//! The state lives in a [`ParenHide`] value owned by the buffer, so
//! two buffers never share hidden/normal state.

use tracing::{debug, info};

use crate::face::{FaceOverride, OverrideHandle};
use crate::host::Host;
use crate::input::Key;
use crate::mode::MinorMode;
use crate::syntax::{Color, HighlightRule, Style};

/// Face that hidden delimiters are drawn with
pub const HIDDEN_FACE: &str = "paren-hide";

/// Background assumed when neither the frame nor the theme has one
pub const FALLBACK_BACKGROUND: Color = Color::Black;

/// Mode command name
pub const MODE_COMMAND: &str = "paren-hide-mode";

/// In-mode toggle command name
pub const TOGGLE_COMMAND: &str = "paren-hide-toggle";

pub const MSG_HIDDEN: &str = "Parentheses hidden";
pub const MSG_RESTORED: &str = "Parentheses restored";

/// Whether delimiters are currently drawn normally or hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Normal,
    Hidden,
}

/// The rule that maps every delimiter to [`HIDDEN_FACE`]
pub fn hide_rule() -> HighlightRule {
    HighlightRule::new("paren-hide", r"[()\[\]{}]", HIDDEN_FACE, i32::MAX)
}

/// Background color the hidden face should use right now
///
/// Tries the frame's resolved background, then the theme default,
/// then [`FALLBACK_BACKGROUND`]. Never cached, so theme changes apply
/// on the next hide.
pub fn resolve_background(host: &dyn Host) -> Color {
    if let Some(color) = host.frame_background().filter(Color::is_specified) {
        return color;
    }
    if let Some(color) = host.theme_background().filter(Color::is_specified) {
        return color;
    }
    debug!(fallback = ?FALLBACK_BACKGROUND, "no background color available");
    FALLBACK_BACKGROUND
}

/// Per-buffer state of the paren-hide mode
#[derive(Debug)]
pub struct ParenHide {
    state: ToggleState,
    active: bool,
    /// Delimiter rules captured on activation
    saved_rules: Vec<HighlightRule>,
    /// Companion face overrides applied by the last hide
    overrides: Vec<OverrideHandle>,
    /// Whether activation turned the companion aid on
    enabled_companion: bool,
    /// The hidden face as activation found it
    saved_face: Option<Style>,
    toggle_key: Key,
}

impl ParenHide {
    /// Mode state with the toggle bound to `toggle_key`
    pub fn new(toggle_key: Key) -> Self {
        Self {
            state: ToggleState::Normal,
            active: false,
            saved_rules: Vec::new(),
            overrides: Vec::new(),
            enabled_companion: false,
            saved_face: None,
            toggle_key,
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hidden(&self) -> bool {
        self.state == ToggleState::Hidden
    }

    /// Rules captured on activation
    pub fn saved_rules(&self) -> &[HighlightRule] {
        &self.saved_rules
    }

    /// Overrides held while hidden
    pub fn active_overrides(&self) -> &[OverrideHandle] {
        &self.overrides
    }

    pub fn toggle_key(&self) -> Key {
        self.toggle_key
    }

    /// Capture the delimiter rules and turn the companion aid on
    pub fn activate(&mut self, host: &mut dyn Host) {
        if self.active {
            return;
        }

        self.saved_rules = host
            .highlight_rules()
            .into_iter()
            .filter(HighlightRule::matches_paren_literal)
            .collect();
        self.saved_face = host.face(HIDDEN_FACE);
        self.state = ToggleState::Normal;
        self.overrides.clear();

        self.enabled_companion = false;
        match host.companion() {
            Some(aid) if aid.is_present() => {
                if !aid.is_enabled() {
                    aid.enable();
                    self.enabled_companion = true;
                }
            }
            _ => debug!("no companion aid, using highlight rules only"),
        }

        self.active = true;
        info!(saved = self.saved_rules.len(), "paren-hide activated");
    }

    /// Put the buffer back the way activation found it
    ///
    /// The hidden face is put back too, or removed if activation did
    /// not find one.
    pub fn deactivate(&mut self, host: &mut dyn Host) {
        self.restore(host);

        if self.active {
            match self.saved_face.take() {
                Some(style) => host.set_face(HIDDEN_FACE, style),
                None => host.remove_face(HIDDEN_FACE),
            }
        }

        if self.enabled_companion {
            if let Some(aid) = host.companion().filter(|aid| aid.is_present()) {
                aid.disable();
            }
            self.enabled_companion = false;
        }

        self.saved_rules.clear();
        self.state = ToggleState::Normal;
        self.active = false;
        info!("paren-hide deactivated");
    }

    /// Flip between hidden and normal delimiters
    ///
    /// Does nothing while the mode is inactive.
    pub fn toggle(&mut self, host: &mut dyn Host) -> ToggleState {
        if !self.active {
            debug!("toggle ignored, paren-hide is not active");
            return self.state;
        }

        match self.state {
            ToggleState::Hidden => {
                self.restore(host);
                self.state = ToggleState::Normal;
                host.message(MSG_RESTORED);
            }
            ToggleState::Normal => {
                self.hide(host);
                self.state = ToggleState::Hidden;
                host.message(MSG_HIDDEN);
            }
        }
        self.state
    }

    fn hide(&mut self, host: &mut dyn Host) {
        let background = resolve_background(host);

        let style = host.face(HIDDEN_FACE).unwrap_or_default().with_fg(background);
        host.set_face(HIDDEN_FACE, style);

        self.release_overrides(host);
        let companion_faces = host
            .companion()
            .filter(|aid| aid.is_present())
            .map(|aid| aid.paren_faces())
            .unwrap_or_default();
        for face in companion_faces {
            let handle = host.push_face_override(&face, FaceOverride::foreground(background));
            self.overrides.push(handle);
        }

        host.add_highlight_rules(&[hide_rule()]);
        host.refontify();
        debug!(?background, overrides = self.overrides.len(), "parentheses hidden");
    }

    fn restore(&mut self, host: &mut dyn Host) {
        host.remove_highlight_rules(&[hide_rule()]);
        host.add_highlight_rules(&self.saved_rules);
        self.release_overrides(host);
        host.refontify();
        debug!(rules = self.saved_rules.len(), "parenthesis highlighting restored");
    }

    fn release_overrides(&mut self, host: &mut dyn Host) {
        for handle in self.overrides.drain(..) {
            host.release_face_override(handle);
        }
    }
}

impl MinorMode for ParenHide {
    fn name(&self) -> &'static str {
        MODE_COMMAND
    }

    fn lighter(&self) -> String {
        if self.is_hidden() {
            "ParenHide[hidden]".to_string()
        } else {
            "ParenHide".to_string()
        }
    }

    fn on_enable(&mut self, host: &mut dyn Host) {
        self.activate(host);
    }

    fn on_disable(&mut self, host: &mut dyn Host) {
        self.deactivate(host);
    }

    fn bindings(&self) -> Vec<(Key, &'static str)> {
        vec![(self.toggle_key, TOGGLE_COMMAND)]
    }

    fn run_command(&mut self, command: &str, host: &mut dyn Host) -> bool {
        match command {
            TOGGLE_COMMAND => {
                self.toggle(host);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::face::FaceTable;
    use crate::host::CompanionAid;
    use crate::mode::ModeSlot;
    use crate::syntax::Style;

    #[derive(Default)]
    struct FakeAid {
        enabled: bool,
        enable_calls: usize,
    }

    impl CompanionAid for FakeAid {
        fn is_present(&self) -> bool {
            true
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
        fn enable(&mut self) {
            self.enabled = true;
            self.enable_calls += 1;
        }
        fn disable(&mut self) {
            self.enabled = false;
        }
        fn paren_faces(&self) -> Vec<String> {
            vec!["aid-paren".to_string(), "aid-mismatch".to_string()]
        }
    }

    #[derive(Default)]
    struct FakeHost {
        faces: HashMap<String, Style>,
        frame_bg: Option<Color>,
        theme_bg: Option<Color>,
        rules: Vec<HighlightRule>,
        table: FaceTable,
        aid: Option<FakeAid>,
        messages: Vec<String>,
        refontify_count: usize,
    }

    impl FakeHost {
        fn lisp() -> Self {
            Self {
                frame_bg: Some(Color::Black),
                rules: vec![
                    HighlightRule::new("comment", r";.*$", "comment", 100),
                    HighlightRule::new("keyword", r"\b(?:defun|let)\b", "keyword", 80),
                    HighlightRule::new("paren", r"[()]", "paren", 10),
                    HighlightRule::new("bracket", r"[\[\]]", "bracket", 10),
                ],
                ..Default::default()
            }
        }

        fn with_aid(mut self) -> Self {
            self.aid = Some(FakeAid::default());
            self
        }

        fn hidden_fg(&self) -> Option<Color> {
            self.faces.get(HIDDEN_FACE).map(|s| s.fg)
        }
    }

    impl Host for FakeHost {
        fn face(&self, name: &str) -> Option<Style> {
            self.faces.get(name).copied()
        }
        fn set_face(&mut self, name: &str, style: Style) {
            self.faces.insert(name.to_string(), style);
        }
        fn remove_face(&mut self, name: &str) {
            self.faces.remove(name);
        }
        fn frame_background(&self) -> Option<Color> {
            self.frame_bg
        }
        fn theme_background(&self) -> Option<Color> {
            self.theme_bg
        }
        fn highlight_rules(&self) -> Vec<HighlightRule> {
            self.rules.clone()
        }
        fn add_highlight_rules(&mut self, rules: &[HighlightRule]) {
            for rule in rules {
                if !self.rules.contains(rule) {
                    self.rules.push(rule.clone());
                }
            }
            self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        fn remove_highlight_rules(&mut self, rules: &[HighlightRule]) {
            self.rules.retain(|r| !rules.contains(r));
        }
        fn refontify(&mut self) {
            self.refontify_count += 1;
        }
        fn push_face_override(&mut self, face: &str, ov: FaceOverride) -> OverrideHandle {
            self.table.push_override(face, ov)
        }
        fn release_face_override(&mut self, handle: OverrideHandle) {
            self.table.release(handle);
        }
        fn companion(&mut self) -> Option<&mut dyn CompanionAid> {
            self.aid.as_mut().map(|aid| aid as &mut dyn CompanionAid)
        }
        fn message(&mut self, msg: &str) {
            self.messages.push(msg.to_string());
        }
    }

    fn active(host: &mut FakeHost) -> ParenHide {
        let mut mode = ParenHide::new(Key::ctlc('h'));
        mode.activate(host);
        mode
    }

    #[test]
    fn test_activate_captures_delimiter_rules() {
        let mut host = FakeHost::lisp();
        let mode = active(&mut host);

        assert!(mode.is_active());
        assert_eq!(mode.state(), ToggleState::Normal);
        let names: Vec<&str> = mode.saved_rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["paren", "bracket"]);
        assert!(mode.active_overrides().is_empty());
    }

    #[test]
    fn test_toggle_alternates_and_round_trips_rules() {
        let mut host = FakeHost::lisp().with_aid();
        let original = host.rules.clone();
        let mut mode = active(&mut host);

        for i in 1..=6 {
            let state = mode.toggle(&mut host);
            if i % 2 == 1 {
                assert_eq!(state, ToggleState::Hidden);
                assert_eq!(host.rules[0], hide_rule());
                assert_eq!(host.rules.len(), original.len() + 1);
            } else {
                assert_eq!(state, ToggleState::Normal);
                assert_eq!(host.rules, original);
            }
        }
    }

    #[test]
    fn test_hide_sets_hidden_face_to_background() {
        let mut host = FakeHost::lisp();
        let mut mode = active(&mut host);

        mode.toggle(&mut host);
        assert_eq!(host.hidden_fg(), Some(Color::Black));
        assert_eq!(host.messages, vec![MSG_HIDDEN.to_string()]);
        assert_eq!(host.refontify_count, 1);

        mode.toggle(&mut host);
        assert_eq!(host.messages.last().map(String::as_str), Some(MSG_RESTORED));
        assert_eq!(host.refontify_count, 2);
    }

    #[test]
    fn test_background_change_between_hides_is_honored() {
        let mut host = FakeHost::lisp();
        let mut mode = active(&mut host);

        mode.toggle(&mut host);
        assert_eq!(host.hidden_fg(), Some(Color::Black));
        mode.toggle(&mut host);

        host.frame_bg = Some(Color::Rgb(0xfd, 0xf6, 0xe3));
        mode.toggle(&mut host);
        assert_eq!(host.hidden_fg(), Some(Color::Rgb(0xfd, 0xf6, 0xe3)));
    }

    #[test]
    fn test_background_fallback_chain() {
        let mut host = FakeHost::lisp();
        host.frame_bg = Some(Color::Default);
        host.theme_bg = Some(Color::BrightWhite);
        assert_eq!(resolve_background(&host), Color::BrightWhite);

        host.theme_bg = None;
        assert_eq!(resolve_background(&host), FALLBACK_BACKGROUND);

        host.frame_bg = Some(Color::Blue);
        assert_eq!(resolve_background(&host), Color::Blue);
    }

    #[test]
    fn test_hide_overrides_companion_faces() {
        let mut host = FakeHost::lisp().with_aid();
        let mut mode = active(&mut host);
        assert!(host.aid.as_ref().is_some_and(|aid| aid.enabled));

        mode.toggle(&mut host);
        assert_eq!(mode.active_overrides().len(), 2);
        assert_eq!(host.table.override_count(), 2);
        assert_eq!(host.table.resolve("aid-paren").fg, Color::Black);
        assert_eq!(host.table.resolve("aid-mismatch").fg, Color::Black);

        mode.toggle(&mut host);
        assert!(mode.active_overrides().is_empty());
        assert_eq!(host.table.override_count(), 0);
    }

    #[test]
    fn test_deactivate_from_hidden() {
        let mut host = FakeHost::lisp().with_aid();
        let original = host.rules.clone();
        let mut mode = active(&mut host);
        mode.toggle(&mut host);

        mode.deactivate(&mut host);
        assert_eq!(mode.state(), ToggleState::Normal);
        assert!(mode.active_overrides().is_empty());
        assert!(mode.saved_rules().is_empty());
        assert!(!mode.is_active());
        assert_eq!(host.table.override_count(), 0);
        assert_eq!(host.rules, original);
        assert!(host.aid.as_ref().is_some_and(|aid| !aid.enabled));
    }

    #[test]
    fn test_deactivate_leaves_faces_as_found() {
        let mut host = FakeHost::lisp();
        host.faces.insert("comment".to_string(), Style::fg(Color::Cyan));
        let faces = host.faces.clone();
        let mut mode = active(&mut host);
        mode.toggle(&mut host);
        assert!(host.faces.contains_key(HIDDEN_FACE));

        mode.deactivate(&mut host);
        assert_eq!(host.faces, faces);

        // A hidden face defined before activation is put back
        let custom = Style::fg(Color::Red).with_bold();
        host.faces.insert(HIDDEN_FACE.to_string(), custom);
        mode.activate(&mut host);
        mode.toggle(&mut host);
        assert_eq!(host.hidden_fg(), Some(Color::Black));
        mode.deactivate(&mut host);
        assert_eq!(host.faces.get(HIDDEN_FACE), Some(&custom));

        // Deactivating again touches nothing
        mode.deactivate(&mut host);
        assert_eq!(host.faces.get(HIDDEN_FACE), Some(&custom));
    }

    #[test]
    fn test_deactivate_from_normal_and_inactive() {
        let mut host = FakeHost::lisp();
        let original = host.rules.clone();

        let mut mode = ParenHide::new(Key::ctlc('h'));
        mode.deactivate(&mut host);
        assert_eq!(mode.state(), ToggleState::Normal);
        assert_eq!(host.rules, original);

        mode.activate(&mut host);
        mode.deactivate(&mut host);
        assert_eq!(mode.state(), ToggleState::Normal);
        assert!(mode.active_overrides().is_empty());
        assert_eq!(host.rules, original);
    }

    #[test]
    fn test_companion_enabled_elsewhere_is_left_on() {
        let mut host = FakeHost::lisp().with_aid();
        if let Some(aid) = host.aid.as_mut() {
            aid.enabled = true;
        }

        let mut mode = active(&mut host);
        assert_eq!(host.aid.as_ref().map(|aid| aid.enable_calls), Some(0));
        mode.deactivate(&mut host);
        assert!(host.aid.as_ref().is_some_and(|aid| aid.enabled));
    }

    #[test]
    fn test_without_companion_only_rules_change() {
        let mut host = FakeHost::lisp();
        let mut mode = active(&mut host);

        assert_eq!(mode.toggle(&mut host), ToggleState::Hidden);
        assert!(mode.active_overrides().is_empty());
        assert_eq!(host.table.override_count(), 0);
        assert_eq!(host.rules[0], hide_rule());
        assert_eq!(host.hidden_fg(), Some(Color::Black));
    }

    #[test]
    fn test_restore_readds_rules_removed_while_hidden() {
        let mut host = FakeHost::lisp();
        let original = host.rules.clone();
        let mut mode = active(&mut host);

        mode.toggle(&mut host);
        let saved = mode.saved_rules().to_vec();
        host.remove_highlight_rules(&saved);
        mode.toggle(&mut host);
        assert_eq!(host.rules, original);
    }

    #[test]
    fn test_toggle_inactive_is_noop() {
        let mut host = FakeHost::lisp();
        let original = host.rules.clone();
        let mut mode = ParenHide::new(Key::ctlc('h'));

        assert_eq!(mode.toggle(&mut host), ToggleState::Normal);
        assert_eq!(host.rules, original);
        assert!(host.messages.is_empty());
    }

    #[test]
    fn test_mode_slot_lifecycle_and_binding() {
        let mut host = FakeHost::lisp();
        let mut slot = ModeSlot::new(ParenHide::new(Key::ctlc('h')));

        assert!(!slot.dispatch(Key::ctlc('h'), &mut host));
        assert!(slot.toggle(&mut host));
        assert_eq!(slot.lighter(), "ParenHide");

        assert!(slot.dispatch(Key::ctlc('h'), &mut host));
        assert!(slot.mode().is_hidden());
        assert_eq!(slot.lighter(), "ParenHide[hidden]");
        assert!(!slot.dispatch(Key::ctlc('x'), &mut host));

        assert!(!slot.toggle(&mut host));
        assert_eq!(slot.mode().state(), ToggleState::Normal);
        assert_eq!(slot.lighter(), "");
    }
}
