//! Host services available to minor modes
//!
//! Minor modes never reach into the session directly. Everything they
//! may read or change about a buffer's styling goes through [`Host`],
//! and the optional structural-editing aid is probed through
//! [`Host::companion`] before use.

use crate::face::{FaceOverride, OverrideHandle};
use crate::syntax::{Color, HighlightRule, Style};

/// An optional structural-editing aid that also colors parentheses
pub trait CompanionAid {
    /// Whether the aid is installed and usable
    fn is_present(&self) -> bool;

    /// Whether the aid is currently turned on
    fn is_enabled(&self) -> bool;

    fn enable(&mut self);

    fn disable(&mut self);

    /// Faces the aid draws parentheses with
    fn paren_faces(&self) -> Vec<String>;
}

/// Styling and highlighting services of one buffer
pub trait Host {
    /// Base style of a named face
    fn face(&self, name: &str) -> Option<Style>;

    /// Define or redefine a named face
    fn set_face(&mut self, name: &str, style: Style);

    /// Drop a named face; unknown names are ignored
    fn remove_face(&mut self, name: &str);

    /// Background color resolved for the frame showing the buffer
    fn frame_background(&self) -> Option<Color>;

    /// Background color of the active theme's default face
    fn theme_background(&self) -> Option<Color>;

    /// The buffer's active highlight rules, highest precedence first
    fn highlight_rules(&self) -> Vec<HighlightRule>;

    /// Add rules not already present
    fn add_highlight_rules(&mut self, rules: &[HighlightRule]);

    /// Remove rules equal to any of `rules`
    fn remove_highlight_rules(&mut self, rules: &[HighlightRule]);

    /// Re-scan the buffer with the current rules
    fn refontify(&mut self);

    /// Layer a temporary override on a face
    fn push_face_override(&mut self, face: &str, ov: FaceOverride) -> OverrideHandle;

    /// Drop a face override
    fn release_face_override(&mut self, handle: OverrideHandle);

    /// The companion aid, if the host has one
    fn companion(&mut self) -> Option<&mut dyn CompanionAid>;

    /// Show a status message
    fn message(&mut self, msg: &str);
}
