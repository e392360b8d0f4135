//! Input handling - key reading and translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::{Result, ViewerError};

/// Key modifier flags
pub mod key_flags {
    pub const CTLC: u32 = 0x0800_0000;
    pub const CONTROL: u32 = 0x1000_0000;
    pub const META: u32 = 0x2000_0000;
    pub const CTLX: u32 = 0x4000_0000;
    pub const SPEC: u32 = 0x8000_0000;
}

/// Special key codes (low byte of a SPEC key)
pub mod special {
    pub const HOME: u32 = 0x47;
    pub const UP: u32 = 0x48;
    pub const PAGE_UP: u32 = 0x49;
    pub const LEFT: u32 = 0x4b;
    pub const RIGHT: u32 = 0x4d;
    pub const END: u32 = 0x4f;
    pub const DOWN: u32 = 0x50;
    pub const PAGE_DOWN: u32 = 0x51;
    pub const DELETE: u32 = 0x53;
    /// F1 is `F_BASE + 1`
    pub const F_BASE: u32 = 0x3a;
}

const SPECIAL_NAMES: [(&str, u32); 9] = [
    ("Home", special::HOME),
    ("Up", special::UP),
    ("PageUp", special::PAGE_UP),
    ("Left", special::LEFT),
    ("Right", special::RIGHT),
    ("End", special::END),
    ("Down", special::DOWN),
    ("PageDown", special::PAGE_DOWN),
    ("Delete", special::DELETE),
];

/// Represents a key input with modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

impl Key {
    /// Create a key from a character
    pub fn char(ch: char) -> Self {
        Key(ch as u32)
    }

    /// Create a control key (C-x)
    pub fn ctrl(ch: char) -> Self {
        Key(key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a meta key (M-x or ESC x)
    pub fn meta(ch: char) -> Self {
        Key(key_flags::META | ch as u32)
    }

    /// Create a C-x prefixed key (C-x x)
    pub fn ctlx(ch: char) -> Self {
        Key(key_flags::CTLX | ch as u32)
    }

    /// Create a C-x C-x key (C-x C-x)
    pub fn ctlx_ctrl(ch: char) -> Self {
        Key(key_flags::CTLX | key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a C-c prefixed key (C-c x)
    pub fn ctlc(ch: char) -> Self {
        Key(key_flags::CTLC | ch as u32)
    }

    /// Create a special key (function keys, arrows, etc.)
    pub fn special(code: u32) -> Self {
        Key(key_flags::SPEC | code)
    }

    /// Get the raw key code
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Check if this is a control key
    pub fn is_ctrl(&self) -> bool {
        self.0 & key_flags::CONTROL != 0
    }

    /// Check if this is a meta key
    pub fn is_meta(&self) -> bool {
        self.0 & key_flags::META != 0
    }

    /// Check if this is a C-x prefixed key
    pub fn is_ctlx(&self) -> bool {
        self.0 & key_flags::CTLX != 0
    }

    /// Check if this is a C-c prefixed key
    pub fn is_ctlc(&self) -> bool {
        self.0 & key_flags::CTLC != 0
    }

    /// Check if this is a special key
    pub fn is_special(&self) -> bool {
        self.0 & key_flags::SPEC != 0
    }

    /// Parse a key sequence such as `"C-c h"`, `"M-<"` or `"C-x C-c"`
    ///
    /// Two-key sequences must start with the `C-x` or `C-c` prefix.
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || ViewerError::BadKey(s.to_string());
        let parts: Vec<&str> = s.split_whitespace().collect();

        match parts.as_slice() {
            [single] => parse_single(single).ok_or_else(bad),
            [prefix, rest] => {
                let flag = match *prefix {
                    "C-x" => key_flags::CTLX,
                    "C-c" => key_flags::CTLC,
                    _ => return Err(bad()),
                };
                let key = parse_single(rest).ok_or_else(bad)?;
                Ok(Key(key.0 | flag))
            }
            _ => Err(bad()),
        }
    }

    /// Convert key to a human-readable string (e.g., "C-f", "M-x", "C-x C-s")
    pub fn display_name(&self) -> String {
        let mut result = String::new();

        if self.is_ctlx() {
            result.push_str("C-x ");
        } else if self.is_ctlc() {
            result.push_str("C-c ");
        }
        if self.is_ctrl() {
            result.push_str("C-");
        }
        if self.is_meta() {
            result.push_str("M-");
        }

        if self.is_special() {
            let code = self.0 & 0xFF;
            if let Some((name, _)) = SPECIAL_NAMES.iter().find(|(_, c)| *c == code) {
                result.push_str(name);
            } else if (special::F_BASE + 1..=special::F_BASE + 12).contains(&code) {
                result.push_str(&format!("F{}", code - special::F_BASE));
            } else {
                result.push_str(&format!("special-0x{:02x}", code));
            }
            return result;
        }

        let base = self.0 & 0x00FF_FFFF;
        if base == 0x7f {
            result.push_str("Backspace");
        } else if base == 0x20 {
            result.push_str("SPC");
        } else if let Some(ch) = char::from_u32(base) {
            result.push(ch);
        } else {
            result.push_str(&format!("0x{:x}", base));
        }

        result
    }
}

/// Parse one key: optional `C-` / `M-` modifiers then a char or key name
fn parse_single(s: &str) -> Option<Key> {
    let mut flags = 0;
    let mut rest = s;
    loop {
        if let Some(r) = rest.strip_prefix("C-").filter(|r| !r.is_empty()) {
            flags |= key_flags::CONTROL;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("M-").filter(|r| !r.is_empty()) {
            flags |= key_flags::META;
            rest = r;
        } else {
            break;
        }
    }

    let base = if rest == "SPC" {
        ' ' as u32
    } else if let Some((_, code)) = SPECIAL_NAMES.iter().find(|(name, _)| *name == rest) {
        key_flags::SPEC | code
    } else if let Some(n) = rest.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        if !(1..=12).contains(&n) {
            return None;
        }
        key_flags::SPEC | (special::F_BASE + n)
    } else {
        let mut chars = rest.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if flags & key_flags::CONTROL != 0 {
            ch.to_ascii_lowercase() as u32
        } else {
            ch as u32
        }
    };

    Some(Key(flags | base))
}

/// Input state for handling multi-key sequences
#[derive(Debug, Default)]
pub struct InputState {
    /// Waiting for C-x continuation
    ctlx_pending: bool,
    /// Waiting for C-c continuation
    ctlc_pending: bool,
    /// Waiting for Meta continuation (after ESC)
    meta_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo text for a pending prefix ("C-x -")
    pub fn pending_prompt(&self) -> Option<&'static str> {
        if self.ctlx_pending {
            Some("C-x -")
        } else if self.ctlc_pending {
            Some("C-c -")
        } else if self.meta_pending {
            Some("ESC -")
        } else {
            None
        }
    }

    /// Translate a crossterm KeyEvent to our Key representation
    pub fn translate_key(&mut self, event: KeyEvent) -> Option<Key> {
        let KeyEvent {
            code, modifiers, kind, ..
        } = event;

        // Only process key press events, ignore release and repeat
        if kind != KeyEventKind::Press {
            return None;
        }

        if self.meta_pending {
            self.meta_pending = false;
            return self.translate_normal(code, modifiers).map(|k| Key(k.0 | key_flags::META));
        }

        let prefix = if self.ctlx_pending {
            Some(key_flags::CTLX)
        } else if self.ctlc_pending {
            Some(key_flags::CTLC)
        } else {
            None
        };
        if let Some(flag) = prefix {
            self.ctlx_pending = false;
            self.ctlc_pending = false;
            return self.translate_normal(code, modifiers).map(|k| Key(k.0 | flag));
        }

        if code == KeyCode::Esc {
            self.meta_pending = true;
            return None;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            match code {
                KeyCode::Char('x') => {
                    self.ctlx_pending = true;
                    return None;
                }
                KeyCode::Char('c') => {
                    self.ctlc_pending = true;
                    return None;
                }
                _ => {}
            }
        }

        self.translate_normal(code, modifiers)
    }

    fn translate_normal(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);

        match code {
            KeyCode::Char(ch) => {
                if ctrl && alt {
                    Some(Key(key_flags::META | key_flags::CONTROL | ch.to_ascii_lowercase() as u32))
                } else if ctrl {
                    Some(Key::ctrl(ch))
                } else if alt {
                    Some(Key::meta(ch))
                } else {
                    Some(Key::char(ch))
                }
            }
            KeyCode::Enter => Some(Key::ctrl('m')),
            KeyCode::Tab => Some(Key::ctrl('i')),
            KeyCode::Backspace => Some(Key(0x7f)),
            KeyCode::Delete => Some(Key::special(special::DELETE)),
            KeyCode::Home => Some(Key::special(special::HOME)),
            KeyCode::End => Some(Key::special(special::END)),
            KeyCode::PageUp => Some(Key::special(special::PAGE_UP)),
            KeyCode::PageDown => Some(Key::special(special::PAGE_DOWN)),
            KeyCode::Up => Some(Key::special(special::UP)),
            KeyCode::Down => Some(Key::special(special::DOWN)),
            KeyCode::Left => Some(Key::special(special::LEFT)),
            KeyCode::Right => Some(Key::special(special::RIGHT)),
            KeyCode::F(n) => Some(Key::special(special::F_BASE + n as u32)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(Key::parse("q").unwrap(), Key::char('q'));
        assert_eq!(Key::parse("C-n").unwrap(), Key::ctrl('n'));
        assert_eq!(Key::parse("M-<").unwrap(), Key::meta('<'));
        assert_eq!(Key::parse("C-c h").unwrap(), Key::ctlc('h'));
        assert_eq!(Key::parse("C-x p").unwrap(), Key::ctlx('p'));
        assert_eq!(Key::parse("C-x C-c").unwrap(), Key::ctlx_ctrl('c'));
        assert_eq!(Key::parse("PageDown").unwrap(), Key::special(special::PAGE_DOWN));
        assert_eq!(Key::parse("F1").unwrap(), Key::special(special::F_BASE + 1));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Key::parse("").is_err());
        assert!(Key::parse("hello").is_err());
        assert!(Key::parse("M-x h").is_err());
        assert!(Key::parse("C-c h j").is_err());
        assert!(Key::parse("F13").is_err());
    }

    #[test]
    fn test_display_name_round_trips_through_parse() {
        for name in ["C-c h", "C-x C-c", "M-<", "Up", "F5", "q", "C-M-a"] {
            let key = Key::parse(name).unwrap();
            assert_eq!(Key::parse(&key.display_name()).unwrap(), key, "{name}");
        }
        assert_eq!(Key::parse("C-c h").unwrap().display_name(), "C-c h");
    }

    #[test]
    fn test_translate_prefix_sequences() {
        let mut input = InputState::new();

        assert_eq!(input.translate_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), None);
        assert_eq!(input.pending_prompt(), Some("C-c -"));
        assert_eq!(
            input.translate_key(press(KeyCode::Char('h'), KeyModifiers::NONE)),
            Some(Key::ctlc('h'))
        );
        assert_eq!(input.pending_prompt(), None);

        assert_eq!(input.translate_key(press(KeyCode::Char('x'), KeyModifiers::CONTROL)), None);
        assert_eq!(
            input.translate_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Key::ctlx_ctrl('c'))
        );
    }

    #[test]
    fn test_translate_escape_as_meta() {
        let mut input = InputState::new();
        assert_eq!(input.translate_key(press(KeyCode::Esc, KeyModifiers::NONE)), None);
        assert_eq!(
            input.translate_key(press(KeyCode::Char('>'), KeyModifiers::NONE)),
            Some(Key::meta('>'))
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut input = InputState::new();
        let mut event = press(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(input.translate_key(event), None);
    }
}
