//! Global key bindings of the viewer
//!
//! Minor-mode bindings are consulted before this table, so a mode can
//! shadow any global key while it is on.

use std::collections::HashMap;

use crate::input::{special, Key};
use crate::paren_hide::MODE_COMMAND;

/// A viewer command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ForwardChar,
    BackwardChar,
    NextLine,
    PreviousLine,
    BeginningOfLine,
    EndOfLine,
    ScrollDown,
    ScrollUp,
    BeginningOfBuffer,
    EndOfBuffer,
    /// Switch the paren-hide minor mode on or off
    ToggleParenHideMode,
    Redraw,
    Abort,
    Quit,
}

impl Command {
    /// Command name as shown in key listings
    pub fn name(self) -> &'static str {
        match self {
            Command::ForwardChar => "forward-char",
            Command::BackwardChar => "backward-char",
            Command::NextLine => "next-line",
            Command::PreviousLine => "previous-line",
            Command::BeginningOfLine => "beginning-of-line",
            Command::EndOfLine => "end-of-line",
            Command::ScrollDown => "scroll-down",
            Command::ScrollUp => "scroll-up",
            Command::BeginningOfBuffer => "beginning-of-buffer",
            Command::EndOfBuffer => "end-of-buffer",
            Command::ToggleParenHideMode => MODE_COMMAND,
            Command::Redraw => "redraw-display",
            Command::Abort => "abort",
            Command::Quit => "quit",
        }
    }
}

/// Key binding table
pub struct KeyTable {
    bindings: HashMap<u32, Command>,
}

impl KeyTable {
    /// Create an empty key table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create key table with default bindings
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.setup_defaults();
        table
    }

    /// Add a key binding
    pub fn bind(&mut self, key: Key, cmd: Command) {
        self.bindings.insert(key.code(), cmd);
    }

    /// Look up a command for a key
    pub fn lookup(&self, key: Key) -> Option<Command> {
        self.bindings.get(&key.code()).copied()
    }

    /// All bindings as (key, command), sorted by command name
    pub fn all_bindings(&self) -> Vec<(Key, Command)> {
        let mut bindings: Vec<_> = self.bindings.iter().map(|(&code, &cmd)| (Key(code), cmd)).collect();
        bindings.sort_by_key(|(key, cmd)| (cmd.name(), key.code()));
        bindings
    }

    /// Set up default key bindings
    fn setup_defaults(&mut self) {
        // Basic cursor movement
        self.bind(Key::ctrl('f'), Command::ForwardChar);
        self.bind(Key::ctrl('b'), Command::BackwardChar);
        self.bind(Key::ctrl('n'), Command::NextLine);
        self.bind(Key::ctrl('p'), Command::PreviousLine);
        self.bind(Key::ctrl('a'), Command::BeginningOfLine);
        self.bind(Key::ctrl('e'), Command::EndOfLine);

        // Arrow keys
        self.bind(Key::special(special::RIGHT), Command::ForwardChar);
        self.bind(Key::special(special::LEFT), Command::BackwardChar);
        self.bind(Key::special(special::DOWN), Command::NextLine);
        self.bind(Key::special(special::UP), Command::PreviousLine);
        self.bind(Key::special(special::HOME), Command::BeginningOfLine);
        self.bind(Key::special(special::END), Command::EndOfLine);

        // Paging
        self.bind(Key::ctrl('v'), Command::ScrollDown);
        self.bind(Key::meta('v'), Command::ScrollUp);
        self.bind(Key::special(special::PAGE_DOWN), Command::ScrollDown);
        self.bind(Key::special(special::PAGE_UP), Command::ScrollUp);
        self.bind(Key::char(' '), Command::ScrollDown);
        self.bind(Key::meta('<'), Command::BeginningOfBuffer);
        self.bind(Key::meta('>'), Command::EndOfBuffer);

        self.bind(Key::ctlx('p'), Command::ToggleParenHideMode);

        self.bind(Key::ctrl('l'), Command::Redraw);
        self.bind(Key::ctrl('g'), Command::Abort);
        self.bind(Key::ctlx_ctrl('c'), Command::Quit);
        self.bind(Key::char('q'), Command::Quit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let table = KeyTable::with_defaults();
        assert_eq!(table.lookup(Key::ctrl('n')), Some(Command::NextLine));
        assert_eq!(table.lookup(Key::special(special::PAGE_UP)), Some(Command::ScrollUp));
        assert_eq!(table.lookup(Key::meta('>')), Some(Command::EndOfBuffer));
        assert_eq!(table.lookup(Key::ctlx('p')), Some(Command::ToggleParenHideMode));
        assert_eq!(table.lookup(Key::ctlx_ctrl('c')), Some(Command::Quit));
        assert_eq!(table.lookup(Key::char('q')), Some(Command::Quit));
        assert_eq!(table.lookup(Key::ctlc('h')), None);
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut table = KeyTable::new();
        table.bind(Key::char('j'), Command::NextLine);
        table.bind(Key::char('j'), Command::PreviousLine);
        assert_eq!(table.lookup(Key::char('j')), Some(Command::PreviousLine));
        assert_eq!(table.lookup(Key::char('k')), None);
    }

    #[test]
    fn test_all_bindings_sorted_by_name() {
        let table = KeyTable::with_defaults();
        let names: Vec<&str> = table.all_bindings().iter().map(|(_, cmd)| cmd.name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"paren-hide-mode"));
    }
}
