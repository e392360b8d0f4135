//! Viewer state and main loop

use tracing::{debug, info};
use unicode_width::UnicodeWidthChar;

use crate::command::{Command, KeyTable};
use crate::companion::ParenMatcher;
use crate::display::Display;
use crate::error::Result;
use crate::input::{InputState, Key};
use crate::mode::ModeSlot;
use crate::paren_hide::ParenHide;
use crate::session::Session;
use crate::syntax::is_lisp_dialect;
use crate::terminal::Terminal;
use crate::window::Window;

/// Startup choices for a viewer
#[derive(Debug, Clone, Copy)]
pub struct ViewerOptions {
    /// In-mode binding of the paren-hide toggle
    pub toggle_key: Key,
    /// Hide parentheses right after the mode comes on
    pub hide_on_open: bool,
    pub show_line_numbers: bool,
}

/// Read-only viewer over one session
pub struct Viewer {
    session: Session,
    /// Paren-hide mode of the session's buffer
    mode: ModeSlot<ParenHide>,
    keytab: KeyTable,
    input: InputState,
    window: Window,
    display: Display,
    running: bool,
}

impl Viewer {
    /// Create a viewer with `height` text rows
    ///
    /// Lisp buffers get the paren-hide mode switched on straight away.
    pub fn new(session: Session, options: ViewerOptions, height: u16) -> Self {
        let mut display = Display::new();
        display.show_line_numbers = options.show_line_numbers;

        let mut viewer = Self {
            session,
            mode: ModeSlot::new(ParenHide::new(options.toggle_key)),
            keytab: KeyTable::with_defaults(),
            input: InputState::new(),
            window: Window::new(height.max(1)),
            display,
            running: true,
        };

        if viewer.session.language().is_some_and(is_lisp_dialect) {
            info!(buffer = viewer.session.buffer().name(), "enabling paren-hide for Lisp buffer");
            viewer.mode.enable(&mut viewer.session);
            if options.hide_on_open {
                viewer.mode.dispatch(options.toggle_key, &mut viewer.session);
            }
        }
        if viewer.session.companion_enabled() {
            if let Some(pos) = ParenMatcher::first_unbalanced(viewer.session.buffer().lines()) {
                viewer.display.set_message(format!(
                    "Unbalanced delimiter at line {}, column {}",
                    pos.line + 1,
                    pos.col + 1
                ));
            }
        }
        viewer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consume the viewer, giving back its session
    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn mode(&self) -> &ModeSlot<ParenHide> {
        &self.mode
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run the main viewer loop
    pub fn run(&mut self, terminal: &mut Terminal) -> Result<()> {
        self.display.force_redraw();

        while self.running {
            // Text rows: everything except the mode line and minibuffer
            self.window.set_height(terminal.rows().saturating_sub(2));
            let lighter = self.mode.lighter();
            self.display.render(terminal, &mut self.session, &self.window, &lighter)?;

            let key_event = terminal.read_key()?;
            if let Some(key) = self.input.translate_key(key_event) {
                if self.handle_key(key).is_none() {
                    terminal.beep()?;
                }
            } else if let Some(prompt) = self.input.pending_prompt() {
                // Show visual feedback that we're waiting for continuation key
                self.display.set_message(prompt);
            }
        }

        Ok(())
    }

    /// Handle a key press; returns `None` when nothing is bound to it
    ///
    /// Bindings of the minor mode are tried before the global table.
    pub fn handle_key(&mut self, key: Key) -> Option<&'static str> {
        self.display.clear_message();
        self.session.clear_message();

        if let Some(command) = self.mode.lookup(key) {
            self.mode.dispatch(key, &mut self.session);
            return Some(command);
        }

        match self.keytab.lookup(key) {
            Some(cmd) => {
                self.execute(cmd);
                Some(cmd.name())
            }
            None => {
                debug!(key = %key.display_name(), "unbound key");
                self.display.set_message(format!("{} is not bound", key.display_name()));
                None
            }
        }
    }

    fn execute(&mut self, cmd: Command) {
        match cmd {
            Command::ForwardChar => self.move_cursor_right(),
            Command::BackwardChar => self.move_cursor_left(),
            Command::NextLine => self.move_cursor_down(),
            Command::PreviousLine => self.move_cursor_up(),
            Command::BeginningOfLine => self.move_to_bol(),
            Command::EndOfLine => self.move_to_eol(),
            Command::ScrollDown => self.page_down(),
            Command::ScrollUp => self.page_up(),
            Command::BeginningOfBuffer => self.move_to_buffer_start(),
            Command::EndOfBuffer => self.move_to_buffer_end(),
            Command::ToggleParenHideMode => {
                let on = self.mode.toggle(&mut self.session);
                let state = if on { "enabled" } else { "disabled" };
                self.display.set_message(format!("Paren-Hide mode {}", state));
            }
            Command::Redraw => self.display.force_redraw(),
            Command::Abort => self.display.set_message("Quit"),
            Command::Quit => self.running = false,
        }
    }

    fn line_len(&self, line_idx: usize) -> usize {
        self.session.buffer().line(line_idx).map_or(0, str::len)
    }

    /// Convert display column to byte offset in a line
    fn col_to_byte_in_line(&self, line_idx: usize, display_col: usize) -> usize {
        let Some(text) = self.session.buffer().line(line_idx) else {
            return 0;
        };
        let mut col = 0;
        for (byte, ch) in text.char_indices() {
            if col >= display_col {
                return byte;
            }
            col += UnicodeWidthChar::width(ch).unwrap_or(1);
        }
        text.len()
    }

    /// Display column of the cursor
    fn cursor_display_col(&self) -> usize {
        let line = self.session.buffer().line(self.window.cursor_line()).unwrap_or_default();
        line[..self.window.cursor_col().min(line.len())]
            .chars()
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1))
            .sum()
    }

    /// Move cursor right
    fn move_cursor_right(&mut self) {
        let cursor_line = self.window.cursor_line();
        let cursor_col = self.window.cursor_col();
        let line = self.session.buffer().line(cursor_line).unwrap_or_default();

        if let Some(ch) = line.get(cursor_col..).and_then(|rest| rest.chars().next()) {
            // Move to next character
            self.window.set_cursor(cursor_line, cursor_col + ch.len_utf8());
        } else if cursor_line + 1 < self.session.buffer().line_count() {
            // Move to beginning of next line
            self.window.set_cursor(cursor_line + 1, 0);
        }

        self.window.set_goal_col(self.cursor_display_col());
        self.window.ensure_cursor_visible();
    }

    /// Move cursor left
    fn move_cursor_left(&mut self) {
        let cursor_line = self.window.cursor_line();
        let cursor_col = self.window.cursor_col();

        if cursor_col > 0 {
            // Move to previous character
            let line = self.session.buffer().line(cursor_line).unwrap_or_default();
            if let Some(ch) = line.get(..cursor_col).and_then(|before| before.chars().last()) {
                self.window.set_cursor(cursor_line, cursor_col - ch.len_utf8());
            }
        } else if cursor_line > 0 {
            // Move to end of previous line
            let prev_line_len = self.line_len(cursor_line - 1);
            self.window.set_cursor(cursor_line - 1, prev_line_len);
        }

        self.window.set_goal_col(self.cursor_display_col());
        self.window.ensure_cursor_visible();
    }

    /// Move cursor down
    fn move_cursor_down(&mut self) {
        let cursor_line = self.window.cursor_line();
        if cursor_line + 1 < self.session.buffer().line_count() {
            // Move to next line, trying to maintain column
            let new_col = self.col_to_byte_in_line(cursor_line + 1, self.window.goal_col());
            self.window.set_cursor(cursor_line + 1, new_col);
        }
        self.window.ensure_cursor_visible();
    }

    /// Move cursor up
    fn move_cursor_up(&mut self) {
        let cursor_line = self.window.cursor_line();
        if cursor_line > 0 {
            // Move to previous line, trying to maintain column
            let new_col = self.col_to_byte_in_line(cursor_line - 1, self.window.goal_col());
            self.window.set_cursor(cursor_line - 1, new_col);
        }
        self.window.ensure_cursor_visible();
    }

    /// Move to beginning of line
    fn move_to_bol(&mut self) {
        let cursor_line = self.window.cursor_line();
        self.window.set_cursor(cursor_line, 0);
        self.window.set_goal_col(0);
    }

    /// Move to end of line
    fn move_to_eol(&mut self) {
        let cursor_line = self.window.cursor_line();
        self.window.set_cursor(cursor_line, self.line_len(cursor_line));
        self.window.set_goal_col(self.cursor_display_col());
    }

    /// Page down
    fn page_down(&mut self) {
        let height = self.window.height() as usize;
        let max_line = self.session.buffer().line_count();
        self.window.scroll_down(height.saturating_sub(2).max(1), max_line);

        // Move cursor to top of new view
        let new_cursor = self.window.top_line();
        let new_col = self.col_to_byte_in_line(new_cursor, self.window.goal_col());
        self.window.set_cursor(new_cursor, new_col);
    }

    /// Page up
    fn page_up(&mut self) {
        let height = self.window.height() as usize;
        self.window.scroll_up(height.saturating_sub(2).max(1));

        // Move cursor to top of new view
        let new_cursor = self.window.top_line();
        let new_col = self.col_to_byte_in_line(new_cursor, self.window.goal_col());
        self.window.set_cursor(new_cursor, new_col);
    }

    /// Move to beginning of buffer
    fn move_to_buffer_start(&mut self) {
        self.window.set_cursor(0, 0);
        self.window.set_top_line(0);
        self.window.set_goal_col(0);
    }

    /// Move to end of buffer
    fn move_to_buffer_end(&mut self) {
        let last_line = self.session.buffer().line_count().saturating_sub(1);
        self.window.set_cursor(last_line, self.line_len(last_line));
        self.window.set_goal_col(self.cursor_display_col());
        self.window.ensure_cursor_visible();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::companion::Pos;
    use crate::face::Theme;
    use crate::host::Host;
    use crate::input::special;
    use crate::paren_hide::{ToggleState, MSG_HIDDEN, MSG_RESTORED, TOGGLE_COMMAND};
    use crate::syntax::SyntaxManager;

    const SOURCE: &str = "(defun twice (x)\n  (* x 2))\n\n(twice 21)\n";

    fn options() -> ViewerOptions {
        ViewerOptions {
            toggle_key: Key::ctlc('h'),
            hide_on_open: false,
            show_line_numbers: false,
        }
    }

    fn lisp_session() -> Session {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twice.el");
        std::fs::write(&path, SOURCE).unwrap();
        Session::new(Buffer::from_file(&path).unwrap(), &SyntaxManager::new(), Theme::dark())
            .with_companion(ParenMatcher::new())
    }

    #[test]
    fn test_lisp_buffer_enables_mode() {
        let viewer = Viewer::new(lisp_session(), options(), 20);
        assert!(viewer.mode().is_enabled());
        assert_eq!(viewer.mode().lighter(), "ParenHide");
        assert!(viewer.session().companion_enabled());
    }

    #[test]
    fn test_plain_buffer_leaves_mode_off() {
        let session = Session::new(Buffer::from_text("notes", "(x)"), &SyntaxManager::new(), Theme::dark());
        let mut viewer = Viewer::new(session, options(), 20);
        assert!(!viewer.mode().is_enabled());
        assert_eq!(viewer.mode().lighter(), "");

        // The toggle key means nothing while the mode is off
        assert_eq!(viewer.handle_key(Key::ctlc('h')), None);
        assert_eq!(viewer.handle_key(Key::ctlx('p')), Some("paren-hide-mode"));
        assert!(viewer.mode().is_enabled());
    }

    #[test]
    fn test_toggle_key_hides_and_restores() {
        let mut viewer = Viewer::new(lisp_session(), options(), 20);
        let rules = viewer.session().highlight_rules();

        assert_eq!(viewer.handle_key(Key::ctlc('h')), Some(TOGGLE_COMMAND));
        assert_eq!(viewer.mode().mode().state(), ToggleState::Hidden);
        assert_eq!(viewer.mode().lighter(), "ParenHide[hidden]");
        assert_eq!(viewer.session().current_message(), Some(MSG_HIDDEN));

        viewer.handle_key(Key::ctlc('h'));
        assert_eq!(viewer.session().current_message(), Some(MSG_RESTORED));
        assert_eq!(viewer.session().highlight_rules(), rules);
    }

    #[test]
    fn test_mode_command_turns_everything_back() {
        let mut viewer = Viewer::new(lisp_session(), options(), 20);
        let rules = viewer.session().highlight_rules();
        viewer.handle_key(Key::ctlc('h'));

        viewer.handle_key(Key::ctlx('p'));
        assert!(!viewer.mode().is_enabled());
        assert!(!viewer.mode().mode().is_hidden());
        assert_eq!(viewer.session().override_count(), 0);
        assert_eq!(viewer.session().highlight_rules(), rules);
        assert!(!viewer.session().companion_enabled());
    }

    #[test]
    fn test_hide_on_open() {
        let opts = ViewerOptions {
            hide_on_open: true,
            ..options()
        };
        let viewer = Viewer::new(lisp_session(), opts, 20);
        assert!(viewer.mode().mode().is_hidden());
    }

    #[test]
    fn test_navigation() {
        let mut viewer = Viewer::new(lisp_session(), options(), 2);

        viewer.handle_key(Key::ctrl('e'));
        assert_eq!(viewer.window().cursor(), Pos::new(0, 16));
        viewer.handle_key(Key::ctrl('f'));
        assert_eq!(viewer.window().cursor(), Pos::new(1, 0));
        viewer.handle_key(Key::special(special::LEFT));
        assert_eq!(viewer.window().cursor(), Pos::new(0, 16));

        viewer.handle_key(Key::meta('>'));
        assert_eq!(viewer.window().cursor(), Pos::new(3, 10));
        assert_eq!(viewer.window().top_line(), 2);

        viewer.handle_key(Key::ctrl('p'));
        assert_eq!(viewer.window().cursor(), Pos::new(2, 0));
        viewer.handle_key(Key::ctrl('p'));
        assert_eq!(viewer.window().cursor(), Pos::new(1, 10));

        viewer.handle_key(Key::meta('<'));
        assert_eq!(viewer.window().cursor(), Pos::new(0, 0));
        assert_eq!(viewer.window().top_line(), 0);
    }

    #[test]
    fn test_unbalanced_buffer_reported_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.scm");
        std::fs::write(&path, "(define (f x)\n  (+ x 1)\n").unwrap();
        let session = Session::new(Buffer::from_file(&path).unwrap(), &SyntaxManager::new(), Theme::dark())
            .with_companion(ParenMatcher::new());

        let viewer = Viewer::new(session, options(), 20);
        assert_eq!(
            viewer.display.message(viewer.session()),
            Some("Unbalanced delimiter at line 1, column 1")
        );
    }

    #[test]
    fn test_quit_and_unbound_keys() {
        let mut viewer = Viewer::new(lisp_session(), options(), 20);
        assert_eq!(viewer.handle_key(Key::char('z')), None);
        assert!(viewer.is_running());
        viewer.handle_key(Key::ctlx_ctrl('c'));
        assert!(!viewer.is_running());
    }

    #[test]
    fn test_custom_toggle_key() {
        let opts = ViewerOptions {
            toggle_key: Key::ctlx('h'),
            ..options()
        };
        let mut viewer = Viewer::new(lisp_session(), opts, 20);
        assert_eq!(viewer.handle_key(Key::ctlc('h')), None);
        viewer.handle_key(Key::ctlx('h'));
        assert!(viewer.mode().mode().is_hidden());
    }
}
