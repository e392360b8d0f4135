//! Display rendering

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute},
};
use unicode_width::UnicodeWidthChar;

use crate::companion::Pos;
use crate::error::Result;
use crate::session::Session;
use crate::syntax::Span;
use crate::terminal::{queue_style, Terminal};
use crate::window::Window;

/// Display state
pub struct Display {
    /// Whether a full redraw is needed
    needs_redraw: bool,
    /// Message to show in minibuffer (bottom line)
    message: Option<String>,
    /// Whether to show line numbers
    pub show_line_numbers: bool,
}

impl Display {
    pub fn new() -> Self {
        Self {
            needs_redraw: true,
            message: None,
            show_line_numbers: false,
        }
    }

    /// Mark that a full redraw is needed
    pub fn force_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Set a message to display
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    /// Clear the message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Message shown in the minibuffer; the viewer's own wins over the session's
    pub fn message<'a>(&'a self, session: &'a Session) -> Option<&'a str> {
        self.message.as_deref().or(session.current_message())
    }

    /// Render the viewer display
    pub fn render(
        &mut self,
        terminal: &mut Terminal,
        session: &mut Session,
        window: &Window,
        lighter: &str,
    ) -> Result<()> {
        let cols = terminal.cols() as usize;
        let rows = terminal.rows();

        if self.needs_redraw {
            terminal.clear_screen()?;
        }

        self.render_window(terminal, session, window, cols)?;
        let mode_line = mode_line(session, window, lighter, cols);
        terminal.move_cursor(window.height(), 0)?;
        terminal.set_reverse(true)?;
        terminal.write_str(&mode_line)?;
        terminal.set_reverse(false)?;

        // Render minibuffer (message line) at bottom
        terminal.move_cursor(rows.saturating_sub(1), 0)?;
        if let Some(msg) = self.message(session) {
            terminal.write_str(&truncate_to_width(msg, cols))?;
        }
        terminal.clear_to_eol()?;

        self.position_cursor(terminal, session, window)?;
        terminal.set_cursor_visible(true)?;
        terminal.flush()?;

        self.needs_redraw = false;
        Ok(())
    }

    /// Render the visible lines with their resolved styles
    fn render_window(
        &self,
        terminal: &mut Terminal,
        session: &mut Session,
        window: &Window,
        cols: usize,
    ) -> Result<()> {
        let line_count = session.buffer().line_count();
        let lnum_width = line_number_width(self.show_line_numbers, line_count);
        let text_cols = cols.saturating_sub(lnum_width);
        let cursor = window.cursor();

        for row_offset in 0..window.height() {
            let line_idx = window.top_line() + row_offset as usize;
            terminal.move_cursor(row_offset, 0)?;

            if line_idx < line_count {
                if self.show_line_numbers {
                    terminal.set_dim(true)?;
                    terminal.write_str(&format!("{:>width$} ", line_idx + 1, width = lnum_width - 1))?;
                    terminal.set_dim(false)?;
                }
                let spans = session.styled_line(line_idx, cursor);
                let text = session.buffer().line(line_idx).unwrap_or_default();
                let mut out = Vec::new();
                write_styled(&mut out, text, &spans, text_cols)?;
                terminal.write_str(&String::from_utf8_lossy(&out))?;
                terminal.reset_attributes()?;
            } else {
                // Empty line indicator (like vim's ~)
                terminal.set_dim(true)?;
                terminal.write_str("~")?;
                terminal.set_dim(false)?;
            }

            terminal.clear_to_eol()?;
        }

        Ok(())
    }

    /// Position the hardware cursor at the correct location
    fn position_cursor(&self, terminal: &mut Terminal, session: &Session, window: &Window) -> Result<()> {
        let buffer = session.buffer();
        let display_col = buffer
            .line(window.cursor_line())
            .map(|line| display_width(safe_slice_to(line, window.cursor_col())))
            .unwrap_or(0);
        let lnum_width = line_number_width(self.show_line_numbers, buffer.line_count());

        let screen_row = window.cursor_line().saturating_sub(window.top_line()) as u16;
        let max_col = (terminal.cols() as usize).saturating_sub(1);
        let screen_col = (lnum_width + display_col).min(max_col) as u16;

        terminal.move_cursor(screen_row, screen_col)?;
        Ok(())
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// Print the whole buffer to `out` with ANSI styling
pub fn print_buffer<W: Write>(out: &mut W, session: &mut Session, show_line_numbers: bool) -> io::Result<()> {
    let line_count = session.buffer().line_count();
    let lnum_width = line_number_width(show_line_numbers, line_count);
    // No cursor, so no companion overlays
    let nowhere = Pos::new(usize::MAX, 0);

    for line_idx in 0..line_count {
        if show_line_numbers {
            queue!(out, Print(format!("{:>width$} ", line_idx + 1, width = lnum_width - 1)))?;
        }
        let spans = session.styled_line(line_idx, nowhere);
        let text = session.buffer().line(line_idx).unwrap_or_default();
        write_styled(out, text, &spans, usize::MAX)?;
        queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print("\n"))?;
    }
    out.flush()
}

/// Write `text` span by span, stopping at `max_cols` display columns
fn write_styled<W: Write>(out: &mut W, text: &str, spans: &[Span], max_cols: usize) -> io::Result<()> {
    let mut remaining = max_cols;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let piece = truncate_to_width(safe_slice(text, span.start, span.end), remaining);
        remaining -= display_width(&piece);
        queue_style(out, &span.style)?;
        queue!(out, Print(piece))?;
    }
    Ok(())
}

/// Format: `-- paren-hide: name (language) L12 Top ParenHide ---`
fn mode_line(session: &Session, window: &Window, lighter: &str, cols: usize) -> String {
    let buffer = session.buffer();
    let line_count = buffer.line_count();
    let cursor_line = window.cursor_line() + 1;
    let percent = if line_count <= 1 {
        "All".to_string()
    } else if cursor_line == 1 {
        "Top".to_string()
    } else if cursor_line >= line_count {
        "Bot".to_string()
    } else {
        format!("{}%", cursor_line * 100 / line_count)
    };

    let mut text = format!(
        "-- paren-hide: {} ({}) L{} {}",
        buffer.name(),
        session.language().unwrap_or("Fundamental"),
        cursor_line,
        percent
    );
    if !lighter.is_empty() {
        text.push(' ');
        text.push_str(lighter);
    }
    text.push(' ');

    // Pad or truncate to fill width
    let width = display_width(&text);
    if width < cols {
        text.push_str(&"-".repeat(cols - width));
        text
    } else {
        truncate_to_width(&text, cols)
    }
}

/// Calculate width needed for line numbers (including separator)
fn line_number_width(show: bool, line_count: usize) -> usize {
    if !show {
        return 0;
    }
    // Width of largest line number + 1 for separator space
    let digits = if line_count == 0 { 1 } else { (line_count as f64).log10().floor() as usize + 1 };
    digits.max(3) + 1 // minimum 3 digits + space
}

fn display_width(s: &str) -> usize {
    s.chars().map(|ch| UnicodeWidthChar::width(ch).unwrap_or(1)).sum()
}

/// Truncate a string to fit within a display width
fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result
}

/// UTF-8 safe slice from start to end byte offset
fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = find_safe_boundary(s, start, true);
    let end = find_safe_boundary(s, end, false).max(start);
    &s[start..end]
}

/// UTF-8 safe slice from beginning to end byte offset
fn safe_slice_to(s: &str, end: usize) -> &str {
    let end = find_safe_boundary(s, end, false);
    &s[..end]
}

/// Find a safe UTF-8 boundary near the given byte offset
/// If forward is true, search forward; otherwise search backward
fn find_safe_boundary(s: &str, offset: usize, forward: bool) -> usize {
    if offset >= s.len() {
        return s.len();
    }
    if s.is_char_boundary(offset) {
        return offset;
    }

    if forward {
        (offset..=s.len()).find(|&i| s.is_char_boundary(i)).unwrap_or(s.len())
    } else {
        (0..offset).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::face::Theme;
    use crate::syntax::{Style, SyntaxManager};

    fn lisp_session(text: &str) -> Session {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.el");
        std::fs::write(&path, text).unwrap();
        Session::new(Buffer::from_file(&path).unwrap(), &SyntaxManager::new(), Theme::dark())
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("(hello)", 3), "(he");
        assert_eq!(truncate_to_width("日本語", 5), "日本");
        assert_eq!(truncate_to_width("ab", 10), "ab");
    }

    #[test]
    fn test_safe_slice_on_multibyte() {
        let s = "a日b";
        assert_eq!(safe_slice(s, 1, 4), "日");
        assert_eq!(safe_slice(s, 2, 4), "");
        assert_eq!(safe_slice_to(s, 2), "a");
    }

    #[test]
    fn test_line_number_width() {
        assert_eq!(line_number_width(false, 5000), 0);
        assert_eq!(line_number_width(true, 12), 4);
        assert_eq!(line_number_width(true, 12345), 6);
    }

    #[test]
    fn test_write_styled_clips_to_width() {
        let spans = vec![
            Span::new(0, 1, Style::default()),
            Span::new(1, 6, Style::default().with_bold()),
        ];
        let mut out = Vec::new();
        write_styled(&mut out, "(defun", &spans, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("(") && text.contains("de"));
        assert!(!text.contains("def"));
    }

    #[test]
    fn test_mode_line_shows_lighter() {
        let session = lisp_session("(a)\n(b)\n");
        let window = Window::new(10);

        let line = mode_line(&session, &window, "ParenHide[hidden]", 80);
        assert!(line.starts_with("-- paren-hide: demo.el (Emacs Lisp) L1 Top ParenHide[hidden] "));
        assert_eq!(display_width(&line), 80);

        let off = mode_line(&session, &window, "", 80);
        assert!(!off.contains("ParenHide"));
        assert_eq!(mode_line(&session, &window, "", 10).len(), 10);
    }

    #[test]
    fn test_print_buffer_numbers_every_line() {
        let mut session = lisp_session("(a)\n(b)\n");
        let mut out = Vec::new();
        print_buffer(&mut out, &mut session, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  1 "));
        assert!(text.contains("  2 "));
        assert_eq!(text.matches('\n').count(), 2);
    }
}
