//! Window representation - a viewport into the session's buffer

use crate::companion::Pos;

/// The visible part of a buffer and the cursor within it
#[derive(Debug)]
pub struct Window {
    /// First visible line in the window
    top_line: usize,
    /// Cursor line position (0-indexed)
    cursor_line: usize,
    /// Cursor column position (byte offset within line)
    cursor_col: usize,
    /// Number of text rows in window (excluding mode line)
    height: u16,
    /// Goal column for vertical movement
    goal_col: usize,
}

impl Window {
    /// Create a window showing the top of the buffer
    pub fn new(height: u16) -> Self {
        Self {
            top_line: 0,
            cursor_line: 0,
            cursor_col: 0,
            height,
            goal_col: 0,
        }
    }

    /// Get the top visible line
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// Set the top visible line
    pub fn set_top_line(&mut self, line: usize) {
        self.top_line = line;
    }

    /// Get cursor line
    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    /// Get cursor column (byte offset)
    pub fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    /// Cursor as a buffer position
    pub fn cursor(&self) -> Pos {
        Pos::new(self.cursor_line, self.cursor_col)
    }

    /// Set cursor position
    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor_line = line;
        self.cursor_col = col;
    }

    /// Get the goal column for vertical movement
    pub fn goal_col(&self) -> usize {
        self.goal_col
    }

    /// Set the goal column
    pub fn set_goal_col(&mut self, col: usize) {
        self.goal_col = col;
    }

    /// Get window height in rows
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Set window height
    pub fn set_height(&mut self, height: u16) {
        self.height = height.max(1);
        self.ensure_cursor_visible();
    }

    /// Ensure cursor is visible, adjusting top_line if needed
    pub fn ensure_cursor_visible(&mut self) {
        if self.cursor_line < self.top_line {
            self.top_line = self.cursor_line;
        } else if self.cursor_line >= self.top_line + self.height as usize {
            self.top_line = self.cursor_line + 1 - self.height as usize;
        }
    }

    /// Scroll down by n lines
    pub fn scroll_down(&mut self, n: usize, max_line: usize) {
        let new_top = self.top_line.saturating_add(n);
        self.top_line = new_top.min(max_line.saturating_sub(1));
        // Move cursor to stay in view
        if self.cursor_line < self.top_line {
            self.cursor_line = self.top_line;
        }
    }

    /// Scroll up by n lines
    pub fn scroll_up(&mut self, n: usize) {
        self.top_line = self.top_line.saturating_sub(n);
        // Move cursor to stay in view
        let bottom = self.top_line + self.height as usize - 1;
        if self.cursor_line > bottom {
            self.cursor_line = bottom;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_cursor_visible() {
        let mut window = Window::new(10);
        window.set_cursor(25, 0);
        window.ensure_cursor_visible();
        assert_eq!(window.top_line(), 16);

        window.set_cursor(3, 0);
        window.ensure_cursor_visible();
        assert_eq!(window.top_line(), 3);
    }

    #[test]
    fn test_scroll_keeps_cursor_in_view() {
        let mut window = Window::new(10);
        window.scroll_down(8, 100);
        assert_eq!(window.top_line(), 8);
        assert_eq!(window.cursor(), Pos::new(8, 0));

        window.scroll_down(500, 100);
        assert_eq!(window.top_line(), 99);

        window.scroll_up(95);
        assert_eq!(window.top_line(), 4);
        assert_eq!(window.cursor_line(), 13);
    }
}
