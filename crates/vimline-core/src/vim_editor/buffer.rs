/// A multi-line text buffer with a 2D cursor.
///
/// Lines are stored as `Vec<String>`, where each string is one line of text
/// (without trailing newline). The cursor is tracked as (row, col) where col
/// is a byte offset into the current line, always on a char boundary. The
/// column may equal the line length ("after the last character").
///
/// The buffer never holds zero lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// Create a buffer from a string. The cursor starts at (0, 0).
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_lines(text),
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// Get the full text as a single string with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get the current line.
    pub fn current_line(&self) -> &str {
        &self.lines[self.cursor_row]
    }

    /// Get the length (in bytes) of the current line.
    pub fn current_line_len(&self) -> usize {
        self.lines[self.cursor_row].len()
    }

    /// Whether this is the last line of the buffer.
    pub fn on_last_line(&self) -> bool {
        self.cursor_row + 1 == self.lines.len()
    }

    /// Pull the cursor back inside the buffer after a mutation.
    pub fn clamp_cursor(&mut self) {
        assert!(!self.lines.is_empty(), "text buffer lost its last line");
        if self.cursor_row >= self.lines.len() {
            self.cursor_row = self.lines.len() - 1;
        }
        self.cursor_col = snap_to_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
    }

    // ── Basic cursor movement ────────────────────────────────────────

    /// Move cursor left by one character. Stops at column 0.
    pub fn cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = prev_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Move cursor right by one character. Stops at the end of the line.
    pub fn cursor_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col = next_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Move left, wrapping to the end of the previous line at column 0.
    pub fn cursor_left_wrapping(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_left();
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    /// Move right, wrapping to column 0 of the next line at end-of-line.
    pub fn cursor_right_wrapping(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_right();
        } else if !self.on_last_line() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    /// Move cursor up by one line, clamping the column to the target line.
    pub fn cursor_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = snap_to_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Move cursor down by one line, clamping the column to the target line.
    pub fn cursor_down(&mut self) {
        if !self.on_last_line() {
            self.cursor_row += 1;
            self.cursor_col = snap_to_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
        }
    }

    /// Move cursor to the beginning of the current line.
    pub fn cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    /// Move cursor past the last character of the current line.
    pub fn cursor_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    /// Move to the end of the last line.
    pub fn goto_end(&mut self) {
        self.cursor_row = self.lines.len() - 1;
        self.cursor_col = self.current_line_len();
    }

    // ── Insert operations ────────────────────────────────────────────

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.lines[self.cursor_row].insert(self.cursor_col, c);
        self.cursor_col += c.len_utf8();
    }

    /// Insert a newline at the cursor position, splitting the current line.
    pub fn insert_newline(&mut self) {
        let after = self.lines[self.cursor_row].split_off(self.cursor_col);
        self.lines.insert(self.cursor_row + 1, after);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    /// Delete the character before the cursor (backspace).
    /// At column 0 the current line is joined onto the previous one.
    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = prev_char_boundary(&self.lines[self.cursor_row], self.cursor_col);
            self.lines[self.cursor_row].remove(self.cursor_col);
        } else if self.cursor_row > 0 {
            let current = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.lines[self.cursor_row].len();
            self.lines[self.cursor_row].push_str(&current);
        }
    }

    /// Delete the character at the cursor, or join the next line when the
    /// cursor sits at end-of-line.
    pub fn delete_char_at_cursor(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.lines[self.cursor_row].remove(self.cursor_col);
        } else if !self.on_last_line() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
        }
    }

    /// Delete the character at the cursor without ever joining lines ('x').
    pub fn delete_char_in_line(&mut self) -> Option<char> {
        if self.cursor_col < self.current_line_len() {
            Some(self.lines[self.cursor_row].remove(self.cursor_col))
        } else {
            None
        }
    }

    /// Overwrite the character under the cursor with `c` and advance.
    /// At end-of-line `c` is appended. Returns the overwritten character.
    pub fn overwrite_char(&mut self, c: char) -> Option<char> {
        let old = self.delete_char_in_line();
        self.insert_char(c);
        old
    }

    // ── Line operations ──────────────────────────────────────────────

    /// Delete the current line and return its content.
    ///
    /// The only line of the buffer is cleared rather than removed. The
    /// cursor lands on column 0 of whichever line now occupies the row.
    pub fn delete_line(&mut self) -> String {
        let deleted = if self.lines.len() == 1 {
            std::mem::take(&mut self.lines[0])
        } else {
            self.lines.remove(self.cursor_row)
        };
        self.cursor_col = 0;
        self.clamp_cursor();
        deleted
    }

    /// Insert a line below the current line and move cursor there.
    pub fn open_line_below(&mut self) {
        self.insert_line_below(String::new());
    }

    /// Insert `line` below the current row; cursor moves to its start.
    pub fn insert_line_below(&mut self, line: String) {
        self.lines.insert(self.cursor_row + 1, line);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }
}

/// Split text into buffer lines. Always yields at least one line, and a
/// trailing newline yields a trailing empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Snap a byte offset to the nearest char boundary at or before it,
/// clamped to the string length.
pub(crate) fn snap_to_char_boundary(s: &str, target: usize) -> usize {
    if target >= s.len() {
        return s.len();
    }
    (0..=target).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

fn prev_char_boundary(s: &str, col: usize) -> usize {
    s[..col]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(s: &str, col: usize) -> usize {
    s[col..]
        .chars()
        .next()
        .map(|c| col + c.len_utf8())
        .unwrap_or(s.len())
}
