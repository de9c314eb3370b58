pub mod buffer;

use buffer::TextBuffer;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::keys::KeySpec;

// ── Vim modes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VimMode {
    #[default]
    Normal,
    Insert,
    Visual,
    /// Overwrite mode entered with `R`: typed characters replace the
    /// character under the cursor instead of being inserted.
    Replace,
}

impl VimMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
            Self::Replace => "REPLACE",
        }
    }

    /// One-letter form used by compact mode indicators.
    pub fn initial(&self) -> char {
        match self {
            Self::Normal => 'N',
            Self::Insert => 'I',
            Self::Visual => 'V',
            Self::Replace => 'R',
        }
    }
}

// ── Register (yank slot) ─────────────────────────────────────────────

/// Single unnamed register. Every yank or line delete overwrites it.
#[derive(Debug, Clone, Default)]
pub struct Register {
    pub content: String,
}

impl Register {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// ── Editor action result ─────────────────────────────────────────────

/// Actions that the editor can request from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Key was consumed, no external action needed.
    None,
    /// Mode changed (for parent to update status display).
    ModeChanged(VimMode),
    /// `:q` was entered; the parent should submit the buffer.
    Submit,
}

// ── Key parse state ──────────────────────────────────────────────────

/// First key of a two-keystroke Normal-mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCommand {
    /// `d`, completed by a second `d`.
    Delete,
    /// `y`, completed by a second `y`.
    Yank,
    /// `:`, completed by `q`.
    Command,
}

impl PendingCommand {
    fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Yank => 'y',
            Self::Command => ':',
        }
    }
}

/// Read-only view of the editor handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct EditorSnapshot<'a> {
    pub lines: &'a [String],
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub mode: VimMode,
    pub visual_anchor: Option<(usize, usize)>,
    pub register_filled: bool,
    pub pending: Option<char>,
    /// Placeholder hint, present only until the first edit.
    pub placeholder: Option<&'a str>,
}

// ── VimEditor ────────────────────────────────────────────────────────

pub struct VimEditor {
    pub buffer: TextBuffer,
    pub mode: VimMode,
    register: Register,
    pending: Option<PendingCommand>,
    /// Anchor position recorded when Visual mode was entered.
    visual_anchor: Option<(usize, usize)>,
    placeholder: Option<String>,
    /// Characters overwritten in the current Replace run, restored by
    /// Backspace. `None` marks a character that was appended.
    replaced: Vec<Option<char>>,
    newline_key: KeySpec,
    /// Bumped on every text mutation.
    revision: u64,
}

impl Default for VimEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl VimEditor {
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            mode: VimMode::Normal,
            register: Register::default(),
            pending: None,
            visual_anchor: None,
            placeholder: None,
            replaced: Vec::new(),
            newline_key: KeySpec::ctrl('j'),
            revision: 0,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.buffer = TextBuffer::from_text(text);
        editor
    }

    /// An empty editor that shows `placeholder` until the first edit.
    pub fn with_placeholder(placeholder: &str) -> Self {
        let mut editor = Self::new();
        if !placeholder.is_empty() {
            editor.placeholder = Some(placeholder.to_string());
        }
        editor
    }

    /// Key that splits the line in Insert/Replace mode besides Enter.
    pub fn set_newline_key(&mut self, key: KeySpec) {
        self.newline_key = key;
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn register(&self) -> &str {
        &self.register.content
    }

    pub fn visual_anchor(&self) -> Option<(usize, usize)> {
        self.visual_anchor
    }

    pub fn pending_key(&self) -> Option<char> {
        self.pending.map(PendingCommand::key)
    }

    pub fn placeholder_active(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> EditorSnapshot<'_> {
        EditorSnapshot {
            lines: &self.buffer.lines,
            cursor_row: self.buffer.cursor_row,
            cursor_col: self.buffer.cursor_col,
            mode: self.mode,
            visual_anchor: self.visual_anchor,
            register_filled: !self.register.is_empty(),
            pending: self.pending_key(),
            placeholder: self.placeholder.as_deref(),
        }
    }

    /// Called before every text mutation. Drops the placeholder so it
    /// never becomes part of the edited content.
    fn begin_edit(&mut self) {
        if self.placeholder.take().is_some() {
            log::debug!("placeholder cleared by first edit");
            self.buffer = TextBuffer::new();
        }
        self.revision += 1;
    }

    fn set_mode(&mut self, mode: VimMode) -> EditorAction {
        log::debug!("mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.replaced.clear();
        EditorAction::ModeChanged(mode)
    }

    // ── Key handling ─────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        let action = match self.mode {
            VimMode::Normal => self.handle_normal_key(key),
            VimMode::Insert => self.handle_insert_key(key),
            VimMode::Replace => self.handle_replace_key(key),
            VimMode::Visual => self.handle_visual_key(key),
        };
        debug_assert!(self.buffer.line_count() >= 1);
        debug_assert!(self.buffer.cursor_row < self.buffer.line_count());
        debug_assert!(self.buffer.cursor_col <= self.buffer.current_line_len());
        action
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> EditorAction {
        if let Some(pending) = self.pending.take() {
            return self.handle_pending(pending, key);
        }

        if self.handle_motion(key) {
            return EditorAction::None;
        }

        let Some(c) = plain_char(&key) else {
            return EditorAction::None;
        };

        match c {
            'x' => {
                if self.buffer.cursor_col < self.buffer.current_line_len() {
                    self.begin_edit();
                    self.buffer.delete_char_in_line();
                }
                EditorAction::None
            }
            'd' => {
                self.pending = Some(PendingCommand::Delete);
                EditorAction::None
            }
            'y' => {
                self.pending = Some(PendingCommand::Yank);
                EditorAction::None
            }
            ':' => {
                self.pending = Some(PendingCommand::Command);
                EditorAction::None
            }
            'p' => {
                self.paste_below();
                EditorAction::None
            }

            // Mode entry
            'i' => self.set_mode(VimMode::Insert),
            'a' => {
                self.buffer.cursor_right();
                self.set_mode(VimMode::Insert)
            }
            'o' => {
                self.begin_edit();
                self.buffer.open_line_below();
                self.set_mode(VimMode::Insert)
            }
            'R' => self.set_mode(VimMode::Replace),
            'v' => {
                self.visual_anchor = Some((self.buffer.cursor_row, self.buffer.cursor_col));
                self.set_mode(VimMode::Visual)
            }
            _ => EditorAction::None,
        }
    }

    /// Second key of `dd`, `yy` or `:q`. Anything else drops the prefix.
    fn handle_pending(&mut self, pending: PendingCommand, key: KeyEvent) -> EditorAction {
        match (pending, plain_char(&key)) {
            (PendingCommand::Delete, Some('d')) => {
                self.delete_current_line();
                EditorAction::None
            }
            (PendingCommand::Yank, Some('y')) => {
                self.yank_current_line();
                EditorAction::None
            }
            (PendingCommand::Command, Some('q')) => {
                log::debug!(":q entered");
                EditorAction::Submit
            }
            _ => EditorAction::None,
        }
    }

    /// Non-wrapping cursor motions shared by Normal and Visual mode.
    /// Returns whether the key was a motion.
    fn handle_motion(&mut self, key: KeyEvent) -> bool {
        match (key.code, plain_char(&key)) {
            (KeyCode::Left, _) | (_, Some('h')) => self.buffer.cursor_left(),
            (KeyCode::Right, _) | (_, Some('l')) => self.buffer.cursor_right(),
            (KeyCode::Down, _) | (_, Some('j')) => self.buffer.cursor_down(),
            (KeyCode::Up, _) | (_, Some('k')) => self.buffer.cursor_up(),
            (KeyCode::Home, _) | (_, Some('0')) => self.buffer.cursor_home(),
            (KeyCode::End, _) | (_, Some('$')) => self.buffer.cursor_end(),
            _ => return false,
        }
        true
    }

    // ── Insert mode ──────────────────────────────────────────────────

    fn handle_insert_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.newline_key.matches(&key) {
            self.begin_edit();
            self.buffer.insert_newline();
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => self.leave_typing_mode(),
            KeyCode::Enter => {
                self.begin_edit();
                self.buffer.insert_newline();
                EditorAction::None
            }
            KeyCode::Backspace => {
                if self.buffer.cursor_col > 0 || self.buffer.cursor_row > 0 {
                    self.begin_edit();
                    self.buffer.backspace();
                }
                EditorAction::None
            }
            KeyCode::Delete => {
                if self.buffer.cursor_col < self.buffer.current_line_len()
                    || !self.buffer.on_last_line()
                {
                    self.begin_edit();
                    self.buffer.delete_char_at_cursor();
                }
                EditorAction::None
            }
            _ => {
                if self.handle_typing_motion(key) {
                    return EditorAction::None;
                }
                if let Some(c) = plain_char(&key) {
                    self.begin_edit();
                    self.buffer.insert_char(c);
                }
                EditorAction::None
            }
        }
    }

    /// Arrow keys in Insert/Replace mode; horizontal moves cross line
    /// boundaries here, unlike `h`/`l` in Normal mode.
    fn handle_typing_motion(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.buffer.cursor_left_wrapping(),
            KeyCode::Right => self.buffer.cursor_right_wrapping(),
            KeyCode::Up => self.buffer.cursor_up(),
            KeyCode::Down => self.buffer.cursor_down(),
            KeyCode::Home => self.buffer.cursor_home(),
            KeyCode::End => self.buffer.cursor_end(),
            _ => return false,
        }
        true
    }

    fn leave_typing_mode(&mut self) -> EditorAction {
        // Move cursor back one (vim convention)
        if self.buffer.cursor_col > 0 {
            self.buffer.cursor_left();
        }
        self.set_mode(VimMode::Normal)
    }

    // ── Replace mode ─────────────────────────────────────────────────

    fn handle_replace_key(&mut self, key: KeyEvent) -> EditorAction {
        if self.newline_key.matches(&key) || key.code == KeyCode::Enter {
            self.begin_edit();
            self.buffer.insert_newline();
            self.replaced.clear();
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => self.leave_typing_mode(),
            KeyCode::Backspace => {
                if let Some(original) = self.replaced.pop() {
                    self.begin_edit();
                    self.buffer.cursor_left();
                    self.buffer.delete_char_in_line();
                    if let Some(c) = original {
                        self.buffer.insert_char(c);
                        self.buffer.cursor_left();
                    }
                } else {
                    self.buffer.cursor_left();
                }
                EditorAction::None
            }
            KeyCode::Delete => {
                self.begin_edit();
                self.buffer.delete_char_at_cursor();
                self.replaced.clear();
                EditorAction::None
            }
            _ => {
                if self.handle_typing_motion(key) {
                    self.replaced.clear();
                } else if let Some(c) = plain_char(&key) {
                    self.begin_edit();
                    let original = self.buffer.overwrite_char(c);
                    self.replaced.push(original);
                }
                EditorAction::None
            }
        }
    }

    // ── Visual mode ──────────────────────────────────────────────────

    /// Visual mode works at line granularity: `d`/`y` act on the line the
    /// cursor is on, whatever the anchor.
    fn handle_visual_key(&mut self, key: KeyEvent) -> EditorAction {
        if key.code == KeyCode::Esc {
            self.visual_anchor = None;
            return self.set_mode(VimMode::Normal);
        }

        if self.handle_motion(key) {
            return EditorAction::None;
        }

        match plain_char(&key) {
            Some('d') => {
                self.delete_current_line();
                self.visual_anchor = None;
                self.set_mode(VimMode::Normal)
            }
            Some('y') => {
                self.yank_current_line();
                self.visual_anchor = None;
                self.set_mode(VimMode::Normal)
            }
            _ => EditorAction::None,
        }
    }

    // ── Line operations ──────────────────────────────────────────────

    fn delete_current_line(&mut self) {
        self.begin_edit();
        let deleted = self.buffer.delete_line();
        self.register = Register { content: deleted };
    }

    fn yank_current_line(&mut self) {
        let line = self.buffer.current_line().to_string();
        self.register = Register { content: line };
    }

    // ── Paste ────────────────────────────────────────────────────────

    fn paste_below(&mut self) {
        if self.register.is_empty() {
            return;
        }
        self.begin_edit();
        self.buffer.insert_line_below(self.register.content.clone());
    }
}

/// The character of a key press that carries no Control/Alt modifier.
fn plain_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            Some(c)
        }
        _ => None,
    }
}
