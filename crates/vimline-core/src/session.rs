//! One editing session: an editor plus the keys, validator and display
//! settings that surround it, and the blocking loop that drives it.

use std::collections::VecDeque;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::Backend};

use crate::error::{Error, Result};
use crate::keys::{KeySpec, parse_keys};
use crate::theme::{BoxStyle, Theme};
use crate::ui::{self, ModeLabel, SessionView};
use crate::validation::Validator;
use crate::vim_editor::{EditorAction, VimEditor, VimMode};

// ── Configuration ────────────────────────────────────────────────────

/// Settings for a [`Session`]. Built with chained setters:
///
/// ```
/// use vimline_core::{EditorConfig, validation};
///
/// let config = EditorConfig::new()
///     .title("Email")
///     .placeholder("you@example.com")
///     .validator(validation::email().required());
/// ```
pub struct EditorConfig {
    pub initial_text: String,
    pub placeholder_text: String,
    pub title: String,
    pub submit_key: String,
    pub newline_key: String,
    pub cancel_keys: Vec<String>,
    pub show_line_numbers: bool,
    pub show_status: bool,
    pub mode_label: ModeLabel,
    /// Drawn in place of every character, e.g. `'*'` for passwords.
    pub mask: Option<char>,
    pub box_style: BoxStyle,
    pub theme: Theme,
    pub validator: Option<Box<dyn Validator>>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_text: String::new(),
            placeholder_text: String::new(),
            title: String::new(),
            submit_key: "c-m".into(),
            newline_key: "c-j".into(),
            cancel_keys: vec!["c-c".into(), "c-d".into()],
            show_line_numbers: false,
            show_status: true,
            mode_label: ModeLabel::default(),
            mask: None,
            box_style: BoxStyle::default(),
            theme: Theme::default(),
            validator: None,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_text(mut self, text: &str) -> Self {
        self.initial_text = text.to_string();
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder_text = text.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn submit_key(mut self, key: &str) -> Self {
        self.submit_key = key.to_string();
        self
    }

    pub fn newline_key(mut self, key: &str) -> Self {
        self.newline_key = key.to_string();
        self
    }

    pub fn cancel_keys<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.cancel_keys = keys.iter().map(|k| k.as_ref().to_string()).collect();
        self
    }

    pub fn line_numbers(mut self, show: bool) -> Self {
        self.show_line_numbers = show;
        self
    }

    pub fn status(mut self, show: bool) -> Self {
        self.show_status = show;
        self
    }

    pub fn mode_label(mut self, label: ModeLabel) -> Self {
        self.mode_label = label;
        self
    }

    pub fn mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn box_style(mut self, style: BoxStyle) -> Self {
        self.box_style = style;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }
}

// ── Session state ────────────────────────────────────────────────────

/// Validation status shown by the box border.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationState {
    /// Not validated since the last edit.
    #[default]
    Active,
    Valid,
    Invalid(String),
}

impl ValidationState {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Active => None,
            Self::Valid => Some("Valid"),
            Self::Invalid(message) => Some(message),
        }
    }
}

/// Outcome of processing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Submitted(String),
    Cancelled,
}

/// Display settings copied out of [`EditorConfig`].
struct DisplayOptions {
    title: String,
    show_line_numbers: bool,
    show_status: bool,
    mode_label: ModeLabel,
    mask: Option<char>,
    box_style: BoxStyle,
    theme: Theme,
}

pub struct Session {
    editor: VimEditor,
    submit_key: KeySpec,
    cancel_keys: Vec<KeySpec>,
    validator: Option<Box<dyn Validator>>,
    validation: ValidationState,
    /// Editor revision at the last failed validation.
    invalid_at: u64,
    display: DisplayOptions,
}

impl Session {
    /// Build a session, failing on unknown key identifiers.
    pub fn new(config: EditorConfig) -> Result<Self> {
        let submit_key: KeySpec = config.submit_key.parse()?;
        let newline_key: KeySpec = config.newline_key.parse()?;
        let cancel_keys = parse_keys(&config.cancel_keys)?;

        let mut editor = if config.initial_text.is_empty() {
            VimEditor::with_placeholder(&config.placeholder_text)
        } else {
            let mut editor = VimEditor::from_text(&config.initial_text);
            editor.buffer.goto_end();
            editor
        };
        editor.set_newline_key(newline_key);

        Ok(Self {
            editor,
            submit_key,
            cancel_keys,
            validator: config.validator,
            validation: ValidationState::Active,
            invalid_at: 0,
            display: DisplayOptions {
                title: config.title,
                show_line_numbers: config.show_line_numbers,
                show_status: config.show_status,
                mode_label: config.mode_label,
                mask: config.mask,
                box_style: config.box_style,
                theme: config.theme,
            },
        })
    }

    pub fn editor(&self) -> &VimEditor {
        &self.editor
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            editor: self.editor.snapshot(),
            title: &self.display.title,
            validation: &self.validation,
            show_line_numbers: self.display.show_line_numbers,
            show_status: self.display.show_status,
            mode_label: self.display.mode_label,
            mask: self.display.mask,
            box_style: self.display.box_style,
            theme: &self.display.theme,
        }
    }

    /// Process one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> SessionStatus {
        if self.cancel_keys.iter().any(|k| k.matches(&key)) {
            log::debug!("session cancelled by {key:?}");
            return SessionStatus::Cancelled;
        }

        // A pending `d`/`y`/`:` takes the next key, which only drops it
        if self.editor.mode == VimMode::Normal
            && self.editor.pending_key().is_none()
            && self.submit_key.matches(&key)
        {
            return self.submit();
        }

        let action = self.editor.handle_key(key);

        if matches!(self.validation, ValidationState::Invalid(_))
            && self.editor.revision() != self.invalid_at
        {
            self.validation = ValidationState::Active;
        }

        match action {
            EditorAction::Submit => self.submit(),
            EditorAction::None | EditorAction::ModeChanged(_) => SessionStatus::Running,
        }
    }

    fn submit(&mut self) -> SessionStatus {
        let text = self.editor.text();
        if let Some(validator) = &self.validator {
            let result = validator.validate(&text);
            if !result.is_valid {
                log::warn!("submit rejected: {}", result.message);
                self.validation = ValidationState::Invalid(result.message);
                self.invalid_at = self.editor.revision();
                return SessionStatus::Running;
            }
            log::info!("input validated");
            self.validation = ValidationState::Valid;
        }
        log::debug!("submitted {} line(s)", self.editor.buffer.line_count());
        SessionStatus::Submitted(text)
    }

    /// Draw, read a key, process it, repeat. Returns the text on submit and
    /// `None` on cancel or when the key source runs dry.
    pub fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        keys: &mut impl KeySource,
    ) -> Result<Option<String>> {
        loop {
            self.draw(terminal)?;

            let Some(event) = keys.next_event()? else {
                log::debug!("key source exhausted");
                return Ok(None);
            };
            let Event::Key(key) = event else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match self.handle_key(key) {
                SessionStatus::Running => {}
                SessionStatus::Submitted(text) => {
                    self.draw(terminal)?;
                    return Ok(Some(text));
                }
                SessionStatus::Cancelled => return Ok(None),
            }
        }
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        let view = self.view();
        terminal
            .draw(|frame| ui::render(frame, &view))
            .map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(())
    }
}

// ── Key sources ──────────────────────────────────────────────────────

/// Where the run loop reads input from.
pub trait KeySource {
    /// Block for the next event. `None` means no more input will arrive.
    fn next_event(&mut self) -> Result<Option<Event>>;
}

/// Reads events from the terminal via crossterm.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(Some(event::read()?))
    }
}

/// Scripted input, mainly for tests.
impl KeySource for VecDeque<KeyEvent> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.pop_front().map(Event::Key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(session: &mut Session, s: &str) {
        for c in s.chars() {
            assert_eq!(session.handle_key(key(c)), SessionStatus::Running);
        }
    }

    fn script(events: Vec<KeyEvent>) -> VecDeque<KeyEvent> {
        events.into()
    }

    #[test]
    fn test_submit_from_normal_mode() {
        let mut session = Session::new(EditorConfig::new().initial_text("hello")).unwrap();
        assert_eq!(
            session.handle_key(code(KeyCode::Enter)),
            SessionStatus::Submitted("hello".into())
        );
    }

    #[test]
    fn test_enter_in_insert_mode_splits() {
        let mut session = Session::new(EditorConfig::new()).unwrap();
        type_str(&mut session, "iab");
        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        type_str(&mut session, "c");
        session.handle_key(code(KeyCode::Esc));
        assert_eq!(
            session.handle_key(code(KeyCode::Enter)),
            SessionStatus::Submitted("ab\nc".into())
        );
    }

    #[test]
    fn test_cancel_in_any_mode() {
        let mut session = Session::new(EditorConfig::new()).unwrap();
        session.handle_key(key('i'));
        assert_eq!(session.handle_key(ctrl('c')), SessionStatus::Cancelled);

        let mut session = Session::new(EditorConfig::new()).unwrap();
        assert_eq!(session.handle_key(ctrl('d')), SessionStatus::Cancelled);
    }

    #[test]
    fn test_colon_q_submits() {
        let mut session = Session::new(EditorConfig::new().initial_text("x")).unwrap();
        session.handle_key(key(':'));
        assert_eq!(session.handle_key(key('q')), SessionStatus::Submitted("x".into()));
    }

    #[test]
    fn test_initial_cursor_at_end() {
        let session = Session::new(EditorConfig::new().initial_text("ab\ncde")).unwrap();
        let buffer = &session.editor().buffer;
        assert_eq!((buffer.cursor_row, buffer.cursor_col), (1, 3));
    }

    #[test]
    fn test_placeholder_submits_empty() {
        let mut session = Session::new(EditorConfig::new().placeholder("name")).unwrap();
        assert_eq!(
            session.handle_key(code(KeyCode::Enter)),
            SessionStatus::Submitted(String::new())
        );
    }

    #[test]
    fn test_custom_submit_key() {
        let mut session =
            Session::new(EditorConfig::new().initial_text("a").submit_key("c-s")).unwrap();
        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        assert_eq!(session.handle_key(ctrl('s')), SessionStatus::Submitted("a".into()));
    }

    #[test]
    fn test_unknown_key_name_rejected() {
        let result = Session::new(EditorConfig::new().cancel_keys(&["c-c", "hyper-x"]));
        assert!(matches!(result, Err(Error::UnknownKey(name)) if name == "hyper-x"));
    }

    #[test]
    fn test_validation_veto_keeps_buffer() {
        let config = EditorConfig::new().validator(validation::custom(|_: &str| (false, "never")));
        let mut session = Session::new(config).unwrap();
        type_str(&mut session, "iabc");
        session.handle_key(code(KeyCode::Esc));

        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        assert_eq!(session.validation(), &ValidationState::Invalid("never".into()));
        assert_eq!(session.editor().text(), "abc");
        assert_eq!(session.editor().mode, VimMode::Normal);

        // Repeated submits just update the message.
        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        assert_eq!(session.editor().text(), "abc");
    }

    #[test]
    fn test_edit_after_invalid_resets_state() {
        let config = EditorConfig::new().validator(validation::integer());
        let mut session = Session::new(config).unwrap();
        type_str(&mut session, "ix");
        session.handle_key(code(KeyCode::Esc));
        session.handle_key(code(KeyCode::Enter));
        assert!(matches!(session.validation(), ValidationState::Invalid(_)));

        // Motions keep the message.
        session.handle_key(key('h'));
        assert!(matches!(session.validation(), ValidationState::Invalid(_)));

        session.handle_key(key('x'));
        assert_eq!(session.validation(), &ValidationState::Active);
        type_str(&mut session, "i42");
        session.handle_key(code(KeyCode::Esc));
        assert_eq!(
            session.handle_key(code(KeyCode::Enter)),
            SessionStatus::Submitted("42".into())
        );
        assert_eq!(session.validation(), &ValidationState::Valid);
    }

    #[test]
    fn test_submit_key_drops_pending_prefix() {
        let config = EditorConfig::new()
            .initial_text("keep\nme")
            .validator(validation::custom(|_: &str| (false, "never")));
        let mut session = Session::new(config).unwrap();

        session.handle_key(key('d'));
        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        assert_eq!(session.editor().pending_key(), None);
        assert_eq!(session.validation(), &ValidationState::Active);

        session.handle_key(key('d'));
        assert_eq!(session.editor().text(), "keep\nme");
        assert_eq!(session.editor().pending_key(), Some('d'));
    }

    #[test]
    fn test_rejected_submit_leaves_no_prefix() {
        let config = EditorConfig::new()
            .initial_text("keep\nme")
            .validator(validation::custom(|_: &str| (false, "never")));
        let mut session = Session::new(config).unwrap();

        session.handle_key(key('d'));
        session.handle_key(code(KeyCode::Enter));
        assert_eq!(session.handle_key(code(KeyCode::Enter)), SessionStatus::Running);
        assert_eq!(session.validation(), &ValidationState::Invalid("never".into()));

        session.handle_key(key('d'));
        assert_eq!(session.editor().text(), "keep\nme");
    }

    #[test]
    fn test_run_until_submit() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut session = Session::new(EditorConfig::new().title("Name")).unwrap();
        let mut keys = script(vec![
            key('i'),
            key('h'),
            key('i'),
            code(KeyCode::Esc),
            code(KeyCode::Enter),
        ]);
        let result = session.run(&mut terminal, &mut keys).unwrap();
        assert_eq!(result, Some("hi".into()));
    }

    #[test]
    fn test_run_cancel_leaves_initial_text() {
        let initial = String::from("keep me");
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut session = Session::new(EditorConfig::new().initial_text(&initial)).unwrap();
        let mut keys = script(vec![key('d'), key('d'), ctrl('c')]);
        assert_eq!(session.run(&mut terminal, &mut keys).unwrap(), None);
        assert_eq!(initial, "keep me");
    }

    #[test]
    fn test_run_exhausted_source_cancels() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut session = Session::new(EditorConfig::new()).unwrap();
        let mut keys = script(vec![key('i'), key('a')]);
        assert_eq!(session.run(&mut terminal, &mut keys).unwrap(), None);
    }
}
