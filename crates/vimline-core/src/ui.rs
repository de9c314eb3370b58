use std::str::FromStr;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

use crate::error::Error;
use crate::session::ValidationState;
use crate::theme::{BoxStyle, StateColors, Theme};
use crate::vim_editor::{EditorSnapshot, VimMode};

/// How the current mode is shown on the bottom border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeLabel {
    /// `INSERT`, `VISUAL`, ...
    #[default]
    Full,
    /// `I`, `V`, `R`; Normal mode shows nothing.
    Initial,
    Hidden,
}

impl ModeLabel {
    pub fn text(&self, mode: VimMode) -> String {
        match self {
            Self::Full => mode.label().to_string(),
            Self::Initial if mode == VimMode::Normal => String::new(),
            Self::Initial => mode.initial().to_string(),
            Self::Hidden => String::new(),
        }
    }
}

impl FromStr for ModeLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "initial" => Ok(Self::Initial),
            "hidden" | "none" => Ok(Self::Hidden),
            _ => Err(Error::UnknownName {
                kind: "mode label",
                name: s.to_string(),
            }),
        }
    }
}

/// Everything the renderer needs, borrowed from a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub editor: EditorSnapshot<'a>,
    pub title: &'a str,
    pub validation: &'a ValidationState,
    pub show_line_numbers: bool,
    pub show_status: bool,
    pub mode_label: ModeLabel,
    pub mask: Option<char>,
    pub box_style: BoxStyle,
    pub theme: &'a Theme,
}

impl SessionView<'_> {
    fn state_colors(&self) -> StateColors {
        match self.validation {
            ValidationState::Active => self.theme.active,
            ValidationState::Valid => self.theme.valid,
            ValidationState::Invalid(_) => self.theme.invalid,
        }
    }

    /// Text as drawn: the mask replaces every character.
    fn display_line(&self, line: &str) -> String {
        match self.mask {
            Some(mask) => std::iter::repeat_n(mask, line.chars().count()).collect(),
            None => line.to_string(),
        }
    }
}

const ASCII_BORDER: border::Set = border::Set {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    vertical_left: "|",
    vertical_right: "|",
    horizontal_top: "-",
    horizontal_bottom: "-",
};

fn styled_block<'a>(style: BoxStyle, block: Block<'a>) -> Block<'a> {
    match style {
        BoxStyle::Rounded => block.border_type(BorderType::Rounded),
        BoxStyle::Square => block.border_type(BorderType::Plain),
        BoxStyle::Double => block.border_type(BorderType::Double),
        BoxStyle::Heavy => block.border_type(BorderType::Thick),
        BoxStyle::Ascii => block.border_set(ASCII_BORDER),
    }
}

/// First visible row/column so that `cursor` stays inside a window of `size`.
fn scroll_offset(cursor: usize, size: usize) -> usize {
    if size == 0 {
        0
    } else {
        (cursor + 1).saturating_sub(size)
    }
}

/// Render the editor box and optional status line into the frame.
pub fn render(frame: &mut Frame, view: &SessionView) {
    let area = frame.area();
    let snap = &view.editor;
    let showing_placeholder = snap.placeholder.is_some();
    let line_count = if showing_placeholder {
        1
    } else {
        snap.lines.len()
    };

    let status_height = u16::from(view.show_status);
    let available = area.height.saturating_sub(status_height);
    let box_height = u16::try_from(line_count)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(available);

    let [box_area, status_area] = Layout::vertical([
        Constraint::Length(box_height),
        Constraint::Length(status_height),
    ])
    .areas(area);

    render_box(frame, box_area, view);

    if view.show_status {
        render_status_line(frame, status_area, view);
    }
}

fn render_box(frame: &mut Frame, area: Rect, view: &SessionView) {
    let snap = &view.editor;
    let colors = view.state_colors();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(colors.border);
    block = styled_block(view.box_style, block);

    if !view.title.is_empty() {
        block = block.title(Span::styled(format!(" {} ", view.title), colors.title));
    }
    let mode = view.mode_label.text(snap.mode);
    if !mode.is_empty() {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {mode} "), colors.title)).left_aligned(),
        );
    }
    if let Some(message) = view.validation.message() {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {message} "), colors.message)).right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // ── Gutter ───────────────────────────────────────────────────────
    let digits = snap.lines.len().to_string().len();
    let gutter_width = if view.show_line_numbers {
        (digits + 1) as u16
    } else {
        0
    };
    let [gutter_area, text_area] = Layout::horizontal([
        Constraint::Length(gutter_width.min(inner.width)),
        Constraint::Min(0),
    ])
    .areas(inner);

    let top = scroll_offset(snap.cursor_row, inner.height as usize);
    let top_row = u16::try_from(top).unwrap_or(u16::MAX);

    if view.show_line_numbers {
        let numbers: Vec<Line> = (1..=snap.lines.len())
            .map(|n| Line::styled(format!("{n:>digits$} "), view.theme.line_number))
            .collect();
        frame.render_widget(Paragraph::new(numbers).scroll((top_row, 0)), gutter_area);
    }

    // ── Text ─────────────────────────────────────────────────────────
    if let Some(placeholder) = snap.placeholder {
        frame.render_widget(
            Paragraph::new(Line::styled(placeholder, view.theme.placeholder)),
            text_area,
        );
        frame.set_cursor_position(Position::new(text_area.x, text_area.y));
        return;
    }

    let cursor_line = &snap.lines[snap.cursor_row];
    let cursor_x = view.display_line(&cursor_line[..snap.cursor_col]).width();
    let left = scroll_offset(cursor_x, text_area.width as usize);

    let lines: Vec<Line> = snap
        .lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            let style = if snap.mode == VimMode::Visual && row == snap.cursor_row {
                view.theme.text.patch(view.theme.visual)
            } else {
                view.theme.text
            };
            Line::styled(view.display_line(line), style)
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).scroll((top_row, u16::try_from(left).unwrap_or(u16::MAX))),
        text_area,
    );

    if text_area.width > 0 {
        frame.set_cursor_position(Position::new(
            text_area.x + (cursor_x - left) as u16,
            text_area.y + (snap.cursor_row - top) as u16,
        ));
    }
}

/// Status line text, e.g. `-- INSERT --  Row 2, Col 5  [reg]  d`.
pub fn status_text(snap: &EditorSnapshot) -> String {
    let line = &snap.lines[snap.cursor_row];
    let col = line[..snap.cursor_col].chars().count() + 1;
    let mut text = format!(
        "-- {} --  Row {}, Col {}",
        snap.mode.label(),
        snap.cursor_row + 1,
        col
    );
    if snap.register_filled {
        text.push_str("  [reg]");
    }
    if let Some(pending) = snap.pending {
        text.push_str("  ");
        text.push(pending);
    }
    text
}

fn render_status_line(frame: &mut Frame, area: Rect, view: &SessionView) {
    let bar = Paragraph::new(Line::from(status_text(&view.editor))).style(view.theme.status);
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vim_editor::VimEditor;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend, style::Color};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    struct Fixture {
        editor: VimEditor,
        validation: ValidationState,
        theme: Theme,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            Self {
                editor: VimEditor::from_text(text),
                validation: ValidationState::Active,
                theme: Theme::dark(),
            }
        }

        fn view(&self) -> SessionView<'_> {
            SessionView {
                editor: self.editor.snapshot(),
                title: "Name",
                validation: &self.validation,
                show_line_numbers: false,
                show_status: true,
                mode_label: ModeLabel::Full,
                mask: None,
                box_style: BoxStyle::Rounded,
                theme: &self.theme,
            }
        }
    }

    fn draw(view: &SessionView, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, view)).unwrap();
        terminal
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn test_box_with_title_and_text() {
        let fx = Fixture::new("hello");
        let terminal = draw(&fx.view(), 30, 5);
        assert!(row(&terminal, 0).starts_with("╭ Name ─"));
        assert_eq!(row(&terminal, 1), format!("│hello{}│", " ".repeat(23)));
        assert!(row(&terminal, 2).starts_with("╰ NORMAL ─"));
        assert!(row(&terminal, 3).starts_with("-- NORMAL --  Row 1, Col 1"));
    }

    #[test]
    fn test_border_colour_follows_validation() {
        let mut fx = Fixture::new("abc");
        fx.validation = ValidationState::Invalid("Bad input".into());
        let terminal = draw(&fx.view(), 30, 4);
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(0, 0)].fg, Color::Rgb(0xf8, 0x71, 0x71));
        assert!(row(&terminal, 2).ends_with(" Bad input ╯"));
    }

    #[test]
    fn test_valid_state_message() {
        let mut fx = Fixture::new("abc");
        fx.validation = ValidationState::Valid;
        let terminal = draw(&fx.view(), 30, 4);
        assert!(row(&terminal, 2).ends_with(" Valid ╯"));
        assert_eq!(terminal.backend().buffer()[(0, 0)].fg, Color::Rgb(0x4a, 0xde, 0x80));
    }

    #[test]
    fn test_mask_hides_text() {
        let fx = Fixture::new("secret");
        let view = SessionView {
            mask: Some('*'),
            ..fx.view()
        };
        let terminal = draw(&view, 20, 4);
        assert!(row(&terminal, 1).starts_with("│******  "));
        assert!(!row(&terminal, 1).contains("secret"));
    }

    #[test]
    fn test_placeholder_dimmed() {
        let fx = Fixture {
            editor: VimEditor::with_placeholder("your name"),
            ..Fixture::new("")
        };
        let terminal = draw(&fx.view(), 20, 4);
        assert!(row(&terminal, 1).starts_with("│your name"));
        assert_eq!(terminal.backend().buffer()[(1, 1)].fg, Color::Rgb(0x99, 0x99, 0x99));
    }

    #[test]
    fn test_line_numbers() {
        let fx = Fixture::new("a\nb");
        let view = SessionView {
            show_line_numbers: true,
            ..fx.view()
        };
        let terminal = draw(&view, 12, 5);
        assert!(row(&terminal, 1).starts_with("│1 a"));
        assert!(row(&terminal, 2).starts_with("│2 b"));
    }

    #[test]
    fn test_initial_mode_label() {
        let mut fx = Fixture::new("a");
        let view = SessionView {
            mode_label: ModeLabel::Initial,
            ..fx.view()
        };
        assert!(row(&draw(&view, 12, 4), 2).starts_with("╰──"));

        fx.editor.handle_key(key('i'));
        let view = SessionView {
            mode_label: ModeLabel::Initial,
            ..fx.view()
        };
        assert!(row(&draw(&view, 12, 4), 2).starts_with("╰ I ─"));
    }

    #[test]
    fn test_ascii_box_without_status() {
        let fx = Fixture::new("x");
        let view = SessionView {
            box_style: BoxStyle::Ascii,
            show_status: false,
            ..fx.view()
        };
        let terminal = draw(&view, 10, 4);
        assert!(row(&terminal, 0).starts_with("+ Name -"));
        assert_eq!(row(&terminal, 1), "|x       |");
        assert_eq!(row(&terminal, 3), "          ");
    }

    #[test]
    fn test_cursor_scrolls_into_view() {
        let mut fx = Fixture::new("1\n2\n3\n4\n5");
        for _ in 0..4 {
            fx.editor.handle_key(key('j'));
        }
        // Three rows for the box leaves one visible text row.
        let view = SessionView {
            show_status: false,
            ..fx.view()
        };
        let mut terminal = draw(&view, 10, 3);
        assert!(row(&terminal, 1).starts_with("│5"));
        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(1, 1));
    }

    #[test]
    fn test_box_height_with_more_lines_than_u16() {
        let text = vec!["x"; 65_536].join("\n");
        let fx = Fixture::new(&text);
        let view = SessionView {
            show_status: false,
            ..fx.view()
        };
        let terminal = draw(&view, 10, 4);
        assert!(row(&terminal, 0).starts_with("╭ Name ─"));
        assert!(row(&terminal, 1).starts_with("│x"));
        assert!(row(&terminal, 2).starts_with("│x"));
        assert!(row(&terminal, 3).starts_with("╰"));
    }

    #[test]
    fn test_cursor_tracks_column() {
        let mut fx = Fixture::new("héllo");
        fx.editor.handle_key(key('$'));
        let mut terminal = draw(&fx.view(), 20, 4);
        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(6, 1));
    }

    #[test]
    fn test_status_text() {
        let mut fx = Fixture::new("ab\ncd");
        fx.editor.handle_key(key('y'));
        fx.editor.handle_key(key('y'));
        fx.editor.handle_key(key('j'));
        fx.editor.handle_key(key('l'));
        fx.editor.handle_key(key('d'));
        assert_eq!(status_text(&fx.editor.snapshot()), "-- NORMAL --  Row 2, Col 2  [reg]  d");
    }

    #[test]
    fn test_mode_label_names() {
        assert_eq!("initial".parse::<ModeLabel>().unwrap(), ModeLabel::Initial);
        assert_eq!("none".parse::<ModeLabel>().unwrap(), ModeLabel::Hidden);
        assert!("loud".parse::<ModeLabel>().is_err());
        assert_eq!(ModeLabel::Full.text(VimMode::Replace), "REPLACE");
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 3), 0);
        assert_eq!(scroll_offset(2, 3), 0);
        assert_eq!(scroll_offset(5, 3), 3);
        assert_eq!(scroll_offset(5, 0), 0);
    }
}
