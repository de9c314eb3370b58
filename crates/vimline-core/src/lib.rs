//! A boxed, vim-style line editor for terminal prompts.
//!
//! Build an [`EditorConfig`], turn it into a [`Session`], and call
//! [`Session::run`] with a ratatui terminal and a [`KeySource`].

pub mod error;
pub mod keys;
pub mod session;
pub mod theme;
pub mod ui;
pub mod validation;
pub mod vim_editor;

pub use error::{Error, Result};
pub use keys::KeySpec;
pub use session::{EditorConfig, KeySource, Session, SessionStatus, TerminalKeys, ValidationState};
pub use theme::{BoxStyle, Theme, ThemeOverrides};
pub use ui::ModeLabel;
pub use validation::{ValidationResult, Validator};
pub use vim_editor::{EditorAction, EditorSnapshot, VimEditor, VimMode};
