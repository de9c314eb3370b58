use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::Error;

/// A configurable key identifier such as `"c-m"`, `"c-c"` or `"escape"`.
///
/// Identifiers follow the prompt-style naming used by the config file:
/// `c-` for Control, `a-`/`m-` for Alt, `s-tab` for Shift-Tab, plus named
/// keys (`enter`, `escape`, `tab`, `backspace`, `delete`, arrows, `home`,
/// `end`, `f1`..`f12`) and bare single characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Whether a terminal key event is this key.
    ///
    /// Enter and Ctrl-M are the same key on a terminal, and Ctrl-J also
    /// arrives as Shift-Enter on terminals that report modifiers.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let ctrl = self.modifiers == KeyModifiers::CONTROL;
        let plain = self.modifiers == KeyModifiers::NONE;
        match self.code {
            KeyCode::Enter if plain => {
                (key.code == KeyCode::Enter && key.modifiers == KeyModifiers::NONE)
                    || is_ctrl_char(key, 'm')
            }
            KeyCode::Char('j') if ctrl => {
                is_ctrl_char(key, 'j')
                    || (key.code == KeyCode::Enter && key.modifiers == KeyModifiers::SHIFT)
            }
            KeyCode::Char(c) if ctrl => is_ctrl_char(key, c),
            KeyCode::Char(c) if plain => {
                key.code == KeyCode::Char(c)
                    && (key.modifiers == KeyModifiers::NONE
                        || key.modifiers == KeyModifiers::SHIFT)
            }
            code => key.code == code && key.modifiers == self.modifiers,
        }
    }
}

fn is_ctrl_char(key: &KeyEvent, c: char) -> bool {
    matches!(key.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

impl FromStr for KeySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownKey(s.to_string());
        let name = s.trim();

        // A lone character is taken literally, including '-' and uppercase.
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::plain(KeyCode::Char(c)));
        }

        let lower = name.to_ascii_lowercase();
        let spec = match lower.as_str() {
            "enter" | "return" | "c-m" => Self::plain(KeyCode::Enter),
            "escape" | "esc" | "c-[" => Self::plain(KeyCode::Esc),
            "tab" | "c-i" => Self::plain(KeyCode::Tab),
            "s-tab" => Self::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            "backspace" | "c-h" => Self::plain(KeyCode::Backspace),
            "delete" | "del" => Self::plain(KeyCode::Delete),
            "space" => Self::plain(KeyCode::Char(' ')),
            "up" => Self::plain(KeyCode::Up),
            "down" => Self::plain(KeyCode::Down),
            "left" => Self::plain(KeyCode::Left),
            "right" => Self::plain(KeyCode::Right),
            "home" => Self::plain(KeyCode::Home),
            "end" => Self::plain(KeyCode::End),
            "pageup" => Self::plain(KeyCode::PageUp),
            "pagedown" => Self::plain(KeyCode::PageDown),
            other => {
                if let Some(rest) = other.strip_prefix("c-") {
                    Self::ctrl(single_char(rest).ok_or_else(unknown)?)
                } else if let Some(rest) = other
                    .strip_prefix("a-")
                    .or_else(|| other.strip_prefix("m-"))
                {
                    Self::new(
                        KeyCode::Char(single_char(rest).ok_or_else(unknown)?),
                        KeyModifiers::ALT,
                    )
                } else if let Some(n) = other.strip_prefix('f') {
                    match n.parse::<u8>() {
                        Ok(n @ 1..=12) => Self::plain(KeyCode::F(n)),
                        _ => return Err(unknown()),
                    }
                } else {
                    return Err(unknown());
                }
            }
        };
        Ok(spec)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.modifiers.contains(KeyModifiers::CONTROL) {
            "c-"
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            "a-"
        } else {
            ""
        };
        match self.code {
            KeyCode::Char(' ') => write!(f, "{prefix}space"),
            KeyCode::Char(c) => write!(f, "{prefix}{c}"),
            KeyCode::Enter => write!(f, "enter"),
            KeyCode::Esc => write!(f, "escape"),
            KeyCode::Tab => write!(f, "tab"),
            KeyCode::BackTab => write!(f, "s-tab"),
            KeyCode::Backspace => write!(f, "backspace"),
            KeyCode::Delete => write!(f, "delete"),
            KeyCode::F(n) => write!(f, "f{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Parse a list of key identifiers, failing on the first unknown one.
pub fn parse_keys<S: AsRef<str>>(names: &[S]) -> Result<Vec<KeySpec>, Error> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!("c-m".parse::<KeySpec>().unwrap(), KeySpec::plain(KeyCode::Enter));
        assert_eq!("Enter".parse::<KeySpec>().unwrap(), KeySpec::plain(KeyCode::Enter));
        assert_eq!("c-c".parse::<KeySpec>().unwrap(), KeySpec::ctrl('c'));
        assert_eq!("escape".parse::<KeySpec>().unwrap(), KeySpec::plain(KeyCode::Esc));
        assert_eq!("f5".parse::<KeySpec>().unwrap(), KeySpec::plain(KeyCode::F(5)));
        assert_eq!("Q".parse::<KeySpec>().unwrap(), KeySpec::plain(KeyCode::Char('Q')));
    }

    #[test]
    fn test_parse_unknown_key() {
        assert!(matches!("c-hello".parse::<KeySpec>(), Err(Error::UnknownKey(_))));
        assert!(matches!("f13".parse::<KeySpec>(), Err(Error::UnknownKey(_))));
        assert!(matches!("nonsense".parse::<KeySpec>(), Err(Error::UnknownKey(_))));
    }

    #[test]
    fn test_enter_matches_ctrl_m() {
        let spec = KeySpec::plain(KeyCode::Enter);
        assert!(spec.matches(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(spec.matches(&key(KeyCode::Char('m'), KeyModifiers::CONTROL)));
        assert!(!spec.matches(&key(KeyCode::Char('m'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_ctrl_j_matches_shift_enter() {
        let spec = KeySpec::ctrl('j');
        assert!(spec.matches(&key(KeyCode::Char('j'), KeyModifiers::CONTROL)));
        assert!(spec.matches(&key(KeyCode::Enter, KeyModifiers::SHIFT)));
        assert!(!spec.matches(&key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn test_plain_char_ignores_shift() {
        let spec = KeySpec::plain(KeyCode::Char('Q'));
        assert!(spec.matches(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(!spec.matches(&key(KeyCode::Char('Q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_display_round_trips_common_keys() {
        for name in ["c-c", "c-d", "escape", "enter", "tab", "f2"] {
            let spec: KeySpec = name.parse().unwrap();
            assert_eq!(spec.to_string(), name);
        }
    }
}
