use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::error::{Error, Result};

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Colour set for one validation state: border, title and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateColors {
    pub border: Style,
    pub title: Style,
    pub message: Style,
}

impl StateColors {
    /// Border and message in `color`, title in bold `color`.
    const fn bold_title(color: Color) -> Self {
        Self {
            border: Style::new().fg(color),
            title: Style::new().fg(color).add_modifier(Modifier::BOLD),
            message: Style::new().fg(color),
        }
    }

    fn set_color(&mut self, color: Color) {
        self.border = self.border.fg(color);
        self.title = self.title.fg(color);
        self.message = self.message.fg(color);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub text: Style,
    pub placeholder: Style,
    pub line_number: Style,
    pub status: Style,
    pub visual: Style,
    pub active: StateColors,
    pub valid: StateColors,
    pub invalid: StateColors,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub const PRESETS: [&'static str; 5] = ["dark", "light", "minimal", "high-contrast", "neon"];

    pub fn dark() -> Self {
        Self {
            name: "dark".into(),
            text: Style::new(),
            placeholder: Style::new().fg(hex(0x999999)),
            line_number: Style::new().fg(hex(0x666666)),
            status: Style::new()
                .fg(hex(0xe2e8f0))
                .bg(hex(0x2d3748))
                .add_modifier(Modifier::BOLD),
            visual: Style::new().bg(hex(0x3b4252)),
            active: StateColors::bold_title(hex(0x5aa3f0)),
            valid: StateColors::bold_title(hex(0x4ade80)),
            invalid: StateColors::bold_title(hex(0xf87171)),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".into(),
            text: Style::new(),
            placeholder: Style::new().fg(hex(0x666666)),
            line_number: Style::new().fg(hex(0x888888)),
            status: Style::new()
                .fg(hex(0x333333))
                .bg(hex(0xf0f0f0))
                .add_modifier(Modifier::BOLD),
            visual: Style::new().bg(hex(0xdbeafe)),
            active: StateColors::bold_title(hex(0x2563eb)),
            valid: StateColors::bold_title(hex(0x16a34a)),
            invalid: StateColors::bold_title(hex(0xdc2626)),
        }
    }

    pub fn minimal() -> Self {
        let muted = hex(0x6b7280);
        let lighter = hex(0x9ca3af);
        Self {
            name: "minimal".into(),
            placeholder: Style::new().fg(hex(0x777777)),
            line_number: Style::new().fg(hex(0x555555)),
            visual: Style::new().bg(hex(0x333333)),
            active: StateColors {
                title: Style::new().fg(muted),
                ..StateColors::bold_title(muted)
            },
            valid: StateColors {
                title: Style::new().fg(muted),
                ..StateColors::bold_title(muted)
            },
            invalid: StateColors {
                title: Style::new().fg(lighter),
                ..StateColors::bold_title(lighter)
            },
            ..Self::dark()
        }
    }

    pub fn high_contrast() -> Self {
        let bold = |color| Style::new().fg(color).add_modifier(Modifier::BOLD);
        Self {
            name: "high-contrast".into(),
            placeholder: Style::new().fg(hex(0xcccccc)),
            line_number: Style::new().fg(hex(0xffffff)),
            visual: Style::new().add_modifier(Modifier::REVERSED),
            active: StateColors::bold_title(hex(0x00ffff)),
            valid: StateColors {
                message: bold(hex(0x00ff00)),
                ..StateColors::bold_title(hex(0x00ff00))
            },
            invalid: StateColors {
                message: bold(hex(0xff0000)),
                ..StateColors::bold_title(hex(0xff0000))
            },
            ..Self::dark()
        }
    }

    pub fn neon() -> Self {
        let bold = |color| Style::new().fg(color).add_modifier(Modifier::BOLD);
        Self {
            name: "neon".into(),
            placeholder: Style::new()
                .fg(hex(0xff00ff))
                .add_modifier(Modifier::ITALIC),
            line_number: Style::new().fg(hex(0x00ffff)),
            visual: Style::new().bg(hex(0x3d0066)),
            active: StateColors::bold_title(hex(0x00ffff)),
            valid: StateColors {
                message: bold(hex(0x39ff14)),
                ..StateColors::bold_title(hex(0x39ff14))
            },
            invalid: StateColors {
                message: bold(hex(0xff073a)),
                ..StateColors::bold_title(hex(0xff073a))
            },
            ..Self::dark()
        }
    }

    /// Look up a preset by name (case-insensitive, `_` and `-` equivalent).
    pub fn named(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "dark" | "default" => Ok(Self::dark()),
            "light" => Ok(Self::light()),
            "minimal" => Ok(Self::minimal()),
            "high-contrast" | "highcontrast" => Ok(Self::high_contrast()),
            "neon" => Ok(Self::neon()),
            _ => Err(Error::UnknownName {
                kind: "theme",
                name: name.to_string(),
            }),
        }
    }

    /// Apply user overrides on top of this theme.
    pub fn with_overrides(mut self, overrides: &ThemeOverrides) -> Result<Self> {
        if let Some(c) = parse_color(&overrides.text)? {
            self.text = self.text.fg(c);
        }
        if let Some(c) = parse_color(&overrides.placeholder)? {
            self.placeholder = self.placeholder.fg(c);
        }
        if let Some(c) = parse_color(&overrides.line_number)? {
            self.line_number = self.line_number.fg(c);
        }
        if let Some(c) = parse_color(&overrides.status_fg)? {
            self.status = self.status.fg(c);
        }
        if let Some(c) = parse_color(&overrides.status_bg)? {
            self.status = self.status.bg(c);
        }
        if let Some(c) = parse_color(&overrides.visual_bg)? {
            self.visual = self.visual.bg(c).remove_modifier(Modifier::REVERSED);
        }
        if let Some(c) = parse_color(&overrides.active)? {
            self.active.set_color(c);
        }
        if let Some(c) = parse_color(&overrides.valid)? {
            self.valid.set_color(c);
        }
        if let Some(c) = parse_color(&overrides.invalid)? {
            self.invalid.set_color(c);
        }
        Ok(self)
    }
}

fn parse_color(value: &Option<String>) -> Result<Option<Color>> {
    value
        .as_deref()
        .map(|s| Color::from_str(s.trim()).map_err(|_| Error::InvalidColor(s.to_string())))
        .transpose()
}

/// Per-colour overrides read from the config file. Values are colour
/// names (`"cyan"`) or hex strings (`"#5aa3f0"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ThemeOverrides {
    pub text: Option<String>,
    pub placeholder: Option<String>,
    pub line_number: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
    pub visual_bg: Option<String>,
    /// Border, title and message colour while editing.
    pub active: Option<String>,
    pub valid: Option<String>,
    pub invalid: Option<String>,
}

// ── Box style ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxStyle {
    #[default]
    Rounded,
    Square,
    Double,
    Heavy,
    Ascii,
}

impl FromStr for BoxStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rounded" => Ok(Self::Rounded),
            "square" | "plain" => Ok(Self::Square),
            "double" => Ok(Self::Double),
            "heavy" | "thick" => Ok(Self::Heavy),
            "ascii" => Ok(Self::Ascii),
            _ => Err(Error::UnknownName {
                kind: "box style",
                name: s.to_string(),
            }),
        }
    }
}
