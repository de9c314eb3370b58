use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use vimline_core::{BoxStyle, ModeLabel};

#[derive(Parser, Debug)]
#[command(
    name = "vimline",
    version,
    about = "Edit a value in a vim-style box and print it to stdout",
    long_about = None
)]
pub struct Args {
    /// Text to start editing with
    #[arg(short, long)]
    pub initial: Option<String>,

    /// Hint shown while the input is empty
    #[arg(short, long)]
    pub placeholder: Option<String>,

    /// Title drawn on the top border
    #[arg(short, long)]
    pub title: Option<String>,

    /// Show a line-number gutter
    #[arg(short = 'n', long)]
    pub line_numbers: bool,

    /// Hide the status line below the box
    #[arg(long)]
    pub no_status: bool,

    /// Mode indicator on the bottom border: full, initial or hidden
    #[arg(long, value_name = "STYLE")]
    pub mode_label: Option<ModeLabel>,

    /// Draw this character in place of the input (passwords)
    #[arg(long, value_name = "CHAR")]
    pub mask: Option<char>,

    /// Border style: rounded, square, double, heavy or ascii
    #[arg(long, value_name = "STYLE")]
    pub box_style: Option<BoxStyle>,

    /// Colour theme: dark, light, minimal, high-contrast or neon
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Validate the input on submit
    #[arg(long, value_enum, value_name = "KIND")]
    pub validate: Option<ValidateKind>,

    /// Pattern for --validate regex (whole input must match)
    #[arg(long, required_if_eq("validate", "regex"))]
    pub pattern: Option<String>,

    /// Message shown when the pattern does not match
    #[arg(long, requires = "pattern")]
    pub message: Option<String>,

    /// Lower bound for int and float validation
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Upper bound for int and float validation
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// chrono format for --validate date
    #[arg(long, default_value = "%Y-%m-%d")]
    pub date_format: String,

    /// Load configuration from a specific file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write logs to a specific file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValidateKind {
    Email,
    Date,
    Int,
    Float,
    Regex,
    /// Any non-blank input
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "vimline",
            "--title",
            "Age",
            "--validate",
            "int",
            "--min",
            "-5",
            "--max",
            "120",
            "--box-style",
            "double",
            "--mode-label",
            "initial",
            "-n",
        ])
        .unwrap();
        assert_eq!(args.title.as_deref(), Some("Age"));
        assert_eq!(args.validate, Some(ValidateKind::Int));
        assert_eq!(args.min, Some(-5.0));
        assert_eq!(args.max, Some(120.0));
        assert_eq!(args.box_style, Some(BoxStyle::Double));
        assert_eq!(args.mode_label, Some(ModeLabel::Initial));
        assert!(args.line_numbers);
        assert_eq!(args.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_regex_requires_pattern() {
        assert!(Args::try_parse_from(["vimline", "--validate", "regex"]).is_err());
        assert!(
            Args::try_parse_from(["vimline", "--validate", "regex", "--pattern", "[0-9]+"]).is_ok()
        );
    }

    #[test]
    fn test_unknown_box_style_rejected() {
        assert!(Args::try_parse_from(["vimline", "--box-style", "wavy"]).is_err());
    }
}
