use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use log::LevelFilter;
use serde::Deserialize;

use vimline_core::{
    BoxStyle, EditorConfig, ModeLabel, Theme, ThemeOverrides, Validator, validation,
};

use crate::cli::{Args, ValidateKind};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "vimline").context("Could not determine home directory")
}

/// Default config location: `~/.config/vimline/config.toml` (XDG-compliant).
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Default log location: `~/.cache/vimline/vimline.log`.
pub fn log_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let cache_dir = dirs.cache_dir();
    std::fs::create_dir_all(cache_dir)
        .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
    Ok(cache_dir.join("vimline.log"))
}

/// Settings read from `config.toml`. Every key is optional; command-line
/// flags win over anything set here.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub title: Option<String>,
    pub placeholder: Option<String>,
    pub submit_key: Option<String>,
    pub newline_key: Option<String>,
    pub cancel_keys: Option<Vec<String>>,
    pub line_numbers: Option<bool>,
    pub status: Option<bool>,
    pub mode_label: Option<ModeLabel>,
    pub box_style: Option<BoxStyle>,
    pub theme: Option<String>,
    pub colors: ThemeOverrides,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config file")
    }

    /// Load `path`, or the default location when `None`. An explicit path
    /// must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (config_path()?, false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("In {}", path.display()))
    }

    pub fn log_level(&self, args: &Args) -> Result<LevelFilter> {
        if let Some(level) = args.log_level {
            return Ok(level);
        }
        match &self.log_level {
            Some(level) => level
                .parse()
                .with_context(|| format!("Invalid log level: {level}")),
            None => Ok(LevelFilter::Warn),
        }
    }

    /// Where and at what level to log, or `None` when logging is off.
    /// The default cache directory is only created when it will be used.
    pub fn log_target(&self, args: &Args) -> Result<Option<(PathBuf, LevelFilter)>> {
        let level = self.log_level(args)?;
        if level == LevelFilter::Off {
            return Ok(None);
        }
        let path = match args.log_file.clone().or_else(|| self.log_file.clone()) {
            Some(path) => path,
            None => log_path()?,
        };
        Ok(Some((path, level)))
    }
}

/// Merge command-line flags over the file config.
pub fn editor_config(args: &Args, file: &FileConfig) -> Result<EditorConfig> {
    let theme_name = args.theme.as_deref().or(file.theme.as_deref()).unwrap_or("dark");
    let theme = Theme::named(theme_name)?.with_overrides(&file.colors)?;

    let mut config = EditorConfig::new()
        .line_numbers(args.line_numbers || file.line_numbers.unwrap_or(false))
        .status(!args.no_status && file.status.unwrap_or(true))
        .mode_label(args.mode_label.or(file.mode_label).unwrap_or_default())
        .box_style(args.box_style.or(file.box_style).unwrap_or_default())
        .theme(theme);

    if let Some(text) = &args.initial {
        config = config.initial_text(text);
    }
    if let Some(text) = args.placeholder.as_ref().or(file.placeholder.as_ref()) {
        config = config.placeholder(text);
    }
    if let Some(title) = args.title.as_ref().or(file.title.as_ref()) {
        config = config.title(title);
    }
    if let Some(key) = &file.submit_key {
        config = config.submit_key(key);
    }
    if let Some(key) = &file.newline_key {
        config = config.newline_key(key);
    }
    if let Some(keys) = &file.cancel_keys {
        config = config.cancel_keys(keys);
    }
    if let Some(mask) = args.mask {
        config = config.mask(mask);
    }
    if let Some(kind) = args.validate {
        config.validator = Some(build_validator(kind, args)?);
    }
    Ok(config)
}

fn int_bound(value: Option<f64>, flag: &str) -> Result<Option<i64>> {
    match value {
        Some(v) if v.fract() != 0.0 => bail!("--{flag} must be a whole number for int validation"),
        Some(v) => Ok(Some(v as i64)),
        None => Ok(None),
    }
}

fn build_validator(kind: ValidateKind, args: &Args) -> Result<Box<dyn Validator>> {
    let validator: Box<dyn Validator> = match kind {
        ValidateKind::Email => Box::new(validation::email()),
        ValidateKind::Date => Box::new(validation::date(&args.date_format)),
        ValidateKind::Int => {
            let mut v = validation::integer();
            if let Some(min) = int_bound(args.min, "min")? {
                v = v.min(min);
            }
            if let Some(max) = int_bound(args.max, "max")? {
                v = v.max(max);
            }
            Box::new(v)
        }
        ValidateKind::Float => {
            let mut v = validation::float_num();
            if let Some(min) = args.min {
                v = v.min(min);
            }
            if let Some(max) = args.max {
                v = v.max(max);
            }
            Box::new(v)
        }
        ValidateKind::Regex => {
            let pattern = args
                .pattern
                .as_deref()
                .context("--validate regex needs --pattern")?;
            let mut v = validation::regex(pattern)?;
            if let Some(message) = &args.message {
                v = v.message(message);
            }
            Box::new(v)
        }
        ValidateKind::Required => Box::new(validation::length().min(1).required()),
    };
    Ok(validator)
}
