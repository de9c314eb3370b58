use thiserror::Error;

/// Errors raised while configuring an editor session or driving its terminal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown key identifier: {0:?}")]
    UnknownKey(String),

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A theme, box style or mode-label name that is not recognised.
    #[error("unknown {kind}: {name:?}")]
    UnknownName { kind: &'static str, name: String },

    #[error("invalid colour {0:?}, expected a name or #rrggbb")]
    InvalidColor(String),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
