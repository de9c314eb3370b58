use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;

/// Route `log` records to `path`. The terminal is in raw mode while the
/// editor runs, so nothing is written to stderr.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let file = fern::log_file(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(file)
        .apply()
        .context("Logger already initialised")?;
    Ok(())
}
