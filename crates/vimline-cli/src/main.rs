mod cli;
mod config;
mod logging;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use vimline_core::{Session, TerminalKeys};

use cli::Args;
use config::FileConfig;

/// Exit status for a cancelled edit, as after Ctrl-C in a shell.
const EXIT_CANCELLED: u8 = 130;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let file = FileConfig::load(args.config.as_deref())?;

    if let Some((path, level)) = file.log_target(&args)? {
        logging::init(&path, level)?;
    }

    let mut session = Session::new(config::editor_config(&args, &file)?)?;

    // Draw on stderr so stdout carries only the result
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut tty = io::stderr();
    execute!(tty, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(tty);
    let mut terminal = Terminal::new(backend)?;

    let result = session.run(&mut terminal, &mut TerminalKeys);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result? {
        Some(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            log::debug!("edit cancelled");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
    }
}
