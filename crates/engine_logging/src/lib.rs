#![deny(missing_docs)]
//! Shared logging setup for the presswork workspace.
//!
//! Library crates log through the `log` facade only; the binary picks a
//! destination here once at startup.

use std::fs::File;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// File name used when logging to disk.
pub const LOG_FILE_NAME: &str = "presswork.log";

/// Destination for log output.
pub enum LogDestination {
    /// Write to ./presswork.log in the current directory.
    File,
    /// Write to the terminal.
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger with the specified destination.
///
/// Falls back to terminal-only when the log file cannot be created, and
/// no-ops if a logger has already been installed.
pub fn initialize(destination: LogDestination) {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    match destination {
        LogDestination::File => {
            if let Some(file_logger) = create_file_logger(level, config.clone()) {
                loggers.push(file_logger);
            }
        }
        LogDestination::Terminal => {
            loggers.push(terminal_logger(level, config.clone()));
        }
        LogDestination::Both => {
            loggers.push(terminal_logger(level, config.clone()));
            if let Some(file_logger) = create_file_logger(level, config.clone()) {
                loggers.push(file_logger);
            }
        }
    }
    if loggers.is_empty() {
        loggers.push(terminal_logger(level, config));
    }

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let _ = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<dyn SharedLogger>> {
    match File::create(LOG_FILE_NAME) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("cannot create {LOG_FILE_NAME}: {err}");
            None
        }
    }
}
