//! Logging initialization for the CLI.
//!
//! Logs always go to `blackbox.log` in the data directory; `--verbose` also
//! prints debug output to stderr.

use blackbox_util::log::{self, LogConfig};
use blackbox_util::{path, LogLevel};
use std::path::PathBuf;

/// Initialize logging. Returns the log file path if file logging is active.
pub fn init_logging(verbose: bool, level: Option<LogLevel>) -> Option<PathBuf> {
    let log_file = path::logs_dir().map(|dir| dir.join("blackbox.log"));
    let level = if verbose {
        LogLevel::Debug
    } else {
        level.unwrap_or_default()
    };

    let config = LogConfig {
        print: verbose,
        level,
        include_location: verbose,
        file: log_file.clone(),
    };

    match log::init(config) {
        Ok(()) => log_file,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {e}");
            log::init(LogConfig {
                print: verbose,
                level,
                include_location: verbose,
                file: None,
            })
            .ok();
            None
        }
    }
}
