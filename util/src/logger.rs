//! Logger initialisation
//!
//! Log lines go to both stdout and the session's log file, and are prefixed with the number of
//! seconds since the session epoch:
//!
//! ```text
//! [  12.345678 INF] Route to (7.25, 5.25) loaded, arriving at t = 18.211 s
//! [  12.345901 DBG] ctrl_lib::auto::traj::chain: Built trajectory chain of 14 segments
//! ```
//!
//! Debug and trace lines also carry their target so their source module can be found.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use fern::FormatCallback;
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target of the world state store, which logs every published snapshot.
const WORLD_STORE_TARGET: &str = "ctrl_lib::world";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level at least as verbose as `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Cannot open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be at least as verbose as `Info`. The world state store target is capped at
/// `Debug`, its trace output is one line per vision frame.
///
/// Only the first call in a process can succeed.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .format(write_line)
        .level(min_level)
        .level_for(WORLD_STORE_TARGET, min_level.min(LevelFilter::Debug))
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised for {}", session.exec_name);
    info!("    Session epoch: {:?}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn write_line(out: FormatCallback, message: &Arguments, record: &Record) {
    let t_s = session::get_elapsed_seconds();
    let tag = level_tag(record.level());

    match record.level() {
        Level::Debug | Level::Trace => out.finish(format_args!(
            "[{:11.6} {}] {}: {}",
            t_s,
            tag,
            record.target(),
            message
        )),
        _ => out.finish(format_args!("[{:11.6} {}] {}", t_s, tag, message)),
    }
}

/// Three letter, coloured tag of a log level.
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}
