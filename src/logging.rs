use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger structure
#[derive(Debug)]
struct SurfLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl SurfLogger {
    // Pulls a "[T012]" style turn marker out of the message, if present
    fn turn_of(message: &str) -> Option<u32> {
        let start = message.find("[T")? + 2;
        let end = message[start..].find(']')? + start;
        message[start..end].parse::<u32>().ok()
    }
}

impl log::Log for SurfLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Topic filters only apply to the chatty levels
        if let Some(filters) = &self.debug_filters {
            if metadata.level() == log::Level::Debug || metadata.level() == log::Level::Trace {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let message = record.args().to_string();

        let mut output = format!(
            "{timestamp} {level_color}{level:5}{reset} {target}: {message}",
            level = record.level(),
            target = record.target(),
        );

        // Records from the turn loop get a trailing module path for grepping
        if Self::turn_of(&message).is_some() {
            if let Some(module_path) = record.module_path() {
                if module_path != record.target() {
                    output.push_str(&format!(" [{}]", module_path));
                }
            }
        }

        let mut stdout = io::stdout();
        // A closed stdout is not worth crashing the agent over
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<SurfLogger> = OnceLock::new();

/// Installs the logger. `RUST_LOG` hands control to `env_logger` instead.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    if std::env::var_os("RUST_LOG").is_some() {
        return env_logger::try_init();
    }

    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| SurfLogger {
        level,
        debug_filters,
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Helper macros for specific debug topics
#[macro_export]
macro_rules! debug_surf {
    ($turn:expr, $($arg:tt)*) => {
        log::debug!(target: "surf", "[T{:03}] {}", $turn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_wave {
    ($turn:expr, $($arg:tt)*) => {
        log::debug!(target: "wave", "[T{:03}] {}", $turn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_gun {
    ($turn:expr, $($arg:tt)*) => {
        log::debug!(target: "gun", "[T{:03}] {}", $turn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_wall {
    ($($arg:tt)*) => {
        log::debug!(target: "wall", "{}", format_args!($($arg)*))
    };
}
