//! Logging utilities for the salon agenda.
//!
//! This module provides the one place where the tracing subscriber is set up,
//! so the backend binary, integration tests and benches all log the same way.

use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// # Examples
///
/// ```
/// use salon_common::logging;
///
/// // Initialize with default log level (INFO)
/// logging::init();
///
/// // Initialize with a specific log level
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` is honoured first; a `salon=<level>` directive is added on top
/// so every `salon_*` crate logs at `level` unless `RUST_LOG` says otherwise.
/// Safe to call more than once: later calls are ignored.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    match format!("salon={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log directive for level {}: {}", level, e),
    }

    // Use try_init to handle the case where a global default subscriber has already been set
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parse a configured level name ("debug", "INFO", ...), falling back to INFO.
pub fn level_from_str(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or_else(|_| {
        warn!("Unknown log level '{}', using INFO", level);
        Level::INFO
    })
}
