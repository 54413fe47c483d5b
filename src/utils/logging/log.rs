//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages.

use std::time::Duration;

/// Initialise `env_logger` with `info` as the default filter
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `items` - Number of items about to be processed
pub fn log_operation_start(operation: &str, items: usize) {
    log::info!("{operation} ({items} items)");
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("Successfully {operation} {items} items in {duration:?}");
    } else {
        log::info!("Successfully {operation} {items} items");
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `position` - Optional input position related to the warning
pub fn log_warning(message: &str, position: Option<usize>) {
    if let Some(position) = position {
        log::warn!("{message} (position {position})");
    } else {
        log::warn!("{message}");
    }
}
